pub mod error;
pub mod field;
pub mod geometry;
pub mod model;
