use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Neither compared box covers any PCC, so IoU is undefined. Usually a gold
    /// field without text.
    #[error("no pseudo-character centers covered by either box on page {page}")]
    EmptyUnion { page: usize },

    #[error("IoU threshold must be in (0, 1], got: {value}")]
    InvalidThreshold { value: f64 },
}

pub type Result<T> = std::result::Result<T, MatchError>;
