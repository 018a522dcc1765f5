pub mod core;
pub mod matching;

pub use crate::core::error::{MatchError, Result};
pub use crate::core::field::{collect_pccs, group_by_line_item, Field, FieldBuilder, Pcc};
pub use crate::core::geometry::BBox;
pub use crate::core::model::{AnnotationRecord, OcrWord};
pub use matching::{get_matches, FieldMatcher, FieldMatching, MatchConfig, MatchedPair, PccMatcher};
