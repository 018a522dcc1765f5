use serde::{Deserialize, Serialize};

/// One gold (or predicted) field as stored in an annotation file.
///
/// `bbox` is `[left, top, right, bottom]`. Keys not listed here are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationRecord {
    pub bbox: [f64; 4],
    pub page: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fieldtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_id: Option<usize>,
}

/// A recognized word from an OCR engine, with `geometry` given as
/// `[[left, top], [right, bottom]]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OcrWord {
    pub value: String,
    pub geometry: [[f64; 2]; 2],
}
