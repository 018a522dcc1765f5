use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::core::geometry::BBox;
use crate::core::model::{AnnotationRecord, OcrWord};

/// Pseudo-character center: the estimated center of one glyph of a field's text.
///
/// Equality and hashing are by value, so identical points contributed by
/// different fields collapse into one element of a set.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pcc {
    pub x: f64,
    pub y: f64,
    pub page: usize,
}

impl Pcc {
    pub fn new(x: f64, y: f64, page: usize) -> Self {
        Self { x, y, page }
    }

    fn key(&self) -> (u64, u64, usize) {
        // +0.0 folds -0.0 into 0.0 so both hash alike
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits(), self.page)
    }
}

impl PartialEq for Pcc {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pcc {}

impl Hash for Pcc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A labeled region on a page. PCCs are derived from `bbox` and `text` once,
/// when the field is built.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    bbox: BBox,
    page: usize,
    score: Option<f64>,
    text: Option<String>,
    fieldtype: Option<String>,
    line_item_id: Option<usize>,
    #[serde(skip)]
    pccs: Vec<Pcc>,
}

impl Field {
    pub fn builder(bbox: BBox, page: usize) -> FieldBuilder {
        FieldBuilder {
            bbox,
            page,
            score: None,
            text: None,
            fieldtype: None,
            line_item_id: None,
        }
    }

    pub fn from_annotation(record: &AnnotationRecord) -> Self {
        FieldBuilder {
            bbox: BBox::from(record.bbox),
            page: record.page,
            score: record.score,
            text: record.text.clone(),
            fieldtype: record.fieldtype.clone(),
            line_item_id: record.line_item_id,
        }
        .build()
    }

    pub fn from_ocr(word: &OcrWord, page: usize) -> Self {
        let [[left, top], [right, bottom]] = word.geometry;
        Self::builder(BBox::new(left, top, right, bottom), page)
            .text(word.value.clone())
            .build()
    }

    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn fieldtype(&self) -> Option<&str> {
        self.fieldtype.as_deref()
    }

    pub fn line_item_id(&self) -> Option<usize> {
        self.line_item_id
    }

    pub fn pccs(&self) -> &[Pcc] {
        &self.pccs
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.bbox == other.bbox
            && self.page == other.page
            && self.score == other.score
            && self.text == other.text
            && self.fieldtype == other.fieldtype
            && self.line_item_id == other.line_item_id
    }
}

#[derive(Debug, Clone)]
pub struct FieldBuilder {
    bbox: BBox,
    page: usize,
    score: Option<f64>,
    text: Option<String>,
    fieldtype: Option<String>,
    line_item_id: Option<usize>,
}

impl FieldBuilder {
    pub fn score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn fieldtype(mut self, fieldtype: impl Into<String>) -> Self {
        self.fieldtype = Some(fieldtype.into());
        self
    }

    pub fn line_item_id(mut self, line_item_id: usize) -> Self {
        self.line_item_id = Some(line_item_id);
        self
    }

    pub fn build(self) -> Field {
        let pccs = match self.text.as_deref() {
            Some(text) if !text.is_empty() => calculate_pccs(&self.bbox, text, self.page),
            _ => Vec::new(),
        };
        Field {
            bbox: self.bbox,
            page: self.page,
            score: self.score,
            text: self.text,
            fieldtype: self.fieldtype,
            line_item_id: self.line_item_id,
            pccs,
        }
    }
}

/// Spreads one PCC per character evenly across the box width, on its vertical
/// middle. `text` must be non-empty.
fn calculate_pccs(bbox: &BBox, text: &str, page: usize) -> Vec<Pcc> {
    let n = text.chars().count();
    let char_width = bbox.width() / n as f64;
    let (_, y_middle) = bbox.center();
    (0..n)
        .map(|i| Pcc::new(bbox.left + (i as f64 + 0.5) * char_width, y_middle, page))
        .collect()
}

/// Pools the PCCs of all given fields, e.g. every OCR word of a document.
pub fn collect_pccs<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Vec<Pcc> {
    fields
        .into_iter()
        .flat_map(|field| field.pccs().iter().copied())
        .collect()
}

/// Groups fields by line item id, keeping groups and their members in order of
/// first appearance. Fields without an id form their own `None` group.
pub fn group_by_line_item(fields: &[Field]) -> Vec<(Option<usize>, Vec<&Field>)> {
    let mut groups: Vec<(Option<usize>, Vec<&Field>)> = Vec::new();
    for field in fields {
        match groups.iter_mut().find(|(id, _)| *id == field.line_item_id) {
            Some((_, members)) => members.push(field),
            None => groups.push((field.line_item_id, vec![field])),
        }
    }
    groups
}
