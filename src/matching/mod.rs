pub mod align;
pub mod pcc_index;

use serde::{Deserialize, Serialize};

use crate::core::error::{MatchError, Result};
use crate::core::field::{Field, Pcc};

pub use align::{get_matches, FieldMatching, MatchedPair, EPS};
pub use pcc_index::{pccs_covered, pccs_iou, PccIndex};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum PCC IoU for a prediction to claim a gold field. 1.0 is the
    /// official setting; lower values are for debugging.
    pub iou_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { iou_threshold: 1.0 }
    }
}

impl MatchConfig {
    pub fn new(iou_threshold: f64) -> Result<Self> {
        let config = Self { iou_threshold };
        config.validate()?;
        Ok(config)
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        // also rejects NaN
        if !(self.iou_threshold > 0.0 && self.iou_threshold <= 1.0) {
            return Err(MatchError::InvalidThreshold {
                value: self.iou_threshold,
            });
        }
        Ok(())
    }
}

pub trait FieldMatcher {
    fn match_fields<'a>(
        &self,
        predictions: &'a [Field],
        annotations: &'a [Field],
        pccs: &[Pcc],
    ) -> Result<FieldMatching<'a>>;
}

#[derive(Debug, Clone, Default)]
pub struct PccMatcher {
    config: MatchConfig,
}

impl PccMatcher {
    pub fn new(config: MatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }
}

impl FieldMatcher for PccMatcher {
    fn match_fields<'a>(
        &self,
        predictions: &'a [Field],
        annotations: &'a [Field],
        pccs: &[Pcc],
    ) -> Result<FieldMatching<'a>> {
        get_matches(predictions, annotations, pccs, self.config.iou_threshold)
    }
}
