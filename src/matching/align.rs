use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::field::{Field, Pcc};
use crate::matching::pcc_index::PccIndex;

/// Slack for `iou >= threshold` on floats, so a perfect overlap passes the
/// default threshold of 1.0.
pub const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MatchedPair<'a> {
    pub gold: &'a Field,
    pub pred: &'a Field,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FieldMatching<'a> {
    pub matches: Vec<MatchedPair<'a>>,
    /// Predictions left unmatched.
    pub extra: Vec<&'a Field>,
    /// Annotations left unmatched.
    pub misses: Vec<&'a Field>,
}

impl FieldMatching<'_> {
    pub fn is_perfect(&self) -> bool {
        self.extra.is_empty() && self.misses.is_empty()
    }
}

type PoolKey<'a> = (Option<&'a str>, usize);

/// Gold fields that are still unmatched, one pool per (fieldtype, page) in
/// order of first appearance.
struct GoldPools<'a> {
    pools: Vec<(PoolKey<'a>, Vec<&'a Field>)>,
    lookup: HashMap<PoolKey<'a>, usize>,
}

impl<'a> GoldPools<'a> {
    fn new(annotations: &'a [Field]) -> Self {
        let mut pools: Vec<(PoolKey<'a>, Vec<&'a Field>)> = Vec::new();
        let mut lookup = HashMap::new();
        for gold in annotations {
            let key = (gold.fieldtype(), gold.page());
            let idx = *lookup.entry(key).or_insert_with(|| {
                pools.push((key, Vec::new()));
                pools.len() - 1
            });
            pools[idx].1.push(gold);
        }
        Self { pools, lookup }
    }

    fn get_mut(&mut self, key: PoolKey<'a>) -> Option<&mut Vec<&'a Field>> {
        let idx = *self.lookup.get(&key)?;
        Some(&mut self.pools[idx].1)
    }

    /// Remaining fields grouped by fieldtype in `type_order`, then by page.
    fn into_remaining(mut self, type_order: &[Option<&'a str>]) -> Vec<&'a Field> {
        let rank: HashMap<Option<&str>, usize> = type_order
            .iter()
            .enumerate()
            .map(|(i, fieldtype)| (*fieldtype, i))
            .collect();
        self.pools
            .sort_by_key(|((fieldtype, _), _)| rank.get(fieldtype).copied().unwrap_or(usize::MAX));
        self.pools.into_iter().flat_map(|(_, fields)| fields).collect()
    }
}

/// Missing scores rank as 0; higher scores come first.
fn by_descending_score(a: &&Field, b: &&Field) -> Ordering {
    let a = a.score().unwrap_or(0.0);
    let b = b.score().unwrap_or(0.0);
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Removes and returns the first candidate whose PCC IoU with `pred` clears
/// the threshold.
fn take_first_match<'a>(
    candidates: &mut Vec<&'a Field>,
    index: &PccIndex,
    pred: &Field,
    iou_threshold: f64,
) -> Result<Option<&'a Field>> {
    let mut accepted = None;
    for (pos, gold) in candidates.iter().enumerate() {
        let iou = match index.iou(pred.page(), gold.bbox(), pred.bbox()) {
            Ok(iou) => iou,
            Err(err) => {
                tracing::warn!(
                    "Cannot compare prediction {:?} with gold {:?}: {}",
                    pred.bbox(),
                    gold.bbox(),
                    err
                );
                return Err(err);
            }
        };
        if iou > iou_threshold - EPS {
            tracing::trace!(
                "Matched {:?} on page {} with IoU {:.4}",
                pred.fieldtype(),
                pred.page(),
                iou
            );
            accepted = Some(pos);
            break;
        }
    }
    Ok(accepted.map(|pos| candidates.remove(pos)))
}

/// Greedily pairs predictions with annotations of the same fieldtype and page.
///
/// `predictions` are either KILE fields of one document or the fields of one
/// line item (which may span pages), `annotations` the gold fields for the
/// same scope. `pccs` must cover every page referenced by either side.
///
/// Per fieldtype, predictions are tried in order of descending score (missing
/// score counts as 0, ties keep input order). Each prediction takes the first
/// remaining gold field on its page whose PCC IoU exceeds
/// `iou_threshold - EPS`. Official evaluation uses a threshold of 1.0.
///
/// Fails with [`MatchError::EmptyUnion`](crate::MatchError::EmptyUnion) when a
/// comparison covers no PCC at all, e.g. a gold field without text.
pub fn get_matches<'a>(
    predictions: &'a [Field],
    annotations: &'a [Field],
    pccs: &[Pcc],
    iou_threshold: f64,
) -> Result<FieldMatching<'a>> {
    let index = PccIndex::new(pccs);
    let mut pools = GoldPools::new(annotations);

    let mut fieldtypes: Vec<Option<&'a str>> = Vec::new();
    for field in annotations.iter().chain(predictions) {
        if !fieldtypes.contains(&field.fieldtype()) {
            fieldtypes.push(field.fieldtype());
        }
    }

    let mut matches = Vec::new();
    let mut extra = Vec::new();

    for fieldtype in &fieldtypes {
        let mut preds: Vec<&'a Field> = predictions
            .iter()
            .filter(|p| p.fieldtype() == *fieldtype)
            .collect();
        preds.sort_by(by_descending_score);
        tracing::debug!("Matching {} prediction(s) of fieldtype {:?}", preds.len(), fieldtype);

        for pred in preds {
            let gold = match pools.get_mut((*fieldtype, pred.page())) {
                Some(candidates) => take_first_match(candidates, &index, pred, iou_threshold)?,
                None => None,
            };
            match gold {
                Some(gold) => matches.push(MatchedPair { gold, pred }),
                None => extra.push(pred),
            }
        }
    }

    let misses = pools.into_remaining(&fieldtypes);
    tracing::debug!(
        "Field matching done: {} matched, {} extra, {} missed",
        matches.len(),
        extra.len(),
        misses.len()
    );

    Ok(FieldMatching {
        matches,
        extra,
        misses,
    })
}
