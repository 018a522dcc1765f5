use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::error::{MatchError, Result};
use crate::core::field::Pcc;
use crate::core::geometry::BBox;

/// PCCs whose x lies in `[bbox.left, bbox.right]` and whose y lies in
/// `[bbox.top, bbox.bottom]`.
///
/// `sorted_x_pccs` and `sorted_y_pccs` hold the same points, ordered by x and
/// by y respectively.
pub fn pccs_covered(sorted_x_pccs: &[Pcc], sorted_y_pccs: &[Pcc], bbox: &BBox) -> HashSet<Pcc> {
    let i_l = sorted_x_pccs.partition_point(|p| p.x < bbox.left);
    let i_r = sorted_x_pccs.partition_point(|p| p.x <= bbox.right);
    let x_subset: HashSet<Pcc> = sorted_x_pccs[i_l..i_r.max(i_l)].iter().copied().collect();

    let i_t = sorted_y_pccs.partition_point(|p| p.y < bbox.top);
    let i_b = sorted_y_pccs.partition_point(|p| p.y <= bbox.bottom);
    sorted_y_pccs[i_t..i_b.max(i_t)]
        .iter()
        .filter(|p| x_subset.contains(p))
        .copied()
        .collect()
}

/// IoU of the PCC sets covered by the two boxes.
///
/// Both boxes draw from the full PCC pool of the page. Fails with
/// [`MatchError::EmptyUnion`] when neither box covers any PCC.
pub fn pccs_iou(
    sorted_x_pccs: &[Pcc],
    sorted_y_pccs: &[Pcc],
    gold_bbox: &BBox,
    pred_bbox: &BBox,
) -> Result<f64> {
    let golds = pccs_covered(sorted_x_pccs, sorted_y_pccs, gold_bbox);
    let preds = pccs_covered(sorted_x_pccs, sorted_y_pccs, pred_bbox);

    let union = golds.union(&preds).count();
    if union == 0 {
        let page = sorted_x_pccs.first().map(|p| p.page).unwrap_or_default();
        return Err(MatchError::EmptyUnion { page });
    }
    let intersection = golds.intersection(&preds).count();
    Ok(intersection as f64 / union as f64)
}

#[derive(Debug, Clone, Default)]
struct PagePccs {
    by_x: Vec<Pcc>,
    by_y: Vec<Pcc>,
}

/// All PCCs of a document, split by page and kept sorted by x and by y.
#[derive(Debug, Clone, Default)]
pub struct PccIndex {
    pages: HashMap<usize, PagePccs>,
}

impl PccIndex {
    pub fn new(pccs: &[Pcc]) -> Self {
        let mut pages: HashMap<usize, PagePccs> = HashMap::new();
        for pcc in pccs {
            let page = pages.entry(pcc.page).or_default();
            page.by_x.push(*pcc);
            page.by_y.push(*pcc);
        }
        // sort_by is stable: ties keep input order
        for page in pages.values_mut() {
            page.by_x.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
            page.by_y.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal));
        }
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn sorted_x(&self, page: usize) -> &[Pcc] {
        self.pages.get(&page).map(|p| p.by_x.as_slice()).unwrap_or(&[])
    }

    pub fn sorted_y(&self, page: usize) -> &[Pcc] {
        self.pages.get(&page).map(|p| p.by_y.as_slice()).unwrap_or(&[])
    }

    pub fn covered(&self, page: usize, bbox: &BBox) -> HashSet<Pcc> {
        pccs_covered(self.sorted_x(page), self.sorted_y(page), bbox)
    }

    /// A page without any PCC yields [`MatchError::EmptyUnion`] for that page.
    pub fn iou(&self, page: usize, gold_bbox: &BBox, pred_bbox: &BBox) -> Result<f64> {
        pccs_iou(self.sorted_x(page), self.sorted_y(page), gold_bbox, pred_bbox)
            .map_err(|_| MatchError::EmptyUnion { page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::Field;
    use pretty_assertions::assert_eq;

    fn index_of(fields: &[Field]) -> PccIndex {
        let pccs: Vec<Pcc> = fields.iter().flat_map(|f| f.pccs().iter().copied()).collect();
        PccIndex::new(&pccs)
    }

    #[test]
    fn covered_requires_both_axes() {
        let pccs = vec![
            Pcc::new(1.0, 1.0, 0),
            Pcc::new(1.0, 5.0, 0),
            Pcc::new(5.0, 1.0, 0),
            Pcc::new(5.0, 5.0, 0),
        ];
        let index = PccIndex::new(&pccs);
        let covered = index.covered(0, &BBox::new(0.0, 0.0, 2.0, 2.0));
        assert_eq!(covered, HashSet::from([Pcc::new(1.0, 1.0, 0)]));
    }

    #[test]
    fn covered_bounds_are_inclusive() {
        let pccs = vec![Pcc::new(2.0, 3.0, 0), Pcc::new(2.0, 3.0 + 1e-9, 0)];
        let index = PccIndex::new(&pccs);
        let covered = index.covered(0, &BBox::new(2.0, 3.0, 2.0, 3.0));
        assert_eq!(covered.len(), 1);
    }

    #[test]
    fn identical_boxes_have_full_iou() {
        let bbox = BBox::new(0.1, 0.1, 0.4, 0.2);
        let fields = vec![
            Field::builder(bbox, 0).text("invoice").build(),
            Field::builder(BBox::new(0.5, 0.5, 0.9, 0.6), 0)
                .text("total")
                .build(),
        ];
        let index = index_of(&fields);
        assert_eq!(index.iou(0, &bbox, &bbox), Ok(1.0));
    }

    #[test]
    fn iou_counts_shared_pccs_from_whole_page() {
        let fields = vec![Field::builder(BBox::new(0.0, 0.0, 4.0, 1.0), 0)
            .text("abcd")
            .build()];
        let index = index_of(&fields);
        // gold covers x=0.5,1.5; prediction covers x=0.5,1.5,2.5
        let iou = index
            .iou(0, &BBox::new(0.0, 0.0, 2.0, 1.0), &BBox::new(0.0, 0.0, 3.0, 1.0))
            .unwrap();
        assert!((iou - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_boxes_have_zero_iou() {
        let fields = vec![Field::builder(BBox::new(0.0, 0.0, 4.0, 1.0), 0)
            .text("abcd")
            .build()];
        let index = index_of(&fields);
        let iou = index
            .iou(0, &BBox::new(0.0, 0.0, 1.0, 1.0), &BBox::new(3.0, 0.0, 4.0, 1.0))
            .unwrap();
        assert_eq!(iou, 0.0);
    }

    #[test]
    fn empty_union_is_an_error() {
        let fields = vec![Field::builder(BBox::new(0.0, 0.0, 1.0, 1.0), 0)
            .text("a")
            .build()];
        let index = index_of(&fields);
        let empty = BBox::new(5.0, 5.0, 6.0, 6.0);
        assert_eq!(
            index.iou(0, &empty, &empty),
            Err(MatchError::EmptyUnion { page: 0 })
        );
        assert_eq!(
            index.iou(4, &empty, &empty),
            Err(MatchError::EmptyUnion { page: 4 })
        );
    }

    #[test]
    fn sorts_each_page_independently() {
        let pccs = vec![
            Pcc::new(3.0, 1.0, 0),
            Pcc::new(1.0, 2.0, 1),
            Pcc::new(2.0, 0.0, 0),
        ];
        let index = PccIndex::new(&pccs);
        assert_eq!(index.page_count(), 2);
        let xs: Vec<f64> = index.sorted_x(0).iter().map(|p| p.x).collect();
        let ys: Vec<f64> = index.sorted_y(0).iter().map(|p| p.y).collect();
        assert_eq!(xs, vec![2.0, 3.0]);
        assert_eq!(ys, vec![0.0, 1.0]);
        assert_eq!(index.sorted_x(1).len(), 1);
        assert!(index.sorted_x(9).is_empty());
    }
}
