use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, either normalized to `[0, 1]` or in absolute pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    pub fn to_absolute_coords(&self, width: f64, height: f64) -> Self {
        Self {
            left: self.left * width,
            top: self.top * height,
            right: self.right * width,
            bottom: self.bottom * height,
        }
    }

    pub fn to_tuple(&self) -> (f64, f64, f64, f64) {
        (self.left, self.top, self.right, self.bottom)
    }

    /// Touching edges count as an intersection.
    pub fn intersects(&self, other: &Self) -> bool {
        if self.left > other.right || other.left > self.right {
            return false;
        }
        if self.top > other.bottom || other.top > self.bottom {
            return false;
        }
        true
    }
}

impl From<[f64; 4]> for BBox {
    fn from(coords: [f64; 4]) -> Self {
        let [left, top, right, bottom] = coords;
        Self::new(left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scales_to_absolute_coords() {
        let bbox = BBox::new(0.1, 0.2, 0.5, 0.25);
        let abs = bbox.to_absolute_coords(1000.0, 2000.0);
        assert_eq!(abs.to_tuple(), (100.0, 400.0, 500.0, 500.0));
    }

    #[test]
    fn absolute_coords_scaling_is_invertible() {
        let bbox = BBox::new(0.13, 0.27, 0.61, 0.93);
        let back = bbox
            .to_absolute_coords(1654.0, 2339.0)
            .to_absolute_coords(1.0 / 1654.0, 1.0 / 2339.0);
        assert!((back.left - bbox.left).abs() < 1e-12);
        assert!((back.top - bbox.top).abs() < 1e-12);
        assert!((back.right - bbox.right).abs() < 1e-12);
        assert!((back.bottom - bbox.bottom).abs() < 1e-12);
    }

    #[test]
    fn intersection_is_symmetric() {
        let boxes = [
            BBox::new(0.0, 0.0, 10.0, 10.0),
            BBox::new(5.0, 5.0, 15.0, 15.0),
            BBox::new(10.0, 0.0, 20.0, 10.0),
            BBox::new(11.0, 11.0, 12.0, 12.0),
            BBox::new(3.0, 3.0, 3.0, 3.0),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.intersects(b), b.intersects(a));
            }
        }
    }

    #[test]
    fn touching_edges_intersect() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&BBox::new(10.0, 0.0, 20.0, 10.0)));
        assert!(a.intersects(&BBox::new(0.0, 10.0, 10.0, 20.0)));
        assert!(!a.intersects(&BBox::new(10.5, 0.0, 20.0, 10.0)));
        assert!(!a.intersects(&BBox::new(0.0, 10.5, 10.0, 20.0)));
    }

    #[test]
    fn degenerate_box_inside_intersects() {
        let point = BBox::new(3.0, 3.0, 3.0, 3.0);
        assert!(point.intersects(&BBox::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(point.width(), 0.0);
        assert_eq!(point.center(), (3.0, 3.0));
    }
}
