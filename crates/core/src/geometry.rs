use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page space.
///
/// Page space has its origin at the top-left corner of the page, `x` grows to
/// the right and `y` grows downwards, so `y0` is the top edge and `y1` the
/// bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    /// Build a box from two arbitrary corners, ordering the coordinates.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        BBox {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width() * self.height()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Zero (or negative) width or height.
    pub fn is_degenerate(&self) -> bool {
        !(self.x0 < self.x1 && self.y0 < self.y1)
    }

    /// Same box with its corners ordered so that `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> Self {
        BBox::from_corners(self.x0, self.y0, self.x1, self.y1)
    }

    /// Area of the intersection with `other`, `0.0` when they do not overlap.
    pub fn intersection_area(&self, other: &BBox) -> f64 {
        let ix0 = self.x0.max(other.x0);
        let iy0 = self.y0.max(other.y0);
        let ix1 = self.x1.min(other.x1);
        let iy1 = self.y1.min(other.y1);

        if ix0 >= ix1 || iy0 >= iy1 {
            return 0.0;
        }

        (ix1 - ix0) * (iy1 - iy0)
    }

    /// Fraction of this box's area covered by `other`, in `[0, 1]`.
    pub fn covered_fraction(&self, other: &BBox) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        (self.intersection_area(other) / area).clamp(0.0, 1.0)
    }

    pub fn union(&self, other: &BBox) -> Self {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_orders_coordinates() {
        let b = BBox::from_corners(10.0, 8.0, 2.0, 4.0);
        assert_eq!(b, BBox::new(2.0, 4.0, 10.0, 8.0));
    }

    #[test]
    fn test_degenerate() {
        assert!(BBox::new(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(BBox::new(0.0, 5.0, 10.0, 5.0).is_degenerate());
        assert!(BBox::new(5.0, 0.0, 1.0, 10.0).is_degenerate());
        assert!(!BBox::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
        assert_eq!(BBox::new(0.0, 0.0, 0.0, 10.0).area(), 0.0);
    }

    #[test]
    fn test_intersection_area() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.intersection_area(&b), 25.0);
        assert_eq!(b.intersection_area(&a), 25.0);
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn test_covered_fraction_inside() {
        let word = BBox::new(2.0, 2.0, 8.0, 8.0);
        let bar = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(word.covered_fraction(&bar), 1.0);
        assert!((bar.covered_fraction(&word) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite() {
        assert!(!BBox::new(f64::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(!BBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_finite());
    }
}
