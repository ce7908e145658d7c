//! Redaction box detection.
//!
//! The shape source reports every filled path on a page.  Most of them are
//! table backgrounds, rules, underlines and highlights; only dark, opaque,
//! reasonably large rectangles (and explicit `/Redact` annotations) are
//! kept as redaction boxes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::BBox;

/// Fill color of a shape, in the color space it was painted with.
///
/// Components are in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fill {
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
    /// Filled, but the source could not tell the color (patterns, named
    /// color spaces).
    Unknown,
}

impl Fill {
    /// Convert to device RGB, `None` for [`Fill::Unknown`].
    pub fn to_rgb(&self) -> Option<(f64, f64, f64)> {
        match *self {
            Fill::Gray(g) => Some((g, g, g)),
            Fill::Rgb(r, g, b) => Some((r, g, b)),
            Fill::Cmyk(c, m, y, k) => Some((
                (1.0 - c) * (1.0 - k),
                (1.0 - m) * (1.0 - k),
                (1.0 - y) * (1.0 - k),
            )),
            Fill::Unknown => None,
        }
    }

    /// Every RGB component is below `threshold`.
    pub fn is_dark(&self, threshold: f64) -> Option<bool> {
        self.to_rgb()
            .map(|(r, g, b)| r < threshold && g < threshold && b < threshold)
    }
}

/// Where a shape came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeOrigin {
    /// A filled path in the page content stream.
    Drawing,
    /// A `/Redact` annotation rectangle.
    Annotation,
}

/// A filled shape as reported by the shape source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShape {
    pub bbox: BBox,
    pub page_index: usize,
    pub fill: Fill,
    /// Fill alpha in `0.0..=1.0`, when known.
    pub opacity: Option<f64>,
    pub origin: ShapeOrigin,
}

impl RawShape {
    pub fn drawing(bbox: BBox, page_index: usize, fill: Fill) -> Self {
        RawShape {
            bbox,
            page_index,
            fill,
            opacity: None,
            origin: ShapeOrigin::Drawing,
        }
    }

    pub fn annotation(bbox: BBox, page_index: usize) -> Self {
        RawShape {
            bbox,
            page_index,
            fill: Fill::Unknown,
            opacity: None,
            origin: ShapeOrigin::Annotation,
        }
    }
}

/// Identifier of a detected box: page plus detection order on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId {
    pub page_index: usize,
    pub ordinal: usize,
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}-b{}", self.page_index, self.ordinal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionBox {
    pub id: BoxId,
    pub bbox: BBox,
    pub page_index: usize,
    pub origin: ShapeOrigin,
}

/// Why shapes were rejected by the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDrops {
    pub degenerate: usize,
    pub not_dark: usize,
    pub translucent: usize,
    pub too_small: usize,
    pub duplicate: usize,
}

impl ShapeDrops {
    pub fn total(&self) -> usize {
        self.degenerate + self.not_dark + self.translucent + self.too_small + self.duplicate
    }

    pub fn merge(&mut self, other: &ShapeDrops) {
        self.degenerate += other.degenerate;
        self.not_dark += other.not_dark;
        self.translucent += other.translucent;
        self.too_small += other.too_small;
        self.duplicate += other.duplicate;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectedBoxes {
    pub boxes: Vec<RedactionBox>,
    pub drops: ShapeDrops,
}

/// Keep the shapes of one page that look like redaction bars.
///
/// `page_index` is used for the box ids; shapes are expected to belong to
/// that page.  An empty input yields an empty set.
pub fn detect_redaction_boxes(
    page_index: usize,
    shapes: &[RawShape],
    config: &LayoutConfig,
) -> DetectedBoxes {
    let mut drops = ShapeDrops::default();
    let mut boxes: Vec<RedactionBox> = Vec::new();

    for shape in shapes {
        if !shape.bbox.is_finite() {
            drops.degenerate += 1;
            continue;
        }
        let bbox = shape.bbox.normalized();
        if bbox.is_degenerate() {
            drops.degenerate += 1;
            continue;
        }

        if shape.origin == ShapeOrigin::Drawing {
            if let Some(reason) = reject_drawing(shape, &bbox, config) {
                match reason {
                    Rejection::NotDark => drops.not_dark += 1,
                    Rejection::Translucent => drops.translucent += 1,
                    Rejection::TooSmall => drops.too_small += 1,
                }
                continue;
            }
        }

        if boxes.iter().any(|b| b.bbox == bbox) {
            drops.duplicate += 1;
            continue;
        }

        boxes.push(RedactionBox {
            id: BoxId {
                page_index,
                ordinal: boxes.len(),
            },
            bbox,
            page_index,
            origin: shape.origin,
        });
    }

    DetectedBoxes { boxes, drops }
}

enum Rejection {
    NotDark,
    Translucent,
    TooSmall,
}

fn reject_drawing(shape: &RawShape, bbox: &BBox, config: &LayoutConfig) -> Option<Rejection> {
    let dark = shape
        .fill
        .is_dark(config.dark_threshold)
        .unwrap_or(config.accept_unknown_fill);
    if !dark {
        return Some(Rejection::NotDark);
    }

    if shape.opacity.is_some_and(|a| a < config.min_opacity) {
        return Some(Rejection::Translucent);
    }

    if bbox.width() <= config.min_box_width
        || bbox.height() <= config.min_box_height
        || bbox.area() < config.min_box_area
    {
        return Some(Rejection::TooSmall);
    }

    None
}
