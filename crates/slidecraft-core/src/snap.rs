//! Alignment guides for single-element drags.
//!
//! Guides are feedback only: the dragged element is never pulled toward a
//! sibling, the guide just shows that two edges line up.

use crate::config::{EngineConfig, GUIDE_MARGIN, GUIDE_MIN_SPAN, SNAP_APPEAR_PROXIMITY};
use crate::element::{Element, ElementId};
use crate::geometry::is_valid_rect;
use kurbo::{Line, Point};

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAxis {
    /// A horizontal line: top/bottom edges line up.
    Horizontal,
    /// A vertical line: left/right edges line up.
    Vertical,
}

/// How the two edges relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideAlignment {
    /// Same edge on both elements (left with left, top with top...).
    Aligned,
    /// Opposite edges (right against left...), the elements abut.
    Abutting,
}

/// A visible guide line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapGuide {
    pub axis: GuideAxis,
    /// X of a vertical guide, Y of a horizontal one.
    pub position: f64,
    /// Start of the guide along its own direction, margin included.
    pub start: f64,
    /// End of the guide along its own direction, margin included.
    pub end: f64,
    /// Sibling that produced the guide.
    pub sibling: ElementId,
    pub alignment: GuideAlignment,
}

impl SnapGuide {
    /// The guide as a line segment in canvas coordinates.
    pub fn line(&self) -> Line {
        match self.axis {
            GuideAxis::Horizontal => Line::new(
                Point::new(self.start, self.position),
                Point::new(self.end, self.position),
            ),
            GuideAxis::Vertical => Line::new(
                Point::new(self.position, self.start),
                Point::new(self.position, self.end),
            ),
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// The guides currently shown for a drag (at most one per axis).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapGuides {
    pub horizontal: Option<SnapGuide>,
    pub vertical: Option<SnapGuide>,
}

impl SnapGuides {
    /// No guides.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

/// Distances controlling guide appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    /// Maximum edge distance for a match.
    pub appear_proximity: f64,
    /// Added to both ends of a guide.
    pub margin: f64,
    /// Unions of extents this short or shorter hide the guide.
    pub min_span: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            appear_proximity: SNAP_APPEAR_PROXIMITY,
            margin: GUIDE_MARGIN,
            min_span: GUIDE_MIN_SPAN,
        }
    }
}

impl From<&EngineConfig> for SnapSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            appear_proximity: config.snap_appear_proximity,
            margin: config.guide_margin,
            min_span: config.guide_min_span,
        }
    }
}

/// Extent of an element along one axis.
#[derive(Debug, Clone, Copy)]
struct Span {
    lo: f64,
    hi: f64,
}

/// First edge pair within `proximity`, returned as (guide position, alignment).
///
/// Same-edge pairs are tried before opposite-edge pairs.
fn match_edges(dragged: Span, sibling: Span, proximity: f64) -> Option<(f64, GuideAlignment)> {
    let pairs = [
        (dragged.lo, sibling.lo, GuideAlignment::Aligned),
        (dragged.hi, sibling.hi, GuideAlignment::Aligned),
        (dragged.lo, sibling.hi, GuideAlignment::Abutting),
        (dragged.hi, sibling.lo, GuideAlignment::Abutting),
    ];
    pairs
        .into_iter()
        .find(|(edge, target, _)| (edge - target).abs() <= proximity)
        .map(|(_, target, alignment)| (target, alignment))
}

fn find_guide(
    axis: GuideAxis,
    dragged: &Element,
    siblings: &[&Element],
    settings: &SnapSettings,
) -> Option<SnapGuide> {
    // The matched edges run across the guide; the extents run along it.
    let across = |e: &Element| match axis {
        GuideAxis::Vertical => Span { lo: e.left, hi: e.right() },
        GuideAxis::Horizontal => Span { lo: e.top, hi: e.bottom() },
    };
    let along = |e: &Element| match axis {
        GuideAxis::Vertical => Span { lo: e.top, hi: e.bottom() },
        GuideAxis::Horizontal => Span { lo: e.left, hi: e.right() },
    };

    let (sibling, position, alignment) = siblings.iter().find_map(|sibling| {
        match_edges(across(dragged), across(sibling), settings.appear_proximity)
            .map(|(position, alignment)| (*sibling, position, alignment))
    })?;

    let a = along(dragged);
    let b = along(sibling);
    let lo = a.lo.min(b.lo);
    let hi = a.hi.max(b.hi);
    if hi - lo <= settings.min_span {
        return None;
    }

    Some(SnapGuide {
        axis,
        position,
        start: lo - settings.margin,
        end: hi + settings.margin,
        sibling: sibling.id,
        alignment,
    })
}

/// Compute alignment guides for `dragged` against its siblings.
///
/// Meta elements, the dragged element itself and degenerate rectangles are
/// ignored. For each axis the first sibling with a matching edge wins; if
/// its combined span is too short the guide for that axis is hidden.
pub fn compute_guides(dragged: &Element, siblings: &[Element], settings: &SnapSettings) -> SnapGuides {
    if !is_valid_rect(dragged.rect()) {
        return SnapGuides::none();
    }
    let siblings: Vec<&Element> = siblings
        .iter()
        .filter(|s| s.id != dragged.id && !s.is_meta() && is_valid_rect(s.rect()))
        .collect();

    SnapGuides {
        horizontal: find_guide(GuideAxis::Horizontal, dragged, &siblings, settings),
        vertical: find_guide(GuideAxis::Vertical, dragged, &siblings, settings),
    }
}
