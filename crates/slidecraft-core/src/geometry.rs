//! Pure rectangle math for the slide canvas.
//!
//! All coordinates are canvas pixels. Overlap uses open intervals so two
//! elements that only share an edge do not overlap; point hits use closed
//! intervals so the cursor on a border still counts as inside.

use crate::element::Element;
use kurbo::{Point, Rect};
use std::cmp::Ordering;

/// Check whether two rectangles overlap with a non-empty interior.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Check whether `outer` fully contains `inner` (shared edges allowed).
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Check whether a point lies inside a rectangle, boundaries included.
///
/// `kurbo::Rect::contains` is half-open on the far edges, which would make
/// the right and bottom borders unclickable.
pub fn contains_point(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// A rectangle is usable when all coordinates are finite and it has area.
pub fn is_valid_rect(rect: Rect) -> bool {
    let finite = rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite();
    finite && rect.x1 > rect.x0 && rect.y1 > rect.y0
}

/// Order two elements by insertion order, falling back to id for a total order.
pub fn document_order_cmp(a: &Element, b: &Element) -> Ordering {
    a.document_order
        .cmp(&b.document_order)
        .then_with(|| a.id.cmp(&b.id))
}

/// Bottom-to-top stacking order.
///
/// Elevated elements come first, lowest elevation at the bottom. Elements
/// without an elevation form one group above every elevated one. Ties fall
/// back to [`document_order_cmp`].
pub fn stacking_cmp(a: &Element, b: &Element) -> Ordering {
    let by_elevation = match (a.elevation, b.elevation) {
        (Some(ea), Some(eb)) => ea.cmp(&eb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_elevation.then_with(|| document_order_cmp(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
        Rect::new(left, top, left + width, top + height)
    }

    #[test]
    fn test_intersects_overlapping() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(a, b));
        assert!(intersects(b, a));
    }

    #[test]
    fn test_intersects_edge_touching_is_false() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(a, b));
        assert!(!intersects(b, a));

        let below = rect(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(a, below));
    }

    #[test]
    fn test_intersects_is_symmetric() {
        let rects = [
            rect(0.0, 0.0, 10.0, 10.0),
            rect(9.0, 9.0, 1.0, 1.0),
            rect(-5.0, 2.0, 30.0, 3.0),
            rect(20.0, 20.0, 5.0, 5.0),
            rect(10.0, 10.0, 4.0, 4.0),
        ];
        for a in rects {
            for b in rects {
                assert_eq!(intersects(a, b), intersects(b, a));
            }
        }
    }

    #[test]
    fn test_contains_point_inclusive() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert!(contains_point(r, Point::new(0.0, 0.0)));
        assert!(contains_point(r, Point::new(10.0, 10.0)));
        assert!(contains_point(r, Point::new(5.0, 10.0)));
        assert!(!contains_point(r, Point::new(10.1, 5.0)));
        assert!(!contains_point(r, Point::new(5.0, -0.1)));
    }

    #[test]
    fn test_contains_rect() {
        let outer = rect(0.0, 0.0, 100.0, 100.0);
        assert!(contains_rect(outer, rect(0.0, 0.0, 100.0, 100.0)));
        assert!(contains_rect(outer, rect(10.0, 10.0, 5.0, 5.0)));
        assert!(!contains_rect(outer, rect(90.0, 90.0, 20.0, 5.0)));
    }

    #[test]
    fn test_degenerate_rects() {
        assert!(is_valid_rect(rect(0.0, 0.0, 1.0, 1.0)));
        assert!(!is_valid_rect(rect(0.0, 0.0, 0.0, 10.0)));
        assert!(!is_valid_rect(rect(0.0, 0.0, 10.0, 0.0)));
        assert!(!is_valid_rect(Rect::new(0.0, 0.0, f64::NAN, 10.0)));
        assert!(!is_valid_rect(Rect::new(f64::NEG_INFINITY, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_stacking_tie_break_by_document_order() {
        let mut a = Element::new(1, 0.0, 0.0, 10.0, 10.0);
        a.document_order = 7;
        a.elevation = Some(2);
        let mut b = Element::new(2, 0.0, 0.0, 10.0, 10.0);
        b.document_order = 5;
        b.elevation = Some(2);

        assert_eq!(stacking_cmp(&b, &a), Ordering::Less);
        assert_eq!(stacking_cmp(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_stacking_unset_elevation_sorts_last() {
        let mut elevated = Element::new(1, 0.0, 0.0, 10.0, 10.0);
        elevated.elevation = Some(40);
        elevated.document_order = 9;
        let mut unset = Element::new(2, 0.0, 0.0, 10.0, 10.0);
        unset.document_order = 0;

        assert_eq!(stacking_cmp(&elevated, &unset), Ordering::Less);
    }
}
