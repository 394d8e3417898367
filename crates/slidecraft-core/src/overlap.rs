//! Overlap groups and stacking resolution.
//!
//! An overlap group is the target element plus every eligible sibling whose
//! rectangle intersects it, sorted bottom-to-top by [`stacking_cmp`]. Groups
//! are recomputed from current rectangles on every call and never cached.

use crate::element::{Element, ElementId};
use crate::geometry::{contains_point, intersects, stacking_cmp};
use kurbo::Point;

/// Elements sharing one elevation value inside an overlap group.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationBucket {
    /// `None` for elements that were never assigned an elevation.
    pub elevation: Option<u32>,
    /// Member ids in document order.
    pub members: Vec<ElementId>,
}

/// Bottom-to-top ordered elements overlapping a target.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapGroup {
    target: ElementId,
    members: Vec<Element>,
}

impl OverlapGroup {
    /// The element the group was computed for.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Members in stacking order; index 0 is visually bottom-most.
    pub fn members(&self) -> &[Element] {
        &self.members
    }

    /// Member ids in stacking order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.members.iter().map(|e| e.id).collect()
    }

    /// Stacking index of an element within the group.
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.members.iter().position(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Partition the group by elevation, preserving stacking order.
    pub fn buckets(&self) -> Vec<ElevationBucket> {
        let mut buckets: Vec<ElevationBucket> = Vec::new();
        for element in &self.members {
            match buckets.last_mut() {
                Some(bucket) if bucket.elevation == element.elevation => {
                    bucket.members.push(element.id);
                }
                _ => buckets.push(ElevationBucket {
                    elevation: element.elevation,
                    members: vec![element.id],
                }),
            }
        }
        buckets
    }

    pub(crate) fn into_members(self) -> Vec<Element> {
        self.members
    }
}

/// Find every eligible element overlapping `target`, including `target`.
///
/// The target is always part of the result, even when it would not itself
/// be eligible, so elevation logic can locate it.
pub fn find_overlapping(target: &Element, candidates: &[Element]) -> OverlapGroup {
    let target_rect = target.rect();
    let mut members: Vec<Element> = candidates
        .iter()
        .filter(|c| c.id != target.id && c.is_eligible())
        .filter(|c| intersects(target_rect, c.rect()))
        .copied()
        .collect();
    members.push(*target);
    members.sort_by(stacking_cmp);

    OverlapGroup {
        target: target.id,
        members,
    }
}

/// Find the bottom-most eligible element whose rectangle contains the point.
///
/// Elevated elements win over unelevated ones, lowest elevation first; ties
/// and the all-unelevated case fall back to document order.
pub fn bottom_most_under_cursor(point: Point, candidates: &[Element]) -> Option<Element> {
    candidates
        .iter()
        .filter(|c| c.is_eligible() && contains_point(c.rect(), point))
        .min_by(|a, b| stacking_cmp(a, b))
        .copied()
}

/// Find the top-most eligible element whose rectangle contains the point.
pub fn top_most_under_cursor(point: Point, candidates: &[Element]) -> Option<Element> {
    candidates
        .iter()
        .filter(|c| c.is_eligible() && contains_point(c.rect(), point))
        .max_by(|a, b| stacking_cmp(a, b))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementRole;

    fn element(id: ElementId, order: u32, left: f64, top: f64, size: f64) -> Element {
        let mut e = Element::new(id, left, top, size, size);
        e.document_order = order;
        e
    }

    #[test]
    fn test_group_contains_target_and_overlaps() {
        let target = element(1, 0, 0.0, 0.0, 100.0);
        let candidates = vec![
            target,
            element(2, 1, 50.0, 50.0, 100.0),
            element(3, 2, 500.0, 500.0, 10.0),
            element(4, 3, 100.0, 0.0, 50.0),
        ];
        let group = find_overlapping(&target, &candidates);

        assert_eq!(group.target(), 1);
        assert_eq!(group.ids(), vec![1, 2]);
    }

    #[test]
    fn test_group_excludes_locked_and_meta() {
        let target = element(1, 0, 0.0, 0.0, 100.0);
        let candidates = vec![
            target,
            element(2, 1, 10.0, 10.0, 10.0).with_locked(true),
            element(3, 2, 10.0, 10.0, 10.0).with_role(ElementRole::Title),
            element(4, 3, 10.0, 10.0, 10.0),
        ];
        let group = find_overlapping(&target, &candidates);
        assert_eq!(group.ids(), vec![1, 4]);
    }

    #[test]
    fn test_group_excludes_degenerate_rects() {
        let target = element(1, 0, 0.0, 0.0, 100.0);
        let mut broken = element(2, 1, 10.0, 10.0, 10.0);
        broken.width = f64::NAN;
        let group = find_overlapping(&target, &[target, broken]);
        assert_eq!(group.ids(), vec![1]);
    }

    #[test]
    fn test_group_sorted_by_elevation_then_order() {
        let target = element(1, 4, 0.0, 0.0, 100.0).with_elevation(1);
        let candidates = vec![
            target,
            element(2, 0, 10.0, 10.0, 10.0),
            element(3, 1, 10.0, 10.0, 10.0).with_elevation(1),
            element(4, 2, 10.0, 10.0, 10.0).with_elevation(0),
            element(5, 3, 10.0, 10.0, 10.0),
        ];
        let group = find_overlapping(&target, &candidates);
        assert_eq!(group.ids(), vec![4, 3, 1, 2, 5]);

        let buckets = group.buckets();
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0], ElevationBucket { elevation: Some(0), members: vec![4] });
        assert_eq!(buckets[1], ElevationBucket { elevation: Some(1), members: vec![3, 1] });
        assert_eq!(buckets[2], ElevationBucket { elevation: None, members: vec![2, 5] });
    }

    #[test]
    fn test_tie_break_independent_of_input_order() {
        let a = element(1, 7, 0.0, 0.0, 50.0).with_elevation(0);
        let b = element(2, 5, 10.0, 10.0, 50.0).with_elevation(0);

        let forward = find_overlapping(&a, &[a, b]);
        let backward = find_overlapping(&a, &[b, a]);
        assert_eq!(forward.ids(), vec![2, 1]);
        assert_eq!(backward.ids(), vec![2, 1]);
    }

    #[test]
    fn test_bottom_most_prefers_lowest_elevation() {
        let candidates = vec![
            element(1, 0, 0.0, 0.0, 100.0),
            element(2, 1, 0.0, 0.0, 100.0).with_elevation(3),
            element(3, 2, 0.0, 0.0, 100.0).with_elevation(1),
        ];
        let hit = bottom_most_under_cursor(Point::new(50.0, 50.0), &candidates).unwrap();
        assert_eq!(hit.id, 3);
    }

    #[test]
    fn test_bottom_most_without_elevation_uses_document_order() {
        let candidates = vec![
            element(1, 3, 0.0, 0.0, 100.0),
            element(2, 1, 0.0, 0.0, 100.0),
            element(3, 2, 0.0, 0.0, 100.0),
        ];
        let hit = bottom_most_under_cursor(Point::new(100.0, 100.0), &candidates).unwrap();
        assert_eq!(hit.id, 2);
    }

    #[test]
    fn test_bottom_most_none_when_missing() {
        let candidates = vec![
            element(1, 0, 0.0, 0.0, 10.0),
            element(2, 1, 20.0, 20.0, 10.0).with_locked(true),
        ];
        assert!(bottom_most_under_cursor(Point::new(25.0, 25.0), &candidates).is_none());
        assert!(bottom_most_under_cursor(Point::new(15.0, 15.0), &candidates).is_none());
    }

    #[test]
    fn test_top_most_under_cursor() {
        let candidates = vec![
            element(1, 0, 0.0, 0.0, 100.0).with_elevation(2),
            element(2, 1, 0.0, 0.0, 100.0).with_elevation(0),
            element(3, 2, 0.0, 0.0, 100.0),
        ];
        let hit = top_most_under_cursor(Point::new(5.0, 5.0), &candidates).unwrap();
        assert_eq!(hit.id, 3);
    }
}
