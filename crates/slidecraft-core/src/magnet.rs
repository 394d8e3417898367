//! Magnet gesture: reach through stacked elements and re-elevate them.
//!
//! While the structural modifier is held, the bottom-most element under the
//! cursor is highlighted; clicking promotes it one step within its overlap
//! group. Every promote or demote renumbers the whole group to dense
//! elevations `0..n`.

use crate::element::{Element, ElementId, ElevationAssignment};
use crate::overlap::{bottom_most_under_cursor, find_overlapping};
use kurbo::Point;

/// Direction of an elevation change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevationStep {
    /// Swap with the element directly above.
    Promote,
    /// Swap with the element directly below.
    Demote,
}

/// Result of a promote or demote on one overlap group.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationChange {
    /// The element that was promoted or demoted.
    pub target: ElementId,
    /// The target's new elevation.
    pub elevation: u32,
    /// New elevation for every group member, bottom to top.
    pub assignments: Vec<ElevationAssignment>,
}

impl ElevationChange {
    /// Group member ids, sorted. Used as the write coalescing key.
    pub fn member_ids(&self) -> Vec<ElementId> {
        let mut ids: Vec<_> = self.assignments.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Move an element one step within its overlap group.
///
/// Returns `None` when the element is missing or ineligible, when it overlaps
/// nothing, or when it is already at the end of the group in the requested
/// direction.
pub fn step_elevation(id: ElementId, elements: &[Element], step: ElevationStep) -> Option<ElevationChange> {
    let target = elements.iter().find(|e| e.id == id)?;
    if !target.is_eligible() {
        return None;
    }

    let group = find_overlapping(target, elements);
    if group.len() <= 1 {
        return None;
    }

    let from = group.position_of(id)?;
    let to = match step {
        ElevationStep::Promote => Some(from + 1).filter(|&i| i < group.len())?,
        ElevationStep::Demote => from.checked_sub(1)?,
    };

    let mut members = group.into_members();
    members.swap(from, to);

    let assignments = members
        .iter()
        .zip(0u32..)
        .map(|(element, elevation)| ElevationAssignment {
            id: element.id,
            elevation,
        })
        .collect();

    Some(ElevationChange {
        target: id,
        elevation: u32::try_from(to).ok()?,
        assignments,
    })
}

/// Promote an element one step within its overlap group.
pub fn promote(id: ElementId, elements: &[Element]) -> Option<ElevationChange> {
    step_elevation(id, elements, ElevationStep::Promote)
}

/// Demote an element one step within its overlap group.
pub fn demote(id: ElementId, elements: &[Element]) -> Option<ElevationChange> {
    step_elevation(id, elements, ElevationStep::Demote)
}

/// Highlight change produced by the magnet gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagnetHighlight {
    pub element: Option<ElementId>,
}

/// Magnet gesture state, reset on key release, click and blur.
#[derive(Debug, Clone, Default)]
pub struct MagnetGesture {
    modifier_held: bool,
    highlighted: Option<ElementId>,
}

impl MagnetGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.modifier_held
    }

    pub fn highlighted(&self) -> Option<ElementId> {
        self.highlighted
    }

    /// Update the modifier state. Releasing it drops any highlight.
    pub fn set_modifier(&mut self, held: bool) -> Option<MagnetHighlight> {
        self.modifier_held = held;
        if held {
            None
        } else {
            self.clear_highlight()
        }
    }

    /// Track the pointer. Reports only when the highlighted element changes.
    pub fn pointer_move(&mut self, point: Point, elements: &[Element]) -> Option<MagnetHighlight> {
        if !self.modifier_held {
            return None;
        }
        let hit = bottom_most_under_cursor(point, elements).map(|e| e.id);
        if hit == self.highlighted {
            return None;
        }
        self.highlighted = hit;
        Some(MagnetHighlight { element: hit })
    }

    /// Click while the modifier is held: promote the element under the cursor.
    ///
    /// The target is resolved again from current rectangles rather than
    /// trusting the last highlight.
    pub fn commit(&mut self, point: Point, elements: &[Element]) -> Option<ElevationChange> {
        if !self.modifier_held {
            return None;
        }
        let target = bottom_most_under_cursor(point, elements);
        self.highlighted = None;
        let change = promote(target?.id, elements);
        if let Some(change) = &change {
            log::debug!("Magnet promoted element {} to elevation {}", change.target, change.elevation);
        }
        change
    }

    /// Reset all state (blur).
    pub fn reset(&mut self) {
        self.modifier_held = false;
        self.highlighted = None;
    }

    fn clear_highlight(&mut self) -> Option<MagnetHighlight> {
        self.highlighted
            .take()
            .map(|_| MagnetHighlight { element: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementRole;
    use std::collections::BTreeSet;

    fn stacked(count: u64) -> Vec<Element> {
        (0..count)
            .map(|i| {
                let mut e = Element::new(i + 1, i as f64 * 10.0, 0.0, 100.0, 100.0);
                e.document_order = i as u32;
                e
            })
            .collect()
    }

    fn apply(elements: &mut [Element], change: &ElevationChange) {
        for assignment in &change.assignments {
            if let Some(e) = elements.iter_mut().find(|e| e.id == assignment.id) {
                e.elevation = Some(assignment.elevation);
            }
        }
    }

    fn elevations(elements: &[Element]) -> BTreeSet<u32> {
        elements.iter().filter_map(|e| e.elevation).collect()
    }

    #[test]
    fn test_promote_topmost_is_noop() {
        let elements = vec![
            Element::new(1, 0.0, 0.0, 50.0, 50.0).with_elevation(0),
            Element::new(2, 10.0, 10.0, 50.0, 50.0).with_elevation(1),
        ];
        assert!(promote(2, &elements).is_none());
        assert_eq!(elements[0].elevation, Some(0));
        assert_eq!(elements[1].elevation, Some(1));
    }

    #[test]
    fn test_demote_bottommost_is_noop() {
        let elements = stacked(3);
        assert!(demote(1, &elements).is_none());
    }

    #[test]
    fn test_single_element_group_is_noop() {
        let elements = vec![
            Element::new(1, 0.0, 0.0, 50.0, 50.0),
            Element::new(2, 500.0, 500.0, 50.0, 50.0),
        ];
        assert!(promote(1, &elements).is_none());
        assert!(demote(2, &elements).is_none());
    }

    #[test]
    fn test_promote_swaps_and_renumbers() {
        let elements = stacked(3);
        let change = promote(1, &elements).unwrap();

        assert_eq!(change.target, 1);
        assert_eq!(change.elevation, 1);
        assert_eq!(
            change.assignments,
            vec![
                ElevationAssignment { id: 2, elevation: 0 },
                ElevationAssignment { id: 1, elevation: 1 },
                ElevationAssignment { id: 3, elevation: 2 },
            ]
        );
        assert_eq!(change.member_ids(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sparse_elevations_become_dense() {
        let elements = vec![
            Element::new(1, 0.0, 0.0, 50.0, 50.0).with_elevation(4),
            Element::new(2, 10.0, 10.0, 50.0, 50.0).with_elevation(9),
            Element::new(3, 20.0, 20.0, 50.0, 50.0).with_elevation(20),
        ];
        let change = demote(3, &elements).unwrap();
        let values: Vec<u32> = change.assignments.iter().map(|a| a.elevation).collect();
        assert_eq!(values, vec![0, 1, 2]);
        assert_eq!(change.elevation, 1);
    }

    #[test]
    fn test_density_holds_across_sequences() {
        let mut elements = stacked(4);
        let steps = [
            (1, ElevationStep::Promote),
            (1, ElevationStep::Promote),
            (4, ElevationStep::Demote),
            (2, ElevationStep::Promote),
            (3, ElevationStep::Demote),
            (1, ElevationStep::Promote),
            (2, ElevationStep::Demote),
        ];
        let mut applied = 0;
        for (id, step) in steps {
            if let Some(change) = step_elevation(id, &elements, step) {
                apply(&mut elements, &change);
                applied += 1;
                let expected: BTreeSet<u32> = (0..4).collect();
                assert_eq!(elevations(&elements), expected);
            }
        }
        assert_eq!(applied, 5);
    }

    #[test]
    fn test_locked_and_meta_are_not_targets() {
        let elements = vec![
            Element::new(1, 0.0, 0.0, 50.0, 50.0).with_locked(true),
            Element::new(2, 10.0, 10.0, 50.0, 50.0).with_role(ElementRole::Title),
            Element::new(3, 20.0, 20.0, 50.0, 50.0),
        ];
        assert!(promote(1, &elements).is_none());
        assert!(promote(2, &elements).is_none());
        // The locked and meta elements do not form a group with element 3.
        assert!(promote(3, &elements).is_none());
    }

    #[test]
    fn test_magnet_highlights_bottom_most() {
        let elements = stacked(3);
        let mut magnet = MagnetGesture::new();

        assert!(magnet.pointer_move(Point::new(50.0, 50.0), &elements).is_none());

        magnet.set_modifier(true);
        let event = magnet.pointer_move(Point::new(50.0, 50.0), &elements);
        assert_eq!(event, Some(MagnetHighlight { element: Some(1) }));
        assert!(magnet.pointer_move(Point::new(55.0, 50.0), &elements).is_none());

        let event = magnet.set_modifier(false);
        assert_eq!(event, Some(MagnetHighlight { element: None }));
        assert_eq!(magnet.highlighted(), None);
    }

    #[test]
    fn test_magnet_commit_promotes() {
        let elements = stacked(2);
        let mut magnet = MagnetGesture::new();
        magnet.set_modifier(true);
        magnet.pointer_move(Point::new(50.0, 50.0), &elements);

        let change = magnet.commit(Point::new(50.0, 50.0), &elements).unwrap();
        assert_eq!(change.target, 1);
        assert_eq!(change.elevation, 1);
        assert_eq!(magnet.highlighted(), None);
    }

    #[test]
    fn test_magnet_commit_requires_modifier() {
        let elements = stacked(2);
        let mut magnet = MagnetGesture::new();
        assert!(magnet.commit(Point::new(50.0, 50.0), &elements).is_none());

        magnet.set_modifier(true);
        assert!(magnet.commit(Point::new(900.0, 900.0), &elements).is_none());
    }
}
