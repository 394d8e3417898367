//! Rubber-band selection and element move state.

use crate::config::SELECTION_THRESHOLD;
use crate::element::{Element, ElementId};
use crate::geometry::{document_order_cmp, intersects};
use kurbo::{Point, Rect, Vec2};

/// Direction the frame grows from the press point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameQuadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl FrameQuadrant {
    /// Quadrant of `current` relative to `origin`. Zero deltas grow right/down.
    pub fn from_points(origin: Point, current: Point) -> Self {
        let left = current.x < origin.x;
        let up = current.y < origin.y;
        match (left, up) {
            (true, true) => FrameQuadrant::TopLeft,
            (false, true) => FrameQuadrant::TopRight,
            (true, false) => FrameQuadrant::BottomLeft,
            (false, false) => FrameQuadrant::BottomRight,
        }
    }
}

/// Frame rectangle anchored at `origin` and stretched toward `current`.
pub fn frame_rect(origin: Point, current: Point) -> Rect {
    let width = (current.x - origin.x).abs();
    let height = (current.y - origin.y).abs();
    let (left, top) = match FrameQuadrant::from_points(origin, current) {
        FrameQuadrant::TopLeft => (current.x, current.y),
        FrameQuadrant::TopRight => (origin.x, current.y),
        FrameQuadrant::BottomLeft => (current.x, origin.y),
        FrameQuadrant::BottomRight => (origin.x, origin.y),
    };
    Rect::new(left, top, left + width, top + height)
}

/// Eligible elements whose rectangles overlap `frame`, in document order.
pub fn covered_elements(frame: Rect, candidates: &[Element]) -> Vec<ElementId> {
    let mut covered: Vec<&Element> = candidates
        .iter()
        .filter(|c| c.is_eligible() && intersects(frame, c.rect()))
        .collect();
    covered.sort_by(|a, b| document_order_cmp(a, b));
    covered.into_iter().map(|e| e.id).collect()
}

/// Phase of a rubber-band gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FramePhase {
    #[default]
    Idle,
    /// Pressed on the background, not yet past the threshold.
    Armed { origin: Point },
    /// Frame is visible and tracking the pointer.
    Dragging { origin: Point, current: Point },
}

/// Output of a frame gesture step.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The pointer crossed the threshold and the frame became visible.
    Started { frame: Rect, covered: Vec<ElementId> },
    /// The frame was resized.
    Changed { frame: Rect, covered: Vec<ElementId> },
    /// The frame was released and the selection finalized.
    Ended { selection: Vec<ElementId> },
}

/// Rubber-band selection state machine: Idle → Armed → Dragging → Idle.
#[derive(Debug, Clone)]
pub struct SelectionFrame {
    phase: FramePhase,
    threshold: f64,
    /// Elements under the frame right now (visual feedback).
    covered: Vec<ElementId>,
    /// Finalized selection from the last completed frame.
    selection: Vec<ElementId>,
}

impl Default for SelectionFrame {
    fn default() -> Self {
        Self::new(SELECTION_THRESHOLD)
    }
}

impl SelectionFrame {
    pub fn new(threshold: f64) -> Self {
        Self {
            phase: FramePhase::Idle,
            threshold,
            covered: Vec::new(),
            selection: Vec::new(),
        }
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Whether a press is being tracked (armed or dragging).
    pub fn is_active(&self) -> bool {
        self.phase != FramePhase::Idle
    }

    /// Current frame rectangle, only while dragging.
    pub fn frame(&self) -> Option<Rect> {
        match self.phase {
            FramePhase::Dragging { origin, current } => Some(frame_rect(origin, current)),
            _ => None,
        }
    }

    pub fn quadrant(&self) -> Option<FrameQuadrant> {
        match self.phase {
            FramePhase::Dragging { origin, current } => Some(FrameQuadrant::from_points(origin, current)),
            _ => None,
        }
    }

    pub fn covered(&self) -> &[ElementId] {
        &self.covered
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    /// Replace the finalized selection (e.g. click-to-select by the caller).
    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        self.selection = ids;
    }

    /// Pointer pressed on the canvas background.
    pub fn begin(&mut self, origin: Point) {
        self.phase = FramePhase::Armed { origin };
        self.covered.clear();
    }

    /// Pointer moved. Ignored while idle or still under the threshold.
    pub fn update(&mut self, point: Point, candidates: &[Element]) -> Option<SelectionEvent> {
        let (origin, started) = match self.phase {
            FramePhase::Idle => return None,
            FramePhase::Armed { origin } => {
                let dx = (point.x - origin.x).abs();
                let dy = (point.y - origin.y).abs();
                if dx <= self.threshold && dy <= self.threshold {
                    return None;
                }
                // Crossing the threshold starts a new selection.
                self.selection.clear();
                (origin, true)
            }
            FramePhase::Dragging { origin, .. } => (origin, false),
        };

        self.phase = FramePhase::Dragging { origin, current: point };
        let frame = frame_rect(origin, point);
        self.covered = covered_elements(frame, candidates);
        let covered = self.covered.clone();

        Some(if started {
            log::debug!("Selection frame started at ({}, {})", origin.x, origin.y);
            SelectionEvent::Started { frame, covered }
        } else {
            SelectionEvent::Changed { frame, covered }
        })
    }

    /// Pointer released. A press that never crossed the threshold is a plain click.
    pub fn end(&mut self) -> Option<SelectionEvent> {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            FramePhase::Dragging { .. } => {
                self.selection = std::mem::take(&mut self.covered);
                log::debug!("Selection frame ended with {} element(s)", self.selection.len());
                Some(SelectionEvent::Ended {
                    selection: self.selection.clone(),
                })
            }
            FramePhase::Armed { .. } | FramePhase::Idle => {
                self.covered.clear();
                None
            }
        }
    }

    /// Abort the gesture without touching the finalized selection.
    pub fn cancel(&mut self) {
        self.phase = FramePhase::Idle;
        self.covered.clear();
    }

    /// Drop covered marks and empty the selection.
    pub fn clear(&mut self) {
        self.covered.clear();
        self.selection.clear();
    }
}

/// State of an element move gesture.
#[derive(Debug, Clone)]
pub struct MoveState {
    /// The element under the pointer when the drag started.
    pub element_id: ElementId,
    /// Starting point of the drag.
    pub start_point: Point,
    /// Current point of the drag.
    pub current_point: Point,
    /// Every element moving with the drag, at its original position.
    pub originals: Vec<Element>,
}

impl MoveState {
    /// Create a new move state.
    pub fn new(element_id: ElementId, start_point: Point, originals: Vec<Element>) -> Self {
        Self {
            element_id,
            start_point,
            current_point: start_point,
            originals,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// Whether more than one element is moving.
    pub fn is_multi(&self) -> bool {
        self.originals.len() > 1
    }

    /// The grabbed element at its dragged position.
    pub fn dragged_element(&self) -> Option<Element> {
        let delta = self.delta();
        self.originals
            .iter()
            .find(|e| e.id == self.element_id)
            .map(|e| {
                let mut moved = *e;
                moved.left += delta.x;
                moved.top += delta.y;
                moved
            })
    }

    /// New top-left positions for every moving element.
    pub fn moved_positions(&self) -> Vec<(ElementId, Point)> {
        let delta = self.delta();
        self.originals
            .iter()
            .map(|e| (e.id, e.origin() + delta))
            .collect()
    }
}
