//! Gesture controller for one slide.
//!
//! `SlideEditor` routes pointer input to exactly one gesture at a time (frame
//! selection or element move), runs the magnet gesture alongside them while
//! the structural modifier is held, applies finished edits to the slide
//! optimistically and queues the matching writes.

use crate::commit::{CoalescingKey, CommitQueue, OperationKind, TransportResult, WritePayload, WriteTransport};
use crate::config::EngineConfig;
use crate::element::{Element, ElementId};
use crate::input::{Modifiers, Platform, PointerEvent};
use crate::magnet::{ElevationChange, ElevationStep, MagnetGesture, MagnetHighlight, step_elevation};
use crate::overlap::top_most_under_cursor;
use crate::selection::{MoveState, SelectionEvent, SelectionFrame};
use crate::slide::{ElementProvider, Slide, SlideResult};
use crate::snap::{SnapGuides, SnapSettings, compute_guides};
use kurbo::{Point, Rect};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Notifications for the surrounding editor chrome.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The selection frame became visible.
    SelectStart { frame: Rect, covered: Vec<ElementId> },
    /// The selection frame was resized.
    SelectionFrameChanged { frame: Rect, covered: Vec<ElementId> },
    /// The selection frame was released.
    SelectEnd { selection: Vec<ElementId> },
    /// An element move began.
    DragStart { element: ElementId, moving: Vec<ElementId> },
    /// Alignment guides changed (empty guides hide them).
    GuidesChanged(SnapGuides),
    /// An element move finished. `moved` is empty if nothing moved.
    DragEnd { moved: Vec<ElementId> },
    /// The magnet target changed.
    MagnetHighlight { element: Option<ElementId> },
    /// An element was promoted or demoted.
    ElevationChanged { element: ElementId, elevation: u32 },
}

impl From<SelectionEvent> for EditorEvent {
    fn from(event: SelectionEvent) -> Self {
        match event {
            SelectionEvent::Started { frame, covered } => EditorEvent::SelectStart { frame, covered },
            SelectionEvent::Changed { frame, covered } => EditorEvent::SelectionFrameChanged { frame, covered },
            SelectionEvent::Ended { selection } => EditorEvent::SelectEnd { selection },
        }
    }
}

impl From<MagnetHighlight> for EditorEvent {
    fn from(highlight: MagnetHighlight) -> Self {
        EditorEvent::MagnetHighlight {
            element: highlight.element,
        }
    }
}

/// Observer for dispatched writes of one operation kind.
pub type CommitHook = Rc<dyn Fn(&CoalescingKey, &TransportResult<()>)>;

#[derive(Default)]
struct CommitHooks {
    hooks: HashMap<OperationKind, CommitHook>,
}

impl fmt::Debug for CommitHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.hooks.keys().collect();
        kinds.sort();
        f.debug_struct("CommitHooks").field("kinds", &kinds).finish()
    }
}

/// Spatial editing state for one slide.
#[derive(Debug)]
pub struct SlideEditor {
    slide: Slide,
    config: EngineConfig,
    platform: Platform,
    snap: SnapSettings,
    frame: SelectionFrame,
    drag: Option<MoveState>,
    guides: SnapGuides,
    magnet: MagnetGesture,
    queue: CommitQueue,
    hooks: CommitHooks,
    events: Vec<EditorEvent>,
    last_elevation_change: Option<(ElementId, u32)>,
}

impl SlideEditor {
    /// Create an editor with the default configuration.
    pub fn new(slide: Slide) -> Self {
        Self::with_config(slide, EngineConfig::default())
    }

    /// Create an editor with a custom configuration.
    pub fn with_config(slide: Slide, config: EngineConfig) -> Self {
        Self {
            slide,
            platform: Platform::default(),
            snap: SnapSettings::from(&config),
            frame: SelectionFrame::new(config.selection_threshold),
            drag: None,
            guides: SnapGuides::none(),
            magnet: MagnetGesture::new(),
            queue: CommitQueue::from_config(&config),
            hooks: CommitHooks::default(),
            events: Vec::new(),
            last_elevation_change: None,
            config,
        }
    }

    pub fn slide(&self) -> &Slide {
        &self.slide
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Platform used to pick the structural modifier.
    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    // --- Pointer input ---

    /// Dispatch a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position, now),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position, now),
            PointerEvent::Cancel => self.cancel(),
        }
    }

    /// Pointer pressed on the canvas.
    pub fn pointer_down(&mut self, point: Point, now: Instant) {
        let elements = self.slide.elements();

        // A down without a matching up abandons the previous gesture.
        if self.frame.is_active() || self.drag.is_some() {
            self.reset_gestures();
        }

        if self.magnet.is_armed() {
            let had_highlight = self.magnet.highlighted().is_some();
            let change = self.magnet.commit(point, &elements);
            if had_highlight {
                self.events.push(EditorEvent::MagnetHighlight { element: None });
            }
            if let Some(change) = change {
                self.apply_elevation_change(change, now);
            }
            return;
        }

        match top_most_under_cursor(point, &elements) {
            Some(hit) => self.begin_move(hit.id, point, &elements),
            None => {
                log::debug!("Arming selection frame at ({}, {})", point.x, point.y);
                self.frame.begin(point);
            }
        }
    }

    fn begin_move(&mut self, id: ElementId, point: Point, elements: &[Element]) {
        let selection = self.frame.selection();
        let moving: Vec<Element> = if selection.len() > 1 && selection.contains(&id) {
            elements
                .iter()
                .filter(|e| selection.contains(&e.id) && e.is_eligible())
                .copied()
                .collect()
        } else {
            elements.iter().filter(|e| e.id == id).copied().collect()
        };

        let state = MoveState::new(id, point, moving);
        log::debug!("Drag started on element {} ({} moving)", id, state.originals.len());
        self.events.push(EditorEvent::DragStart {
            element: id,
            moving: state.originals.iter().map(|e| e.id).collect(),
        });
        self.drag = Some(state);
    }

    /// Pointer moved over the canvas.
    pub fn pointer_move(&mut self, point: Point) {
        let elements = self.slide.elements();

        if let Some(highlight) = self.magnet.pointer_move(point, &elements) {
            self.events.push(highlight.into());
        }

        if self.frame.is_active() {
            if let Some(event) = self.frame.update(point, &elements) {
                self.events.push(event.into());
            }
            return;
        }

        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.current_point = point;
        if drag.is_multi() {
            return;
        }
        let guides = match drag.dragged_element() {
            Some(dragged) => compute_guides(&dragged, &elements, &self.snap),
            None => SnapGuides::none(),
        };
        self.set_guides(guides);
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, point: Point, now: Instant) {
        if self.frame.is_active() {
            self.pointer_move(point);
            if let Some(event) = self.frame.end() {
                self.events.push(event.into());
            }
            return;
        }

        let Some(mut drag) = self.drag.take() else {
            return;
        };
        drag.current_point = point;
        self.set_guides(SnapGuides::none());

        let delta = drag.delta();
        let mut moved = Vec::new();
        if delta.x != 0.0 || delta.y != 0.0 {
            for (id, position) in drag.moved_positions() {
                if let Err(e) = self.slide.move_to(id, position.x, position.y) {
                    log::warn!("Dropping move of element {}: {}", id, e);
                    continue;
                }
                self.enqueue(
                    CoalescingKey::element(OperationKind::Position, id),
                    WritePayload::Position {
                        id,
                        left: position.x,
                        top: position.y,
                    },
                    now,
                );
                moved.push(id);
            }
        }
        log::debug!("Drag ended, {} element(s) moved", moved.len());
        self.events.push(EditorEvent::DragEnd { moved });
    }

    /// Abort every gesture (blur). Nothing is written.
    pub fn cancel(&mut self) {
        self.reset_gestures();
        if self.magnet.highlighted().is_some() {
            self.events.push(EditorEvent::MagnetHighlight { element: None });
        }
        self.magnet.reset();
    }

    fn reset_gestures(&mut self) {
        self.frame.cancel();
        self.drag = None;
        self.set_guides(SnapGuides::none());
    }

    fn set_guides(&mut self, guides: SnapGuides) {
        if guides != self.guides {
            self.guides = guides;
            self.events.push(EditorEvent::GuidesChanged(guides));
        }
    }

    // --- Magnet and elevation ---

    /// Report whether the structural modifier is held.
    pub fn set_magnet_modifier(&mut self, held: bool) {
        if let Some(highlight) = self.magnet.set_modifier(held) {
            self.events.push(highlight.into());
        }
    }

    /// Report the current modifier keys (Cmd arms the magnet on macOS, Ctrl elsewhere).
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.set_magnet_modifier(modifiers.is_structural(self.platform));
    }

    /// Promote an element one step within its overlap group.
    /// Returns the new elevation, or `None` if nothing changed.
    pub fn promote(&mut self, id: ElementId, now: Instant) -> Option<u32> {
        self.step(id, ElevationStep::Promote, now)
    }

    /// Demote an element one step within its overlap group.
    pub fn demote(&mut self, id: ElementId, now: Instant) -> Option<u32> {
        self.step(id, ElevationStep::Demote, now)
    }

    fn step(&mut self, id: ElementId, step: ElevationStep, now: Instant) -> Option<u32> {
        let change = step_elevation(id, &self.slide.elements(), step)?;
        let elevation = change.elevation;
        self.apply_elevation_change(change, now).then_some(elevation)
    }

    fn apply_elevation_change(&mut self, change: ElevationChange, now: Instant) -> bool {
        if let Err(e) = self.slide.apply_elevations(&change.assignments) {
            log::warn!("Discarding elevation change for element {}: {}", change.target, e);
            return false;
        }
        self.enqueue(
            CoalescingKey::group(OperationKind::Elevation, change.member_ids()),
            WritePayload::Elevation {
                assignments: change.assignments,
            },
            now,
        );
        self.last_elevation_change = Some((change.target, change.elevation));
        self.events.push(EditorEvent::ElevationChanged {
            element: change.target,
            elevation: change.elevation,
        });
        true
    }

    /// Last promoted/demoted element and its new elevation.
    pub fn last_elevation_change(&self) -> Option<(ElementId, u32)> {
        self.last_elevation_change
    }

    /// Element currently highlighted by the magnet gesture.
    pub fn magnet_target(&self) -> Option<ElementId> {
        self.magnet.highlighted()
    }

    // --- Document order ---

    /// Re-insert an element at the end of document order and queue the write.
    pub fn reinsert(&mut self, id: ElementId, now: Instant) -> SlideResult<u32> {
        let document_order = self.slide.reinsert(id)?;
        self.enqueue(
            CoalescingKey::element(OperationKind::Order, id),
            WritePayload::Order { id, document_order },
            now,
        );
        Ok(document_order)
    }

    // --- Selection ---

    /// Finalized selection.
    pub fn selection(&self) -> &[ElementId] {
        self.frame.selection()
    }

    /// Replace the selection. Ineligible and unknown ids are dropped.
    pub fn select(&mut self, ids: &[ElementId]) {
        let selected = self
            .slide
            .elements_ordered()
            .filter(|e| ids.contains(&e.id) && e.is_eligible())
            .map(|e| e.id)
            .collect();
        self.frame.set_selection(selected);
    }

    pub fn clear_selection(&mut self) {
        self.frame.clear();
    }

    /// Visible selection frame, if any.
    pub fn selection_frame(&self) -> Option<Rect> {
        self.frame.frame()
    }

    /// Elements under the selection frame right now.
    pub fn covered(&self) -> &[ElementId] {
        self.frame.covered()
    }

    /// Guides currently shown.
    pub fn guides(&self) -> SnapGuides {
        self.guides
    }

    // --- Events and writes ---

    /// Take pending events (drains the outbox).
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Observe the transport result of every dispatched write of `kind`.
    ///
    /// Only the write that is finally dispatched reports; writes coalesced
    /// away never do. Replaces any hook already set for `kind`.
    pub fn on_commit(&mut self, kind: OperationKind, hook: impl Fn(&CoalescingKey, &TransportResult<()>) + 'static) {
        self.hooks.hooks.insert(kind, Rc::new(hook));
    }

    fn enqueue(&mut self, key: CoalescingKey, payload: WritePayload, now: Instant) {
        match self.hooks.hooks.get(&key.kind).cloned() {
            Some(hook) => {
                let label = key.clone();
                self.queue
                    .enqueue_with_callback(key, payload, now, move |result| hook(&label, &result));
            }
            None => {
                self.queue.enqueue(key, payload, now);
            }
        }
    }

    /// Dispatch writes whose debounce window has elapsed.
    pub fn poll_writes(&mut self, now: Instant, transport: &mut dyn WriteTransport) -> usize {
        self.queue.flush_due(now, transport)
    }

    /// Dispatch every pending write now.
    pub fn flush_writes(&mut self, transport: &mut dyn WriteTransport) -> usize {
        self.queue.flush_all(transport)
    }

    /// When the host should next call [`poll_writes`](Self::poll_writes).
    pub fn next_flush_deadline(&self) -> Option<Instant> {
        self.queue.next_deadline()
    }

    pub fn pending_writes(&self) -> usize {
        self.queue.pending_len()
    }
}
