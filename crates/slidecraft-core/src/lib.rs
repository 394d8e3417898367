//! SlideCraft Core Library
//!
//! Spatial editing engine for freely placed slide elements: overlap groups,
//! rubber-band selection, magnet re-elevation, alignment guides and debounced
//! write coalescing. Platform-agnostic; rendering and transport live elsewhere.

pub mod commit;
pub mod config;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod input;
pub mod magnet;
pub mod overlap;
pub mod selection;
pub mod slide;
pub mod snap;

pub use commit::{
    CoalescingKey, CommitQueue, DebounceWindows, DispatchedWrite, EnqueueOutcome, MemoryTransport, OperationKind,
    TransportError, WritePayload, WriteTransport,
};
pub use config::{ConfigError, EngineConfig};
pub use editor::{CommitHook, EditorEvent, SlideEditor};
pub use element::{Element, ElementId, ElementRole, ElevationAssignment};
pub use input::{Modifiers, Platform, PointerEvent};
pub use magnet::{ElevationChange, ElevationStep, MagnetGesture, MagnetHighlight, demote, promote};
pub use overlap::{OverlapGroup, bottom_most_under_cursor, find_overlapping, top_most_under_cursor};
pub use selection::{FramePhase, FrameQuadrant, MoveState, SelectionEvent, SelectionFrame};
pub use slide::{ElementProvider, Slide, SlideError, SlideResult};
pub use snap::{GuideAlignment, GuideAxis, SnapGuide, SnapGuides, SnapSettings, compute_guides};
