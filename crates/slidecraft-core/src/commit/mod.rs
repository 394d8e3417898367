//! Outbound write boundary and the coalescing commit queue.
//!
//! Gestures never talk to the network. They hand writes to the
//! [`CommitQueue`], which merges writes sharing a [`CoalescingKey`] and
//! dispatches one write per key per debounce window through a
//! [`WriteTransport`].

mod memory;
mod queue;

pub use memory::MemoryTransport;
pub use queue::{CommitQueue, DebounceWindows, EnqueueOutcome};

use crate::element::{ElementId, ElevationAssignment};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("Write rejected: {0}")]
    Rejected(String),
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Called once with the outcome of a dispatched write.
pub type Completion = Box<dyn FnOnce(TransportResult<()>)>;

/// Kind of mutation being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Element top-left position.
    Position,
    /// Elevations of a whole overlap group.
    Elevation,
    /// Document order of an element.
    Order,
}

impl OperationKind {
    fn as_str(self) -> &'static str {
        match self {
            OperationKind::Position => "position",
            OperationKind::Elevation => "elevation",
            OperationKind::Order => "order",
        }
    }
}

/// Identity under which pending writes are merged.
///
/// Single-element writes carry one id; group writes carry every member id,
/// sorted, so the same group always yields the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoalescingKey {
    pub kind: OperationKind,
    ids: Vec<ElementId>,
}

impl CoalescingKey {
    /// Key for a write to one element.
    pub fn element(kind: OperationKind, id: ElementId) -> Self {
        Self { kind, ids: vec![id] }
    }

    /// Key for a write covering a set of elements.
    pub fn group(kind: OperationKind, ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut ids: Vec<ElementId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { kind, ids }
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }
}

impl fmt::Display for CoalescingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/", self.kind.as_str())?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// Body of an outbound write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WritePayload {
    Position {
        id: ElementId,
        left: f64,
        top: f64,
    },
    Elevation {
        assignments: Vec<ElevationAssignment>,
    },
    Order {
        id: ElementId,
        document_order: u32,
    },
}

impl WritePayload {
    pub fn kind(&self) -> OperationKind {
        match self {
            WritePayload::Position { .. } => OperationKind::Position,
            WritePayload::Elevation { .. } => OperationKind::Elevation,
            WritePayload::Order { .. } => OperationKind::Order,
        }
    }
}

/// A write leaving the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchedWrite {
    pub key: CoalescingKey,
    pub payload: WritePayload,
}

impl DispatchedWrite {
    /// Serialize as a single JSON line for wire transports.
    pub fn to_json(&self) -> TransportResult<String> {
        serde_json::to_string(self).map_err(|e| TransportError::Serialization(e.to_string()))
    }
}

/// Performs the actual network mutation.
///
/// `send` must not block the gesture thread: asynchronous transports start
/// the request and invoke `done` when it settles. The queue never retries.
pub trait WriteTransport {
    fn send(&mut self, write: DispatchedWrite, done: Completion);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key_sorted_and_deduped() {
        let a = CoalescingKey::group(OperationKind::Elevation, [3, 1, 2, 1]);
        let b = CoalescingKey::group(OperationKind::Elevation, [2, 3, 1]);
        assert_eq!(a, b);
        assert_eq!(a.ids(), &[1, 2, 3]);
    }

    #[test]
    fn test_key_kind_distinguishes() {
        let position = CoalescingKey::element(OperationKind::Position, 4);
        let order = CoalescingKey::element(OperationKind::Order, 4);
        assert_ne!(position, order);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(CoalescingKey::element(OperationKind::Position, 12).to_string(), "position/12");
        assert_eq!(
            CoalescingKey::group(OperationKind::Elevation, [9, 2]).to_string(),
            "elevation/2,9"
        );
    }

    #[test]
    fn test_payload_json_is_tagged() {
        let write = DispatchedWrite {
            key: CoalescingKey::element(OperationKind::Position, 1),
            payload: WritePayload::Position { id: 1, left: 10.0, top: 20.0 },
        };
        let json = write.to_json().unwrap();
        assert!(json.contains("\"type\":\"position\""));
        assert_eq!(write.payload.kind(), OperationKind::Position);
    }
}
