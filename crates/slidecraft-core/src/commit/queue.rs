//! Debounced, coalescing write queue.

use super::{
    Completion, CoalescingKey, DispatchedWrite, OperationKind, TransportResult, WritePayload,
    WriteTransport,
};
use crate::config::EngineConfig;
use std::collections::HashMap;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Debounce window per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceWindows {
    pub position: Duration,
    pub elevation: Duration,
    pub order: Duration,
}

impl Default for DebounceWindows {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for DebounceWindows {
    fn from(config: &EngineConfig) -> Self {
        Self {
            position: config.position_debounce(),
            elevation: config.elevation_debounce(),
            order: config.order_debounce(),
        }
    }
}

impl DebounceWindows {
    pub fn window_for(&self, kind: OperationKind) -> Duration {
        match kind {
            OperationKind::Position => self.position,
            OperationKind::Elevation => self.elevation,
            OperationKind::Order => self.order,
        }
    }
}

/// What `enqueue` did with the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A new window was opened for the key.
    Queued,
    /// An undispatched write for the key was superseded.
    Replaced,
}

struct PendingWrite {
    payload: WritePayload,
    /// Fixed when the window opens; replacements never push it back.
    deadline: Instant,
    /// First-enqueue order, for a stable dispatch order.
    sequence: u64,
    on_complete: Option<Completion>,
}

/// Coalesces writes by key and dispatches them once per debounce window.
pub struct CommitQueue {
    pending: HashMap<CoalescingKey, PendingWrite>,
    windows: DebounceWindows,
    next_sequence: u64,
}

impl Default for CommitQueue {
    fn default() -> Self {
        Self::new(DebounceWindows::default())
    }
}

impl CommitQueue {
    /// Create a queue with the given debounce windows.
    pub fn new(windows: DebounceWindows) -> Self {
        Self {
            pending: HashMap::new(),
            windows,
            next_sequence: 0,
        }
    }

    /// Create a queue using the windows from an engine config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(DebounceWindows::from(config))
    }

    pub fn windows(&self) -> DebounceWindows {
        self.windows
    }

    /// Queue a write. Last write wins within the key's current window.
    pub fn enqueue(&mut self, key: CoalescingKey, payload: WritePayload, now: Instant) -> EnqueueOutcome {
        self.insert(key, payload, now, None)
    }

    /// Queue a write with a completion callback.
    ///
    /// A later write with the same key replaces this callback along with the
    /// payload; only the write that is actually dispatched reports back.
    pub fn enqueue_with_callback(
        &mut self,
        key: CoalescingKey,
        payload: WritePayload,
        now: Instant,
        on_complete: impl FnOnce(TransportResult<()>) + 'static,
    ) -> EnqueueOutcome {
        self.insert(key, payload, now, Some(Box::new(on_complete)))
    }

    fn insert(
        &mut self,
        key: CoalescingKey,
        payload: WritePayload,
        now: Instant,
        on_complete: Option<Completion>,
    ) -> EnqueueOutcome {
        if let Some(pending) = self.pending.get_mut(&key) {
            log::debug!("Coalescing write {}", key);
            pending.payload = payload;
            pending.on_complete = on_complete;
            return EnqueueOutcome::Replaced;
        }

        let deadline = now + self.windows.window_for(key.kind);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.insert(
            key,
            PendingWrite {
                payload,
                deadline,
                sequence,
                on_complete,
            },
        );
        EnqueueOutcome::Queued
    }

    /// Dispatch every write whose window has elapsed. Returns the number sent.
    pub fn flush_due(&mut self, now: Instant, transport: &mut dyn WriteTransport) -> usize {
        let due: Vec<CoalescingKey> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        self.dispatch(due, transport)
    }

    /// Dispatch everything immediately, regardless of deadlines.
    pub fn flush_all(&mut self, transport: &mut dyn WriteTransport) -> usize {
        let all: Vec<CoalescingKey> = self.pending.keys().cloned().collect();
        self.dispatch(all, transport)
    }

    fn dispatch(&mut self, keys: Vec<CoalescingKey>, transport: &mut dyn WriteTransport) -> usize {
        let mut writes: Vec<(CoalescingKey, PendingWrite)> = keys
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|pending| (key, pending)))
            .collect();
        writes.sort_by_key(|(_, pending)| (pending.deadline, pending.sequence));

        let count = writes.len();
        for (key, pending) in writes {
            log::info!("Dispatching write {}", key);
            let label = key.to_string();
            let on_complete = pending.on_complete;
            let done: Completion = Box::new(move |result: TransportResult<()>| {
                if let Err(e) = &result {
                    log::warn!("Write {} failed: {}", label, e);
                }
                if let Some(callback) = on_complete {
                    callback(result);
                }
            });
            transport.send(
                DispatchedWrite {
                    key,
                    payload: pending.payload,
                },
                done,
            );
        }
        count
    }

    /// Earliest pending deadline, for arming the host's timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.deadline).min()
    }

    /// Payload currently waiting under `key`.
    pub fn pending_payload(&self, key: &CoalescingKey) -> Option<&WritePayload> {
        self.pending.get(key).map(|pending| &pending.payload)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl std::fmt::Debug for CommitQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitQueue")
            .field("pending", &self.pending.len())
            .field("windows", &self.windows)
            .finish()
    }
}
