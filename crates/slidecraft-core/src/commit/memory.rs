//! In-memory transport.

use super::{Completion, DispatchedWrite, TransportError, WriteTransport};

/// Records every write and completes it immediately.
///
/// Useful for tests and offline sessions. A failing transport still records
/// the write before reporting the configured error.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    writes: Vec<DispatchedWrite>,
    failure: Option<TransportError>,
}

impl MemoryTransport {
    /// Create a transport that accepts every write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that fails every write with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self {
            writes: Vec::new(),
            failure: Some(error),
        }
    }

    /// Writes received so far, in dispatch order.
    pub fn writes(&self) -> &[DispatchedWrite] {
        &self.writes
    }

    /// Take recorded writes (drains the log).
    pub fn take_writes(&mut self) -> Vec<DispatchedWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl WriteTransport for MemoryTransport {
    fn send(&mut self, write: DispatchedWrite, done: Completion) {
        self.writes.push(write);
        match &self.failure {
            Some(error) => done(Err(error.clone())),
            None => done(Ok(())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{CoalescingKey, OperationKind, WritePayload};
    use std::cell::Cell;
    use std::rc::Rc;

    fn write() -> DispatchedWrite {
        DispatchedWrite {
            key: CoalescingKey::element(OperationKind::Order, 1),
            payload: WritePayload::Order { id: 1, document_order: 4 },
        }
    }

    #[test]
    fn test_records_and_completes() {
        let mut transport = MemoryTransport::new();
        let ok = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ok);
        transport.send(write(), Box::new(move |result| flag.set(result.is_ok())));

        assert!(ok.get());
        assert_eq!(transport.writes().len(), 1);
        assert_eq!(transport.take_writes().len(), 1);
        assert!(transport.writes().is_empty());
    }

    #[test]
    fn test_failing_transport() {
        let mut transport = MemoryTransport::failing(TransportError::Rejected("409".to_string()));
        let failed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&failed);
        transport.send(write(), Box::new(move |result| flag.set(result.is_err())));

        assert!(failed.get());
        assert_eq!(transport.writes().len(), 1);
    }
}
