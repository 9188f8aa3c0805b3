use dnsmux_domain::DomainError;
use std::sync::atomic::{AtomicU8, Ordering};

const CREATED: u8 = 0;
const STARTED: u8 = 1;
const CLOSED: u8 = 2;

/// Created -> Started -> Closed, shared by the concrete transports.
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(CREATED),
        }
    }

    /// Idempotent while started; a closed transport cannot be restarted.
    pub(crate) fn start(&self, name: &str) -> Result<(), DomainError> {
        match self
            .state
            .compare_exchange(CREATED, STARTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(STARTED) => Ok(()),
            Err(_) => Err(DomainError::TransportClosed(name.to_string())),
        }
    }

    /// Returns false when the transport was already closed.
    pub(crate) fn close(&self) -> bool {
        self.state.swap(CLOSED, Ordering::AcqRel) != CLOSED
    }

    pub(crate) fn ensure_active(&self, name: &str) -> Result<(), DomainError> {
        match self.state.load(Ordering::Acquire) {
            STARTED => Ok(()),
            CREATED => Err(DomainError::TransportNotStarted(name.to_string())),
            _ => Err(DomainError::TransportClosed(name.to_string())),
        }
    }
}
