use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Monotonic request counter for one loader.
///
/// Only the response holding the latest ticket may be applied; older
/// responses are stale even when they arrive last.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    /// Creates a counter with no issued request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next ticket, superseding every earlier one.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Returns whether the ticket is still the latest issued.
    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}
