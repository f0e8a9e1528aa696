//! Request guard - discards results of superseded async validations.
//!
//! Each [`RequestGuard::begin`] hands out a ticket. When the result comes back the caller
//! checks [`RequestGuard::is_current`]; a newer `begin` or an [`RequestGuard::invalidate`]
//! makes every older ticket stale.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tracing::trace;

/// Ticket for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

/// Shared "latest request wins" counter.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    latest: Arc<AtomicU64>,
}

impl RequestGuard {
    /// Creates a guard with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request, superseding every earlier one.
    #[must_use]
    pub fn begin(&self) -> RequestTicket {
        let ticket = RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        trace!("Started request {:?}", ticket);
        ticket
    }

    /// Whether `ticket` belongs to the most recent request.
    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks every request in flight as stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Runs `request` and returns its output only if no newer request started meanwhile.
    pub async fn run<F, T>(&self, request: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        let output = request.await;
        if self.is_current(ticket) {
            Some(output)
        } else {
            trace!("Dropping stale result of request {:?}", ticket);
            None
        }
    }
}
