//! Registry of abortable requests owned by one caller.
//!
//! # Design
//! - Each registry is a scope: cancelling it never touches requests tracked by
//!   another registry.
//! - Settled requests are forgotten so a late cancel cannot abort a reused handle.

use std::cell::{Cell, RefCell};
use std::fmt;

/// Handle that can abort one request.
pub trait AbortHandle {
    /// Abort the associated request.
    fn abort(&self);
}

/// Requests started by one scope and not yet settled.
pub struct InflightRequests<H> {
    pending: RefCell<Vec<(u64, H)>>,
    next_id: Cell<u64>,
}

impl<H> Default for InflightRequests<H> {
    fn default() -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<H> fmt::Debug for InflightRequests<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InflightRequests")
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl<H: AbortHandle> InflightRequests<H> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `handle`; returns the id to settle it with.
    pub fn track(&self, handle: H) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.pending.borrow_mut().push((id, handle));
        id
    }

    /// Forget a request that finished on its own.
    pub fn settle(&self, id: u64) {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
    }

    /// Abort every tracked request and forget them. Returns how many were aborted.
    pub fn cancel_all(&self) -> usize {
        let pending: Vec<(u64, H)> = self.pending.borrow_mut().drain(..).collect();
        for (_, handle) in &pending {
            handle.abort();
        }
        pending.len()
    }

    /// Number of requests still in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}
