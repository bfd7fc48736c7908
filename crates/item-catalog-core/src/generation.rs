//! Latest-query-wins bookkeeping.
//!
//! The reconciler has no cancellation. A caller that fires overlapping
//! queries takes a [`Ticket`] per query and applies a result only while
//! [`QueryGenerations::is_current`] holds for its ticket.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter of issued queries.
#[derive(Debug, Default)]
pub struct QueryGenerations {
    latest: AtomicU64,
}

/// Identifies one issued query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl QueryGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket, superseding every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Pass `value` through only if `ticket` is still the latest.
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_ticket_supersedes() {
        let gens = QueryGenerations::new();
        let first = gens.issue();
        assert!(gens.is_current(first));
        let second = gens.issue();
        assert!(second > first);
        assert!(!gens.is_current(first));
        assert_eq!(gens.accept(first, "stale"), None);
        assert_eq!(gens.accept(second, "fresh"), Some("fresh"));
    }
}
