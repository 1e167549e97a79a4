//! Coordination between live editing and solver round trips.
//!
//! Both types take the current time or a ticket from the caller and own no threads or timers.
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Trailing-edge debounce. Each `push` replaces the pending value and moves the deadline to
/// `now + quiet`; `poll` hands out the pending value once the deadline has passed.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>
}

impl<T> Default for Debouncer<T> {
    fn default() -> Debouncer<T> {
        Debouncer::new(DEFAULT_QUIET_PERIOD)
    }
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Debouncer<T> {
        Debouncer { quiet, pending: None }
    }

    pub fn push(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.quiet, value));
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((deadline, value)) if now >= deadline => Some(value),
            other => {
                self.pending = other;
                None
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(d, _)| *d)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Last-request-wins slot for overlapping solver calls. Tickets are issued in increasing order
/// and only a response carrying the newest ticket is kept; older responses are dropped even if
/// they arrive later.
#[derive(Debug, Clone)]
pub struct LatestResponse<T> {
    issued: u64,
    applied: Option<u64>,
    current: Option<T>
}

impl<T> Default for LatestResponse<T> {
    fn default() -> LatestResponse<T> {
        LatestResponse { issued: 0, applied: None, current: None }
    }
}

impl<T> LatestResponse<T> {
    pub fn new() -> LatestResponse<T> {
        LatestResponse::default()
    }

    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        debug!(sequence = self.issued, "issued request ticket");
        RequestTicket(self.issued)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Returns whether `value` was applied.
    pub fn complete(&mut self, ticket: RequestTicket, value: T) -> bool {
        if !self.is_current(ticket) || self.applied == Some(ticket.0) {
            warn!(sequence = ticket.0, newest = self.issued, "dropping stale response");
            return false;
        }
        self.applied = Some(ticket.0);
        self.current = Some(value);
        true
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn in_flight(&self) -> bool {
        self.issued > 0 && self.applied != Some(self.issued)
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_waits_for_quiet_period() {
        let start = Instant::now();
        let mut d: Debouncer<&str> = Debouncer::default();
        d.push(start, "A");
        assert_eq!(d.poll(start + Duration::from_millis(499)), None);
        assert_eq!(d.poll(start + Duration::from_millis(500)), Some("A"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn debounce_coalesces_rapid_edits() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(500));
        d.push(start, "A");
        d.push(start + Duration::from_millis(300), "A =");
        d.push(start + Duration::from_millis(600), "A = 5");
        assert_eq!(d.poll(start + Duration::from_millis(900)), None);
        assert_eq!(d.deadline(), Some(start + Duration::from_millis(1100)));
        assert_eq!(d.poll(start + Duration::from_millis(1100)), Some("A = 5"));
    }

    #[test]
    fn debounce_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.push(start, 1);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn newest_request_wins() {
        let mut slot: LatestResponse<&str> = LatestResponse::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(slot.in_flight());
        assert!(slot.complete(second, "second"));
        assert!(!slot.complete(first, "first"));
        assert_eq!(slot.current(), Some(&"second"));
        assert!(!slot.in_flight());
        slot.clear();
        assert_eq!(slot.current(), None);
        let third = slot.begin();
        assert!(slot.complete(third, "third"));
        assert_eq!(slot.current(), Some(&"third"));
    }

    #[test]
    fn stale_response_arriving_first_is_dropped() {
        let mut slot = LatestResponse::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(!slot.complete(first, 1));
        assert_eq!(slot.current(), None);
        assert!(slot.complete(second, 2));
        assert!(!slot.complete(second, 3));
        assert_eq!(slot.current(), Some(&2));
        assert!(second > first);
        assert_eq!(second.sequence(), 2);
    }
}
