use std::time::{Duration, Instant};

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TimerHandle,
    deadline: Instant,
    target: T,
}

/// One-shot timers for a cooperative event loop.
///
/// Nothing fires by itself: the loop asks for [`TimerQueue::next_deadline`],
/// waits, then collects expired timers with [`TimerQueue::pop_expired`].
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, target: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            deadline: now + delay,
            target,
        });
        handle
    }

    /// Returns true if the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Removes and returns the earliest timer whose deadline is at or before `now`.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= now)
            .min_by_key(|(_, p)| (p.deadline, p.handle.0))?;
        let expired = self.pending.remove(idx);
        Some((expired.handle, expired.target))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_in_deadline_order() {
        let t0 = Instant::now();
        let mut timers = TimerQueue::new();
        let late = timers.schedule(t0, Duration::from_millis(300), "late");
        let early = timers.schedule(t0, Duration::from_millis(100), "early");

        assert_eq!(timers.next_deadline(), Some(t0 + Duration::from_millis(100)));
        assert_eq!(timers.pop_expired(t0 + Duration::from_millis(50)), None);

        let now = t0 + Duration::from_millis(400);
        assert_eq!(timers.pop_expired(now), Some((early, "early")));
        assert_eq!(timers.pop_expired(now), Some((late, "late")));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(t0, Duration::from_millis(250), ());
        assert!(timers.is_pending(handle));
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(!timers.is_pending(handle));
        assert_eq!(timers.pop_expired(t0 + Duration::from_secs(1)), None);
        assert_eq!(timers.next_deadline(), None);
    }
}
