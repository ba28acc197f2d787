//! Timer queue
//!
//! A cooperative stand-in for `setTimeout`: payloads are scheduled with a
//! delay and handed back by [`TimerQueue::advance`] once the queue's clock
//! passes their due time. Timers due at the same instant fire in the order
//! they were scheduled.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct Timer<T> {
    due_ms: f64,
    seq: u64,
    payload: T,
}

/// Delayed payload delivery driven by frame deltas
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, Timer<T>>,
    now_ms: f64,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            now_ms: 0.0,
            next_seq: 0,
        }
    }

    /// Schedule `payload` to fire `delay_ms` from the current clock
    pub fn schedule(&mut self, delay_ms: f32, payload: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Timer {
            due_ms: self.now_ms + f64::from(delay_ms.max(0.0)),
            seq,
            payload,
        })
    }

    /// Advance the clock and return every payload that came due, in firing order
    pub fn advance(&mut self, dt_ms: f32) -> Vec<T> {
        self.now_ms += f64::from(dt_ms.max(0.0));
        let now = self.now_ms;

        let mut due: Vec<(TimerId, f64, u64)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= now)
            .map(|(id, t)| (id, t.due_ms, t.seq))
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));

        due.into_iter()
            .filter_map(|(id, _, _)| self.timers.remove(id).map(|t| t.payload))
            .collect()
    }

    /// Number of timers still pending
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(30.0, "c");
        timers.schedule(10.0, "a");
        timers.schedule(20.0, "b");

        assert!(timers.advance(5.0).is_empty());
        assert_eq!(timers.advance(25.0), vec!["a", "b", "c"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_same_due_time_keeps_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(0.0, 1);
        timers.schedule(0.0, 2);
        timers.schedule(0.0, 3);
        assert_eq!(timers.advance(0.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_is_relative_to_clock() {
        let mut timers = TimerQueue::new();
        timers.advance(100.0);
        timers.schedule(10.0, ());
        assert!(timers.advance(5.0).is_empty());
        assert_eq!(timers.advance(5.0).len(), 1);
    }
}
