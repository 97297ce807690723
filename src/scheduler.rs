//! Single-clock deadline scheduler.
//!
//! Replaces coroutine waits: callers queue a payload with a delay and the
//! per-tick driver pops whatever has come due. Entries with equal deadlines
//! come out in insertion order.

use std::cmp::Ordering;

#[derive(Debug, Clone)]
struct Entry<T> {
    deadline: f64,
    seq: u64,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_seq: u64,
    pending: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue `payload` to come due `delay` seconds from now. Negative delays
    /// are treated as zero.
    pub fn schedule_in(&mut self, delay: f32, payload: T) {
        let deadline = self.now + f64::from(delay.max(0.0));
        self.schedule_at(deadline, payload);
    }

    pub fn schedule_at(&mut self, deadline: f64, payload: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Entry {
            deadline,
            seq,
            payload,
        });
    }

    pub fn advance(&mut self, dt: f64) {
        self.now += dt.max(0.0);
    }

    /// Remove and return every entry whose deadline has passed, earliest first
    pub fn pop_due(&mut self) -> Vec<T> {
        let now = self.now;
        let (mut due, rest): (Vec<Entry<T>>, Vec<Entry<T>>) = self
            .pending
            .drain(..)
            .partition(|e| e.deadline <= now + 1e-9);
        self.pending = rest;
        due.sort_by(|a, b| {
            a.deadline
                .partial_cmp(&b.deadline)
                .unwrap_or(Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|e| e.payload).collect()
    }

    /// Time until the earliest pending deadline
    pub fn next_deadline_in(&self) -> Option<f64> {
        self.pending
            .iter()
            .map(|e| e.deadline)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .map(|d| (d - self.now).max(0.0))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due_before_deadline() {
        let mut s = Scheduler::new();
        s.schedule_in(1.0, "a");
        s.advance(0.5);
        assert!(s.pop_due().is_empty());
        s.advance(0.5);
        assert_eq!(s.pop_due(), vec!["a"]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_deadline_then_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule_in(2.0, 3);
        s.schedule_in(1.0, 1);
        s.schedule_in(1.0, 2);
        s.advance(5.0);
        assert_eq!(s.pop_due(), vec![1, 2, 3]);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut s = Scheduler::new();
        s.schedule_in(0.1, ());
        s.schedule_in(0.2, ());
        s.clear();
        s.advance(1.0);
        assert!(s.pop_due().is_empty());
    }

    #[test]
    fn test_schedule_relative_to_current_clock() {
        let mut s = Scheduler::new();
        s.advance(10.0);
        s.schedule_in(0.5, 'x');
        assert_eq!(s.next_deadline_in(), Some(0.5));
        s.advance(0.25);
        assert!(s.pop_due().is_empty());
        s.advance(0.25);
        assert_eq!(s.pop_due(), vec!['x']);
    }

    #[test]
    fn test_zero_delay_due_immediately() {
        let mut s = Scheduler::new();
        s.schedule_in(0.0, 7);
        s.schedule_in(-1.0, 8);
        assert_eq!(s.pop_due(), vec![7, 8]);
    }
}
