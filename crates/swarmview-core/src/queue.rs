//! Unbounded FIFO buffer of snapshots.
//!
//! The queue decouples the remote producer's irregular snapshot timing from
//! the fixed-rate playback loop: arrivals are appended as they come in, and
//! the pacing tick drains at most one snapshot per frame interval.
//!
//! The queue is deliberately unbounded. If the consumer stalls (the tab is
//! paused, the host is slow), snapshots accumulate in memory instead of
//! being dropped -- the session fence is the only thing that ever discards
//! buffered data. Callers own the trade-off; see the growth test below.

use std::collections::VecDeque;

use swarmview_types::Snapshot;

/// Unbounded FIFO queue of [`Snapshot`]s.
///
/// All operations are O(1) (amortized for enqueue). Dequeueing from an
/// empty queue is a level-triggered signal, not an error: it returns
/// `None` and drives the playback stall transition.
#[derive(Debug, Default)]
pub struct SnapshotQueue {
    inner: VecDeque<Snapshot>,
}

impl SnapshotQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            inner: VecDeque::new(),
        }
    }

    /// Append a snapshot at the tail. Never rejects, never bounds length.
    pub fn enqueue(&mut self, snapshot: Snapshot) {
        self.inner.push_back(snapshot);
    }

    /// Pop the snapshot at the head, or `None` when nothing is buffered.
    pub fn dequeue(&mut self) -> Option<Snapshot> {
        self.inner.pop_front()
    }

    /// Non-destructive read of the head snapshot.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.inner.front()
    }

    /// Number of buffered snapshots.
    ///
    /// Always equals the number of enqueues minus the number of dequeues.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Discard all buffered snapshots.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn snap(time: f64) -> Snapshot {
        Snapshot::new(time, std::collections::BTreeMap::new())
    }

    #[test]
    fn dequeues_in_enqueue_order() {
        let mut queue = SnapshotQueue::new();
        for t in 0..5 {
            queue.enqueue(snap(f64::from(t)));
        }
        for t in 0..5 {
            let got = queue.dequeue().unwrap();
            assert!((got.time - f64::from(t)).abs() < f64::EPSILON);
        }
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn fifo_holds_across_interleavings() {
        let mut queue = SnapshotQueue::new();
        queue.enqueue(snap(0.0));
        queue.enqueue(snap(1.0));
        assert!((queue.dequeue().unwrap().time - 0.0).abs() < f64::EPSILON);
        queue.enqueue(snap(2.0));
        assert!((queue.dequeue().unwrap().time - 1.0).abs() < f64::EPSILON);
        assert!((queue.dequeue().unwrap().time - 2.0).abs() < f64::EPSILON);
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn size_tracks_enqueues_minus_dequeues() {
        let mut queue = SnapshotQueue::new();
        let mut enqueued: usize = 0;
        let mut dequeued: usize = 0;

        for round in 0..4 {
            for t in 0..=round {
                queue.enqueue(snap(f64::from(t)));
                enqueued += 1;
                assert_eq!(queue.len(), enqueued - dequeued);
            }
            if queue.dequeue().is_some() {
                dequeued += 1;
            }
            assert_eq!(queue.len(), enqueued - dequeued);
        }
    }

    #[test]
    fn empty_dequeue_is_not_an_error() {
        let mut queue = SnapshotQueue::new();
        assert!(queue.dequeue().is_none());
        assert!(queue.peek().is_none());
        assert!(queue.is_empty());
        // Still usable afterwards.
        queue.enqueue(snap(0.0));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut queue = SnapshotQueue::new();
        queue.enqueue(snap(7.0));
        assert!((queue.peek().unwrap().time - 7.0).abs() < f64::EPSILON);
        assert_eq!(queue.len(), 1);
        assert!((queue.dequeue().unwrap().time - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stalled_consumer_accumulates_without_dropping() {
        // The absence of a capacity bound is part of the contract: a
        // stalled consumer buffers everything rather than losing frames.
        let mut queue = SnapshotQueue::new();
        for t in 0..10_000 {
            queue.enqueue(snap(f64::from(t)));
        }
        assert_eq!(queue.len(), 10_000);
        assert!((queue.dequeue().unwrap().time - 0.0).abs() < f64::EPSILON);
        assert_eq!(queue.len(), 9_999);
    }

    #[test]
    fn clear_discards_everything() {
        let mut queue = SnapshotQueue::new();
        for t in 0..3 {
            queue.enqueue(snap(f64::from(t)));
        }
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());
    }
}
