use std::time::{Duration, Instant};

use crate::Pixel;

/// Interval between flushes of accumulated pixel writes during a drag.
pub const FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Client-side accumulator coalescing high-frequency single-cell writes
/// into periodic `draw-pixels` batches.
///
/// The flush deadline is fixed when the first pixel of a batch arrives
/// and later pixels do not push it back, so a continuous drag still
/// flushes every `FLUSH_INTERVAL` and no remote peer waits longer than
/// that to see a write. Single clicks bypass the batcher entirely and go
/// out as `draw-pixel`.
///
/// The caller supplies the clock, which keeps the timing contract
/// testable without sleeping.
#[derive(Debug, Default)]
pub struct WriteBatcher {
    pending: Vec<Pixel>,
    deadline: Option<Instant>,
}

impl WriteBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pixel: Pixel, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + FLUSH_INTERVAL);
        }
        self.pending.push(pixel);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// When the next `poll` will flush, if anything is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Flushes the accumulated batch once the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Vec<Pixel>> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.drain(),
            _ => None,
        }
    }

    /// Unconditional flush, for the end of a drag gesture.
    pub fn drain(&mut self) -> Option<Vec<Pixel>> {
        self.deadline = None;
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::replace(&mut self.pending, Vec::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(x: u16, y: u16) -> Pixel {
        Pixel {
            x,
            y,
            color: "#000000".into(),
        }
    }

    #[test]
    fn it_holds_pixels_until_the_deadline() {
        let t0 = Instant::now();
        let mut batcher = WriteBatcher::new();
        batcher.push(pixel(0, 0), t0);
        batcher.push(pixel(1, 0), t0 + Duration::from_millis(10));

        assert!(batcher.poll(t0 + Duration::from_millis(49)).is_none());
        let flushed = batcher
            .poll(t0 + FLUSH_INTERVAL)
            .expect("must flush at the deadline");
        assert_eq!(flushed.len(), 2);
        assert!(batcher.is_empty());
    }

    #[test]
    fn later_pixels_do_not_push_the_deadline_back() {
        let t0 = Instant::now();
        let mut batcher = WriteBatcher::new();
        batcher.push(pixel(0, 0), t0);
        batcher.push(pixel(1, 0), t0 + Duration::from_millis(45));

        assert_eq!(batcher.next_deadline(), Some(t0 + FLUSH_INTERVAL));
        assert!(batcher.poll(t0 + FLUSH_INTERVAL).is_some());
    }

    #[test]
    fn the_deadline_restarts_with_the_next_batch() {
        let t0 = Instant::now();
        let mut batcher = WriteBatcher::new();
        batcher.push(pixel(0, 0), t0);
        batcher.poll(t0 + FLUSH_INTERVAL).expect("must flush");

        let t1 = t0 + Duration::from_millis(200);
        batcher.push(pixel(1, 0), t1);
        assert_eq!(batcher.next_deadline(), Some(t1 + FLUSH_INTERVAL));
        assert!(batcher.poll(t1 + Duration::from_millis(49)).is_none());
    }

    #[test]
    fn drain_flushes_immediately_at_gesture_end() {
        let t0 = Instant::now();
        let mut batcher = WriteBatcher::new();
        assert!(batcher.drain().is_none());

        batcher.push(pixel(0, 0), t0);
        let flushed = batcher.drain().expect("must flush");
        assert_eq!(flushed, vec![pixel(0, 0)]);
        assert!(batcher.next_deadline().is_none());
    }
}
