// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw requests.
//!
//! Mutations anywhere in the tree raise a redraw request on the scene's
//! [`RedrawQueue`]. The queue is `Send + Sync`: a background thread may raise
//! requests while the UI thread drains them with [`RedrawQueue::take`] and
//! paints.

use core::sync::atomic::{AtomicBool, Ordering};

use kurbo::Rect;
use parking_lot::Mutex;

/// Accumulated surface-space regions that need repainting.
///
/// Rectangles covered by one already recorded are dropped, so repeated
/// full-surface requests collapse into a single entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Surface-space rectangles that should be repainted. No entry covers
    /// another.
    pub dirty_rects: Vec<Rect>,
}

fn covers(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

impl Damage {
    /// Record `rect`, skipping it if already covered and dropping the
    /// entries it covers.
    pub fn add(&mut self, rect: Rect) {
        if self.dirty_rects.iter().any(|&r| covers(r, rect)) {
            return;
        }
        self.dirty_rects.retain(|&r| !covers(rect, r));
        self.dirty_rects.push(rect);
    }

    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// Whether nothing has been requested.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }
}

/// Thread-safe queue of redraw requests for one surface.
///
/// Raising a request never blocks on the scene lock and never paints inline;
/// the host picks requests up on its own thread.
#[derive(Debug, Default)]
pub struct RedrawQueue {
    pending: AtomicBool,
    damage: Mutex<Damage>,
}

impl RedrawQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `region` as needing a redraw.
    pub fn request_redraw(&self, region: Rect) {
        self.damage.lock().add(region);
        self.pending.store(true, Ordering::Release);
    }

    /// Whether a redraw has been requested since the last [`take`](Self::take).
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Drain pending requests. Returns `None` when nothing is pending.
    pub fn take(&self) -> Option<Damage> {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return None;
        }
        let damage = core::mem::take(&mut *self.damage.lock());
        (!damage.is_empty()).then_some(damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn union_of_requests() {
        let q = RedrawQueue::new();
        assert!(q.take().is_none());
        q.request_redraw(Rect::new(0.0, 0.0, 10.0, 10.0));
        q.request_redraw(Rect::new(20.0, 5.0, 30.0, 15.0));
        assert!(q.is_pending());
        let damage = q.take().expect("pending damage");
        assert_eq!(damage.dirty_rects.len(), 2);
        assert_eq!(damage.union_rect(), Some(Rect::new(0.0, 0.0, 30.0, 15.0)));
        assert!(!q.is_pending());
        assert!(q.take().is_none());
    }

    #[test]
    fn requests_from_other_threads() {
        let q = Arc::new(RedrawQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let q = Arc::clone(&q);
                std::thread::spawn(move || {
                    q.request_redraw(Rect::new(f64::from(i), 0.0, f64::from(i) + 1.0, 1.0));
                })
            })
            .collect();
        for h in handles {
            h.join().expect("worker panicked");
        }
        assert_eq!(q.take().map(|d| d.dirty_rects.len()), Some(4));
    }

    #[test]
    fn covered_requests_collapse() {
        let q = RedrawQueue::new();
        let whole = Rect::new(0.0, 0.0, 100.0, 50.0);
        for _ in 0..1000 {
            q.request_redraw(whole);
        }
        q.request_redraw(Rect::new(10.0, 10.0, 20.0, 20.0));
        let damage = q.take().expect("pending damage");
        assert_eq!(damage.dirty_rects, vec![whole]);
    }

    #[test]
    fn larger_request_replaces_covered_ones() {
        let mut damage = Damage::default();
        damage.add(Rect::new(0.0, 0.0, 10.0, 10.0));
        damage.add(Rect::new(40.0, 0.0, 50.0, 10.0));
        damage.add(Rect::new(60.0, 0.0, 70.0, 10.0));
        damage.add(Rect::new(0.0, 0.0, 55.0, 20.0));
        assert_eq!(
            damage.dirty_rects,
            vec![Rect::new(60.0, 0.0, 70.0, 10.0), Rect::new(0.0, 0.0, 55.0, 20.0)]
        );
    }
}
