/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! A fixed-capacity binary min-heap of decoded frames.
//!
//! Slots are addressed 1-indexed, so the parent of slot `p` is `p / 2` and
//! its children are `2p` and `2p + 1`. The backing `Vec` stores slot `p` at
//! position `p - 1`.

use crate::frame::DecodedFrame;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Upper bound on frames held at once. Chosen well above the deepest
/// reference window any supported format allows.
pub const MAX_REFERENCE_FRAMES: usize = 1000;

/// Which sequence attribute orders the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderingMode {
    /// Bitstream decode order, keyed on `coded_index`.
    Coded,
    /// Presentation order, keyed on `display_index`.
    #[default]
    Display,
}

impl OrderingMode {
    /// The sort key of `frame` under this mode.
    ///
    /// A frame with no display index sorts by its coded index in display
    /// mode. The controller always assigns one before insertion, so this only
    /// matters for heaps used on their own.
    pub fn key(&self, frame: &DecodedFrame) -> u64 {
        match self {
            OrderingMode::Coded => frame.coded_index,
            OrderingMode::Display => frame.display_index.unwrap_or(frame.coded_index),
        }
    }

    pub fn compare(&self, a: &DecodedFrame, b: &DecodedFrame) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
}

fn parent(p: usize) -> Option<usize> {
    if p == 1 {
        None
    } else {
        Some(p / 2)
    }
}

fn left_child(p: usize) -> usize {
    2 * p
}

/// Priority queue over owned frames with a hard capacity of
/// [`MAX_REFERENCE_FRAMES`].
///
/// The heap never fails loudly: a full heap hands the frame back from
/// [`FrameHeap::insert`] and an empty heap yields `None`. Turning those into
/// faults is the caller's job.
#[derive(Debug)]
pub struct FrameHeap {
    slots: Vec<DecodedFrame>,
    mode: OrderingMode,
}

impl Default for FrameHeap {
    fn default() -> Self {
        Self::new(OrderingMode::default())
    }
}

impl FrameHeap {
    /// Creates an empty heap ordered by `mode` for its whole lifetime.
    pub fn new(mode: OrderingMode) -> Self {
        Self {
            slots: Vec::with_capacity(MAX_REFERENCE_FRAMES),
            mode,
        }
    }

    pub fn mode(&self) -> OrderingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        MAX_REFERENCE_FRAMES
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_REFERENCE_FRAMES
    }

    /// Adds a frame, or returns it untouched in `Err` if the heap is full.
    pub fn insert(&mut self, frame: DecodedFrame) -> Result<(), DecodedFrame> {
        if self.is_full() {
            return Err(frame);
        }
        self.slots.push(frame);
        self.bubble_up(self.slots.len());
        Ok(())
    }

    /// The frame with the smallest key, without removing it.
    pub fn peek_min(&self) -> Option<&DecodedFrame> {
        self.slots.first()
    }

    /// Removes and returns the frame with the smallest key.
    pub fn get_min(&mut self) -> Option<DecodedFrame> {
        if self.slots.is_empty() {
            return None;
        }
        // Moves the last slot into the root.
        let min = self.slots.swap_remove(0);
        if !self.slots.is_empty() {
            self.bubble_down(1);
        }
        Some(min)
    }

    /// Sorted keys of every resident frame.
    pub fn keys(&self) -> Vec<u64> {
        let mut keys: Vec<u64> = self.slots.iter().map(|f| self.mode.key(f)).collect();
        keys.sort_unstable();
        keys
    }

    /// Empties the heap, returning its frames in key order.
    pub fn drain_sorted(&mut self) -> Vec<DecodedFrame> {
        let mut out = Vec::with_capacity(self.slots.len());
        while let Some(frame) = self.get_min() {
            out.push(frame);
        }
        out
    }

    fn at(&self, p: usize) -> &DecodedFrame {
        &self.slots[p - 1]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a - 1, b - 1);
    }

    fn greater(&self, a: usize, b: usize) -> bool {
        self.mode.compare(self.at(a), self.at(b)) == Ordering::Greater
    }

    fn bubble_up(&mut self, mut p: usize) {
        while let Some(up) = parent(p) {
            if !self.greater(up, p) {
                break;
            }
            self.swap(up, p);
            p = up;
        }
    }

    fn bubble_down(&mut self, mut p: usize) {
        let n = self.slots.len();
        loop {
            let c = left_child(p);
            if c > n {
                break;
            }
            // Left child wins ties.
            let mut smaller = c;
            if c < n && self.greater(c, c + 1) {
                smaller = c + 1;
            }
            if !self.greater(p, smaller) {
                break;
            }
            self.swap(p, smaller);
            p = smaller;
        }
    }

    #[cfg(test)]
    fn holds_invariant(&self) -> bool {
        (2..=self.slots.len()).all(|p| !self.greater(p / 2, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn coded(idx: u64) -> DecodedFrame {
        DecodedFrame::empty(idx)
    }

    fn popped_keys(heap: &mut FrameHeap) -> Vec<u64> {
        let mode = heap.mode();
        heap.drain_sorted().iter().map(|f| mode.key(f)).collect()
    }

    #[test]
    fn test_empty_heap() {
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        assert!(heap.is_empty());
        assert!(heap.peek_min().is_none());
        assert!(heap.get_min().is_none());
        assert!(heap.get_min().is_none());
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn test_default_mode_is_display() {
        assert_eq!(FrameHeap::default().mode(), OrderingMode::Display);
    }

    #[test]
    fn test_min_order() {
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        for idx in [5, 3, 17, 10, 84, 19, 6, 22, 9, 1, 7, 16] {
            heap.insert(coded(idx)).unwrap();
        }
        assert_eq!(heap.peek_min().map(|f| f.coded_index), Some(1));
        assert_eq!(
            popped_keys(&mut heap),
            vec![1, 3, 5, 6, 7, 9, 10, 16, 17, 19, 22, 84]
        );
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        heap.insert(coded(4)).unwrap();
        heap.insert(coded(2)).unwrap();
        assert_eq!(heap.peek_min().map(|f| f.coded_index), Some(2));
        assert_eq!(heap.peek_min().map(|f| f.coded_index), Some(2));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_shuffled_extraction_is_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut keys: Vec<u64> = (0..500).collect();
        keys.shuffle(&mut rng);

        let mut heap = FrameHeap::new(OrderingMode::Coded);
        for k in &keys {
            heap.insert(coded(*k)).unwrap();
        }
        assert_eq!(popped_keys(&mut heap), (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn test_invariant_holds_under_interleaving() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        for _ in 0..2000 {
            if rng.gen_bool(0.6) {
                let _ = heap.insert(coded(rng.gen_range(0..200)));
            } else {
                heap.get_min();
            }
            assert!(heap.holds_invariant());
        }
    }

    #[test]
    fn test_duplicate_keys_all_come_out() {
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        for idx in [2, 1, 2, 1, 2] {
            heap.insert(coded(idx)).unwrap();
        }
        assert_eq!(popped_keys(&mut heap), vec![1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_modes_read_independent_keys() {
        // Coded and display order run in opposite directions.
        let frames = || (0..5u64).map(|i| coded(i).with_display_index(4 - i));

        let mut by_coded = FrameHeap::new(OrderingMode::Coded);
        let mut by_display = FrameHeap::new(OrderingMode::Display);
        for f in frames() {
            by_coded.insert(f).unwrap();
        }
        for f in frames() {
            by_display.insert(f).unwrap();
        }

        let coded_order: Vec<u64> = by_coded
            .drain_sorted()
            .iter()
            .map(|f| f.coded_index)
            .collect();
        let display_order: Vec<u64> = by_display
            .drain_sorted()
            .iter()
            .map(|f| f.coded_index)
            .collect();
        assert_eq!(coded_order, vec![0, 1, 2, 3, 4]);
        assert_eq!(display_order, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_capacity_boundary_hands_frame_back() {
        let mut heap = FrameHeap::new(OrderingMode::Coded);
        for idx in 0..MAX_REFERENCE_FRAMES as u64 {
            heap.insert(coded(idx)).unwrap();
        }
        assert!(heap.is_full());

        let overflow = MAX_REFERENCE_FRAMES as u64;
        let rejected = heap.insert(coded(overflow)).unwrap_err();
        assert_eq!(rejected.coded_index, overflow);
        assert_eq!(heap.len(), MAX_REFERENCE_FRAMES);

        heap.get_min();
        assert!(heap.insert(coded(overflow)).is_ok());
    }

    #[test]
    fn test_keys_are_sorted() {
        let mut heap = FrameHeap::new(OrderingMode::Display);
        for (c, d) in [(0, 9), (1, 3), (2, 6)] {
            heap.insert(coded(c).with_display_index(d)).unwrap();
        }
        assert_eq!(heap.keys(), vec![3, 6, 9]);
        assert_eq!(heap.len(), 3);
    }
}
