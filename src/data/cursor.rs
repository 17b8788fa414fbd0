use std::num::NonZeroUsize;

use crate::{IMAGE_ELEMS, NUM_CLASSES};

/// Number of full batches in one epoch. Trailing records that do not fill a
/// batch are dropped.
#[inline]
pub fn steps_per_epoch(record_count: usize, batch_size: NonZeroUsize) -> usize {
    record_count / batch_size.get()
}

/// Element offsets of a batch inside the prepared tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOffsets {
    /// First record (row) of the batch.
    pub record: usize,
    /// First `f32` of the batch in the image tensor.
    pub image: usize,
    /// First `f32` of the batch in the label tensor.
    pub label: usize,
}

/// Computes where batch `batch_index` starts in the prepared tensors.
#[inline]
pub fn slice_for(batch_index: usize, batch_size: NonZeroUsize) -> BatchOffsets {
    let record = batch_index * batch_size.get();
    BatchOffsets {
        record,
        image: record * IMAGE_ELEMS,
        label: record * NUM_CLASSES,
    }
}

/// Epoch-relative step counter.
///
/// `current` stays in `0..steps_per_epoch` and wraps to 0 when an epoch ends.
/// With `steps_per_epoch == 0` the cursor is degenerate: it never moves and
/// there is nothing to train on.
#[derive(Debug, Clone)]
pub struct BatchCursor {
    current: usize,
    steps_per_epoch: usize,
    batch_size: NonZeroUsize,
    epochs: u64,
}

impl BatchCursor {
    /// Creates a cursor at batch 0 over `record_count` records.
    pub fn new(record_count: usize, batch_size: NonZeroUsize) -> Self {
        Self {
            current: 0,
            steps_per_epoch: steps_per_epoch(record_count, batch_size),
            batch_size,
            epochs: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn steps_per_epoch(&self) -> usize {
        self.steps_per_epoch
    }

    #[inline]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    /// Completed epochs, i.e. how many times the cursor wrapped.
    #[inline]
    pub fn epochs(&self) -> u64 {
        self.epochs
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.steps_per_epoch == 0
    }

    /// Offsets of the current batch.
    #[inline]
    pub fn offsets(&self) -> BatchOffsets {
        slice_for(self.current, self.batch_size)
    }

    /// Moves to the next batch.
    ///
    /// # Returns
    /// `true` if this completed an epoch and the cursor wrapped to 0.
    pub fn advance(&mut self) -> bool {
        if self.is_degenerate() {
            return false;
        }

        self.current += 1;
        if self.current >= self.steps_per_epoch {
            self.current = 0;
            self.epochs += 1;
            return true;
        }

        false
    }

    #[inline]
    pub fn reset(&mut self) {
        self.current = 0;
        self.epochs = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn steps_per_epoch_floors() {
        assert_eq!(steps_per_epoch(320, nz(64)), 5);
        assert_eq!(steps_per_epoch(330, nz(64)), 5);
        assert_eq!(steps_per_epoch(10, nz(64)), 0);
        assert_eq!(steps_per_epoch(50_000, nz(64)), 781);
    }

    #[test]
    fn slice_for_scales_by_record_layout() {
        let off = slice_for(3, nz(64));
        assert_eq!(off.record, 192);
        assert_eq!(off.image, 192 * 3072);
        assert_eq!(off.label, 192 * 10);
        assert_eq!(slice_for(0, nz(64)).image, 0);
    }

    #[test]
    fn advance_wraps_after_an_epoch() {
        let mut cursor = BatchCursor::new(320, nz(64));
        assert_eq!(cursor.steps_per_epoch(), 5);

        let mut visited = Vec::new();
        for _ in 0..5 {
            cursor.advance();
            visited.push(cursor.current());
        }

        assert_eq!(visited, [1, 2, 3, 4, 0]);
        assert_eq!(cursor.epochs(), 1);
    }

    #[test]
    fn advance_reports_the_wrap() {
        let mut cursor = BatchCursor::new(128, nz(64));
        assert!(!cursor.advance());
        assert!(cursor.advance());
        assert_eq!(cursor.current(), 0);
    }

    #[test]
    fn degenerate_cursor_never_moves() {
        let mut cursor = BatchCursor::new(10, nz(64));
        assert!(cursor.is_degenerate());
        assert!(!cursor.advance());
        assert_eq!(cursor.current(), 0);
        assert_eq!(cursor.epochs(), 0);
    }

    #[test]
    fn reset_rewinds() {
        let mut cursor = BatchCursor::new(320, nz(64));
        cursor.advance();
        cursor.advance();
        cursor.reset();
        assert_eq!(cursor.current(), 0);
        assert_eq!(cursor.offsets(), slice_for(0, nz(64)));
    }
}
