use std::num::NonZeroUsize;

use ndarray::{ArrayView2, ArrayView3, ArrayView4, Axis};

use super::{
    cursor::{slice_for, steps_per_epoch},
    prepare::PreparedDataset,
};
use crate::{
    CHANNELS, IMAGE_ELEMS, IMAGE_SIDE, NUM_CLASSES,
    error::{PipelineErr, Result},
};

/// Borrowed view of one full batch (zero-copy).
///
/// * `images` has shape `[batch, 32, 32, 3]`.
/// * `labels` has shape `[batch, 10]`.
#[derive(Debug, Clone)]
pub struct BatchView<'a> {
    pub index: usize,
    pub images: ArrayView4<'a, f32>,
    pub labels: ArrayView2<'a, f32>,
}

impl<'a> BatchView<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `[32, 32, 3]` image at `idx` (panics if out of bounds).
    #[inline]
    pub fn image(&self, idx: usize) -> ArrayView3<'_, f32> {
        self.images.index_axis(Axis(0), idx)
    }

    /// The class index of the one-hot row at `idx` (panics if out of bounds).
    pub fn class_of(&self, idx: usize) -> usize {
        self.labels
            .row(idx)
            .iter()
            .position(|&v| v == 1.0)
            .unwrap_or_default()
    }
}

impl PreparedDataset {
    /// Returns a view of batch `index`.
    ///
    /// # Errors
    /// `PipelineErr::BatchOutOfRange` if `index` does not address a full batch.
    pub fn batch(&self, index: usize, batch_size: NonZeroUsize) -> Result<BatchView<'_>> {
        let steps = steps_per_epoch(self.len(), batch_size);
        if index >= steps {
            return Err(PipelineErr::BatchOutOfRange {
                batch: index,
                steps_per_epoch: steps,
            });
        }

        let bs = batch_size.get();
        let off = slice_for(index, batch_size);

        let images = &self.images()[off.image..off.image + bs * IMAGE_ELEMS];
        let labels = &self.labels()[off.label..off.label + bs * NUM_CLASSES];

        Ok(BatchView {
            index,
            images: ArrayView4::from_shape((bs, IMAGE_SIDE, IMAGE_SIDE, CHANNELS), images)?,
            labels: ArrayView2::from_shape((bs, NUM_CLASSES), labels)?,
        })
    }
}
