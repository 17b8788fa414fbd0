use std::time::Instant;

use log::info;

use super::{shuffle::shuffle_order, store::Corpus};
use crate::{
    CHANNELS, IMAGE_ELEMS, IMAGE_SIDE, NUM_CLASSES,
    error::{PipelineErr, Result},
};

/// Writes the planar pixels of one image into `out` as interleaved
/// `[row][col][channel]` values normalized to `[0, 1]`.
///
/// `planes` holds `channels` consecutive row-major planes of `side * side` bytes.
///
/// # Panics
/// If either buffer does not hold exactly `side * side * channels` elements.
pub fn transpose_planar(planes: &[u8], side: usize, channels: usize, out: &mut [f32]) {
    let plane = side * side;
    assert_eq!(planes.len(), plane * channels, "planar input size");
    assert_eq!(out.len(), plane * channels, "interleaved output size");

    for (px, texel) in out.chunks_exact_mut(channels).enumerate() {
        for (c, value) in texel.iter_mut().enumerate() {
            *value = f32::from(planes[c * plane + px]) / 255.0;
        }
    }
}

/// The corpus decoded into dense tensors, in shuffled order.
///
/// * `images` is a flattened `[len, 32, 32, 3]` tensor.
/// * `labels` is a flattened one-hot `[len, 10]` tensor.
///
/// Row `i` of both holds corpus record `order[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedDataset {
    seed: u64,
    order: Vec<usize>,
    images: Vec<f32>,
    labels: Vec<f32>,
}

impl PreparedDataset {
    /// Shuffles and decodes the whole corpus.
    ///
    /// # Args
    /// * `corpus` - The loaded raw records.
    /// * `seed` - Seed of the shuffle.
    ///
    /// # Errors
    /// `PipelineErr::LabelOutOfRange` if any record's label is not in `0..10`.
    pub fn prepare(corpus: &Corpus, seed: u64) -> Result<Self> {
        let mut dataset = Self::default();
        dataset.reprepare(corpus, seed)?;
        Ok(dataset)
    }

    /// Recomputes this dataset from scratch, overwriting both tensors.
    ///
    /// Labels are validated before anything is written, so on error the
    /// previous contents are left untouched.
    pub fn reprepare(&mut self, corpus: &Corpus, seed: u64) -> Result<()> {
        if let Some((record, label)) = corpus
            .records()
            .map(|rec| rec.label())
            .enumerate()
            .find(|&(_, label)| usize::from(label) >= NUM_CLASSES)
        {
            return Err(PipelineErr::LabelOutOfRange { record, label });
        }

        let start = Instant::now();
        let len = corpus.len();
        let order = shuffle_order(len, seed);

        self.images.clear();
        self.images.resize(len * IMAGE_ELEMS, 0.0);
        self.labels.clear();
        self.labels.resize(len * NUM_CLASSES, 0.0);

        let rows = self
            .images
            .chunks_exact_mut(IMAGE_ELEMS)
            .zip(self.labels.chunks_exact_mut(NUM_CLASSES));

        for (&src, (image, one_hot)) in order.iter().zip(rows) {
            let record = corpus.record(src);
            one_hot[usize::from(record.label())] = 1.0;
            transpose_planar(record.pixels(), IMAGE_SIDE, CHANNELS, image);
        }

        self.seed = seed;
        self.order = order;

        info!(
            records = len, seed = seed;
            "prepared images in {:.3}s",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Number of prepared records.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The shuffle order: row `i` came from corpus record `order()[i]`.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[inline]
    pub fn images(&self) -> &[f32] {
        &self.images
    }

    #[inline]
    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// The class index of row `idx` (panics if out of bounds).
    pub fn class_of(&self, idx: usize) -> usize {
        let row = &self.labels[idx * NUM_CLASSES..(idx + 1) * NUM_CLASSES];
        row.iter().position(|&v| v == 1.0).unwrap_or_default()
    }
}
