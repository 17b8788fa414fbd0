use log::trace;

use crate::{NUM_CLASSES, data::BatchView, session::Trainer};

/// A non-learning stand-in for the image model.
///
/// Predicts every image with the class frequencies seen so far (Laplace
/// smoothed) and reports the mean cross-entropy of that prediction against the
/// batch labels. The counts are updated after scoring each batch.
#[derive(Debug, Clone)]
pub struct ClassPriorTrainer {
    counts: [f64; NUM_CLASSES],
}

impl ClassPriorTrainer {
    pub fn new() -> Self {
        Self {
            counts: [1.0; NUM_CLASSES],
        }
    }

    /// Current predicted probability of each class.
    pub fn prior(&self) -> [f64; NUM_CLASSES] {
        let total: f64 = self.counts.iter().sum();
        self.counts.map(|c| c / total)
    }
}

impl Default for ClassPriorTrainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer for ClassPriorTrainer {
    fn train_step(&mut self, batch: BatchView<'_>) -> Result<f32, String> {
        if batch.is_empty() {
            return Err("empty batch".into());
        }

        let prior = self.prior();
        let classes: Vec<usize> = (0..batch.len()).map(|row| batch.class_of(row)).collect();

        let loss = classes.iter().map(|&c| -prior[c].ln()).sum::<f64>() / classes.len() as f64;

        for c in classes {
            self.counts[c] += 1.0;
        }

        trace!(batch = batch.index; "class prior loss {loss:.4}");
        Ok(loss as f32)
    }
}
