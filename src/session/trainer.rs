use crate::data::BatchView;

/// The model side of a training step.
///
/// Implementors receive one batch of `[batch, 32, 32, 3]` images and
/// `[batch, 10]` one-hot labels and return the step's scalar loss. Steps are
/// executed one at a time on a blocking worker thread, never concurrently.
pub trait Trainer: Send {
    fn train_step(&mut self, batch: BatchView<'_>) -> Result<f32, String>;
}
