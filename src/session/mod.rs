mod state;
mod trainer;

use std::{num::NonZeroUsize, sync::Arc, time::Instant};

use log::{debug, info, trace, warn};
use tokio::{sync::mpsc, task};
use tokio_util::sync::CancellationToken;

pub use state::SessionState;
pub use trainer::Trainer;

use crate::{
    data::{BatchCursor, PreparedDataset},
    error::{PipelineErr, Result},
    metrics::SessionMetrics,
    preview::{PreviewImage, preview_images},
};

/// Progress notifications published while a session runs.
#[derive(Debug, Clone)]
pub enum TrainingEvent {
    StepCompleted {
        step: u64,
        batch: usize,
        epoch: u64,
        loss: f32,
    },
    EpochCompleted {
        epoch: u64,
    },
    Preview {
        step: u64,
        images: Vec<PreviewImage>,
    },
    Finished {
        steps: u64,
        cancelled: bool,
    },
}

/// What a finished session leaves behind.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Either `Finished` or `Cancelled`.
    pub outcome: SessionState,
    pub metrics: SessionMetrics,
    /// The batch the next step would have trained on.
    pub next_batch: usize,
}

/// Drives the batch loop: one step in flight at a time, the cursor advanced
/// on each completion.
///
/// The prepared dataset is shared read-only; the trainer is moved onto tokio's
/// blocking pool for the duration of each step and moved back afterwards.
pub struct TrainingSession {
    dataset: Arc<PreparedDataset>,
    cursor: BatchCursor,
    trainer: Option<Box<dyn Trainer>>,
    max_steps: NonZeroUsize,
    preview_count: usize,
    state: SessionState,
    metrics: SessionMetrics,
    events: Option<mpsc::Sender<TrainingEvent>>,
}

impl TrainingSession {
    /// Creates a new idle session positioned at batch 0.
    ///
    /// # Args
    /// * `dataset` - The prepared tensors to train on.
    /// * `batch_size` - Records per step.
    /// * `trainer` - The model side of each step.
    /// * `max_steps` - The session stops after this many steps.
    pub fn new(
        dataset: Arc<PreparedDataset>,
        batch_size: NonZeroUsize,
        trainer: Box<dyn Trainer>,
        max_steps: NonZeroUsize,
    ) -> Self {
        Self {
            cursor: BatchCursor::new(dataset.len(), batch_size),
            dataset,
            trainer: Some(trainer),
            max_steps,
            preview_count: 0,
            state: SessionState::Idle,
            metrics: SessionMetrics::default(),
            events: None,
        }
    }

    /// Publishes [`TrainingEvent`]s on `events`.
    pub fn with_events(mut self, events: mpsc::Sender<TrainingEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Publishes the first `count` images of every batch before it is trained on.
    pub fn with_preview(mut self, count: usize) -> Self {
        self.preview_count = count;
        self
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn cursor(&self) -> &BatchCursor {
        &self.cursor
    }

    #[inline]
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Runs steps until `max_steps` is reached or `cancel` fires.
    ///
    /// Cancellation is checked between steps; a step already in flight runs
    /// to completion. A dataset too small for a single batch finishes
    /// immediately without training.
    ///
    /// # Errors
    /// Returns the first failing step's error; the session stops there.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<SessionReport> {
        if self.cursor.is_degenerate() {
            warn!(
                "{} record(s) do not fill a batch of {}, nothing to train",
                self.dataset.len(),
                self.cursor.batch_size()
            );
        } else {
            info!(
                steps_per_epoch = self.cursor.steps_per_epoch(),
                max_steps = self.max_steps.get();
                "starting training"
            );

            for step in 0..self.max_steps.get() as u64 {
                if cancel.is_cancelled() {
                    info!(step = step; "cancellation requested, stopping");
                    self.transition(SessionState::Cancelled);
                    break;
                }

                self.run_step(step).await?;
            }
        }

        if !self.state.is_terminal() {
            self.transition(SessionState::Finished);
        }

        let cancelled = self.state == SessionState::Cancelled;
        let steps = self.metrics.steps;
        info!(
            steps = steps, epochs = self.metrics.epochs;
            "training {}",
            self.state.name()
        );
        self.emit(TrainingEvent::Finished { steps, cancelled }).await;

        Ok(SessionReport {
            outcome: self.state,
            next_batch: self.cursor.current(),
            metrics: self.metrics,
        })
    }

    async fn run_step(&mut self, step: u64) -> Result<()> {
        let batch = self.cursor.current();
        let batch_size = self.cursor.batch_size();

        self.transition(SessionState::StepInFlight { step, batch });
        self.publish_preview(step, batch).await?;

        let mut trainer = self
            .trainer
            .take()
            .ok_or_else(|| PipelineErr::Join("trainer was not returned by the previous step".into()))?;
        let dataset = Arc::clone(&self.dataset);
        let started = Instant::now();

        let (trainer, loss) = task::spawn_blocking(move || {
            let loss = dataset.batch(batch, batch_size).and_then(|view| {
                trainer
                    .train_step(view)
                    .map_err(|msg| PipelineErr::Trainer { step, msg })
            });
            (trainer, loss)
        })
        .await
        .map_err(|e| PipelineErr::Join(format!("step {step}: {e}")))?;

        self.trainer = Some(trainer);
        let loss = loss?;

        self.transition(SessionState::StepComplete { step, batch, loss });
        self.metrics
            .record_step(loss, batch_size.get(), started.elapsed());
        debug!(step = step, batch = batch; "loss {loss}");

        let epoch = self.cursor.epochs();
        self.emit(TrainingEvent::StepCompleted {
            step,
            batch,
            epoch,
            loss,
        })
        .await;

        if self.cursor.advance() {
            self.metrics.bump_epoch();
            let epoch = self.cursor.epochs();
            info!(
                epoch = epoch;
                "epoch complete, mean loss {:.4}",
                self.metrics
                    .mean_loss(self.cursor.steps_per_epoch())
                    .unwrap_or_default()
            );
            self.emit(TrainingEvent::EpochCompleted { epoch }).await;
        }

        self.transition(SessionState::Idle);
        Ok(())
    }

    async fn publish_preview(&mut self, step: u64, batch: usize) -> Result<()> {
        if self.preview_count == 0 || self.events.is_none() {
            return Ok(());
        }

        let images = {
            let view = self.dataset.batch(batch, self.cursor.batch_size())?;
            preview_images(&view, self.preview_count)
        };
        self.emit(TrainingEvent::Preview { step, images }).await;
        Ok(())
    }

    async fn emit(&mut self, event: TrainingEvent) {
        let Some(events) = &self.events else {
            return;
        };

        if events.send(event).await.is_err() {
            debug!("event receiver dropped, no longer publishing");
            self.events = None;
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_become(&next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        trace!("session {} -> {}", self.state.name(), next.name());
        self.state = next;
    }
}
