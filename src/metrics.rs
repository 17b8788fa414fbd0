use std::time::Duration;

/// Counters and loss history of a training session.
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    pub compute_time: Duration,

    pub steps: u64,
    pub epochs: u64,
    pub samples: u64,

    /// Loss of every completed step, in order.
    pub losses: Vec<f32>,
}

impl SessionMetrics {
    #[inline]
    pub fn record_step(&mut self, loss: f32, samples: usize, elapsed: Duration) {
        self.steps += 1;
        self.samples += samples as u64;
        self.compute_time += elapsed;
        self.losses.push(loss);
    }

    #[inline]
    pub fn bump_epoch(&mut self) {
        self.epochs += 1;
    }

    #[inline]
    pub fn last_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    /// Mean loss over the last `window` steps.
    pub fn mean_loss(&self, window: usize) -> Option<f32> {
        let tail = &self.losses[self.losses.len().saturating_sub(window)..];
        if tail.is_empty() {
            return None;
        }

        Some(tail.iter().sum::<f32>() / tail.len() as f32)
    }
}
