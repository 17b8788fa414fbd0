//! Training data pipeline for CIFAR-10.
//!
//! Loads the packed binary corpus, prepares shuffled, normalized tensors with
//! one-hot labels and drives a sequential, cancellable training loop against
//! an external [`session::Trainer`].

pub mod baseline;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod preview;
pub mod session;

pub use config::PipelineConfig;
pub use data::{BatchCursor, BatchView, Corpus, PreparedDataset};
pub use error::{PipelineErr, Result};
pub use session::{SessionState, Trainer, TrainingEvent, TrainingSession};

/// Side length of a square CIFAR image.
pub const IMAGE_SIDE: usize = 32;

/// Color planes per image.
pub const CHANNELS: usize = 3;

/// Number of label classes.
pub const NUM_CLASSES: usize = 10;

/// Pixels in one color plane.
pub const PLANE_SIZE: usize = IMAGE_SIDE * IMAGE_SIDE;

/// Decoded `f32` elements per image.
pub const IMAGE_ELEMS: usize = PLANE_SIZE * CHANNELS;

/// Bytes per raw record: one label byte followed by the planar pixels.
pub const RECORD_SIZE: usize = 1 + IMAGE_ELEMS;

/// Seed used to shuffle the corpus when none is configured.
pub const DEFAULT_SEED: u64 = 1234;

/// Batch size used when none is configured.
pub const DEFAULT_BATCH_SIZE: usize = 64;
