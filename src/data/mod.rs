pub mod batch;
pub mod cursor;
pub mod prepare;
pub mod shuffle;
pub mod store;

pub use batch::BatchView;
pub use cursor::{BatchCursor, BatchOffsets, slice_for, steps_per_epoch};
pub use prepare::{PreparedDataset, transpose_planar};
pub use shuffle::shuffle_order;
pub use store::{BATCH_DIR, BATCH_FILES, Corpus, RecordRef, default_batch_paths};
