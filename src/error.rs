use std::{error::Error, fmt, io, path::PathBuf};

use ndarray::ShapeError;

/// The pipeline's result type.
pub type Result<T> = std::result::Result<T, PipelineErr>;

/// Failures while loading, preparing or training on the corpus.
#[derive(Debug)]
pub enum PipelineErr {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Format {
        len: usize,
        record_size: usize,
    },
    LabelOutOfRange {
        record: usize,
        label: u8,
    },
    BatchOutOfRange {
        batch: usize,
        steps_per_epoch: usize,
    },
    Shape(ShapeError),
    Config(String),
    Trainer {
        step: u64,
        msg: String,
    },
    Join(String),
}

impl PipelineErr {
    /// Wraps an io error together with the file it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for PipelineErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineErr::Io { path, source } => {
                write!(f, "io error on {}: {source}", path.display())
            }
            PipelineErr::Format { len, record_size } => write!(
                f,
                "corpus length {len} is not a multiple of the record size {record_size}"
            ),
            PipelineErr::LabelOutOfRange { record, label } => {
                write!(f, "record {record} has label {label}, expected 0..10")
            }
            PipelineErr::BatchOutOfRange {
                batch,
                steps_per_epoch,
            } => write!(
                f,
                "batch {batch} out of range, there are {steps_per_epoch} full batches per epoch"
            ),
            PipelineErr::Shape(e) => write!(f, "batch shape error: {e}"),
            PipelineErr::Config(msg) => write!(f, "invalid config: {msg}"),
            PipelineErr::Trainer { step, msg } => {
                write!(f, "training step {step} failed: {msg}")
            }
            PipelineErr::Join(msg) => write!(f, "worker context failed: {msg}"),
        }
    }
}

impl Error for PipelineErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineErr::Io { source, .. } => Some(source),
            PipelineErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PipelineErr {
    fn from(value: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: value,
        }
    }
}

impl From<ShapeError> for PipelineErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<PipelineErr> for io::Error {
    fn from(value: PipelineErr) -> Self {
        match value {
            PipelineErr::Io { source, .. } => source,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_keeps_its_source_and_path() {
        let err = PipelineErr::io("a.bin", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("a.bin"));
    }

    #[test]
    fn non_io_errors_become_invalid_data() {
        let err: io::Error = PipelineErr::LabelOutOfRange {
            record: 3,
            label: 200,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
