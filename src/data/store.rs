use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    PLANE_SIZE, RECORD_SIZE,
    error::{PipelineErr, Result},
};

/// Directory the packaged archive extracts the binary batches into.
pub const BATCH_DIR: &str = "cifar-10-batches-bin";

/// The training batches, in the order they are concatenated.
pub const BATCH_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];

/// Returns the paths of the five training batches under `data_dir`, in load order.
pub fn default_batch_paths(data_dir: &Path) -> Vec<PathBuf> {
    BATCH_FILES.iter().map(|name| data_dir.join(name)).collect()
}

/// The raw corpus: every record of every source file, concatenated.
///
/// Immutable once loaded. Its length is always a multiple of [`RECORD_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    bytes: Vec<u8>,
}

impl Corpus {
    /// Reads and concatenates `paths` in the given order.
    ///
    /// # Args
    /// * `paths` - The source files, in the order their records should appear.
    ///
    /// # Returns
    /// The loaded corpus.
    ///
    /// # Errors
    /// `PipelineErr::Io` if a file is missing or unreadable,
    /// `PipelineErr::Format` if the total length is not a whole number of records.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut bytes = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let read = File::open(path)
                .and_then(|mut file| file.read_to_end(&mut bytes))
                .map_err(|e| PipelineErr::io(path, e))?;

            debug!(bytes = read; "read {}", path.display());
        }

        let corpus = Self::from_bytes(bytes)?;
        info!(
            "loaded {} record(s) from {} file(s)",
            corpus.len(),
            paths.len()
        );

        Ok(corpus)
    }

    /// Builds a corpus from an in-memory buffer.
    ///
    /// # Errors
    /// `PipelineErr::Format` if `bytes.len()` is not a multiple of [`RECORD_SIZE`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % RECORD_SIZE != 0 {
            return Err(PipelineErr::Format {
                len: bytes.len(),
                record_size: RECORD_SIZE,
            });
        }

        Ok(Self { bytes })
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / RECORD_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the record at `idx` (panics if out of bounds).
    #[inline]
    pub fn record(&self, idx: usize) -> RecordRef<'_> {
        let start = idx * RECORD_SIZE;
        RecordRef {
            bytes: &self.bytes[start..start + RECORD_SIZE],
        }
    }

    pub fn records(&self) -> impl ExactSizeIterator<Item = RecordRef<'_>> {
        self.bytes
            .chunks_exact(RECORD_SIZE)
            .map(|bytes| RecordRef { bytes })
    }
}

/// Borrowed view of one raw record.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordRef<'a> {
    /// The raw label byte. Not validated.
    #[inline]
    pub fn label(&self) -> u8 {
        self.bytes[0]
    }

    /// The 3072 planar pixel bytes.
    #[inline]
    pub fn pixels(&self) -> &'a [u8] {
        &self.bytes[1..]
    }

    /// One color plane, 32x32 row-major.
    #[inline]
    pub fn plane(&self, channel: usize) -> &'a [u8] {
        &self.pixels()[channel * PLANE_SIZE..(channel + 1) * PLANE_SIZE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_record(label: u8, fill: u8) -> Vec<u8> {
        let mut rec = vec![fill; RECORD_SIZE];
        rec[0] = label;
        rec
    }

    #[test]
    fn from_bytes_splits_records() {
        let mut bytes = raw_record(3, 7);
        bytes.extend(raw_record(9, 8));

        let corpus = Corpus::from_bytes(bytes).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.record(0).label(), 3);
        assert_eq!(corpus.record(1).label(), 9);
        assert_eq!(corpus.record(1).pixels().len(), RECORD_SIZE - 1);
        assert!(corpus.record(1).plane(2).iter().all(|&b| b == 8));
        assert_eq!(corpus.records().len(), 2);
    }

    #[test]
    fn from_bytes_rejects_a_trailing_byte() {
        let mut bytes = raw_record(0, 0);
        bytes.push(1);

        match Corpus::from_bytes(bytes) {
            Err(PipelineErr::Format { len, record_size }) => {
                assert_eq!(len, RECORD_SIZE + 1);
                assert_eq!(record_size, RECORD_SIZE);
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn empty_corpus_is_valid() {
        let corpus = Corpus::from_bytes(Vec::new()).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.len(), 0);
    }

    #[test]
    fn default_paths_keep_batch_order() {
        let paths = default_batch_paths(Path::new("data"));
        assert_eq!(paths.len(), 5);
        assert_eq!(paths[0], Path::new("data/data_batch_1.bin"));
        assert_eq!(paths[4], Path::new("data/data_batch_5.bin"));
    }
}
