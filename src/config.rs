use std::{
    env, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    DEFAULT_BATCH_SIZE, DEFAULT_SEED,
    data::{BATCH_DIR, BATCH_FILES},
    error::{PipelineErr, Result},
};

const DEFAULT_MAX_STEPS: usize = 1000;
const DEFAULT_PREVIEW_COUNT: usize = 4;

/// Settings for loading, preparing and training on the corpus.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding the extracted binary batches.
    pub data_dir: PathBuf,
    /// Batch file names under `data_dir`, in load order.
    pub files: Vec<String>,
    pub batch_size: NonZeroUsize,
    pub seed: u64,
    /// Upper bound on training steps for one session.
    pub max_steps: NonZeroUsize,
    /// Images of each batch to publish as previews. 0 disables previews.
    pub preview_count: usize,
    /// Where previews are written as PPM files, if anywhere.
    pub preview_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: Path::new("cifar-dataset").join(BATCH_DIR),
            files: BATCH_FILES.iter().map(|f| f.to_string()).collect(),
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            seed: DEFAULT_SEED,
            max_steps: NonZeroUsize::new(DEFAULT_MAX_STEPS).unwrap_or(NonZeroUsize::MIN),
            preview_count: DEFAULT_PREVIEW_COUNT,
            preview_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Parses a config from JSON text.
    ///
    /// # Errors
    /// `PipelineErr::Config` if the text is not a valid config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PipelineErr::Config(format!("invalid JSON: {e}")))
    }

    /// Reads a config from a JSON file.
    ///
    /// # Errors
    /// `PipelineErr::Io` if the file cannot be read, `PipelineErr::Config` if it doesn't parse.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PipelineErr::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Applies `CIFAR_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides looked up by variable name.
    ///
    /// Recognized keys: `CIFAR_DATA_DIR`, `CIFAR_SEED`, `CIFAR_BATCH_SIZE`, `CIFAR_MAX_STEPS`.
    ///
    /// # Errors
    /// `PipelineErr::Config` if a numeric override doesn't parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CIFAR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup("CIFAR_SEED") {
            self.seed = parse_var("CIFAR_SEED", &seed)?;
        }
        if let Some(bs) = lookup("CIFAR_BATCH_SIZE") {
            self.batch_size = parse_var("CIFAR_BATCH_SIZE", &bs)?;
        }
        if let Some(steps) = lookup("CIFAR_MAX_STEPS") {
            self.max_steps = parse_var("CIFAR_MAX_STEPS", &steps)?;
        }

        Ok(())
    }

    /// Checks the settings that serde can't.
    ///
    /// # Errors
    /// `PipelineErr::Config` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(PipelineErr::Config("files must not be empty".into()));
        }
        if self.preview_count > self.batch_size.get() {
            return Err(PipelineErr::Config(format!(
                "preview_count {} exceeds batch_size {}",
                self.preview_count, self.batch_size
            )));
        }

        Ok(())
    }

    /// The batch files to load, in order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| self.data_dir.join(f)).collect()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PipelineErr::Config(format!("{key}={value:?}: {e}")))
}
