#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use cifar_pipeline::{CHANNELS, PLANE_SIZE};

/// A raw record whose plane `c`, pixel `px` holds `(seed + 3 * c + px) % 256`.
pub fn record(label: u8, seed: usize) -> Vec<u8> {
    let mut rec = Vec::with_capacity(1 + CHANNELS * PLANE_SIZE);
    rec.push(label);
    for c in 0..CHANNELS {
        rec.extend((0..PLANE_SIZE).map(|px| ((seed + 3 * c + px) % 256) as u8));
    }
    rec
}

/// `n` records labelled `i % 10`, each with its own pixel pattern.
pub fn records(n: usize, offset: usize) -> Vec<u8> {
    (0..n)
        .flat_map(|i| record(((i + offset) % 10) as u8, i + offset))
        .collect()
}

/// A fresh scratch directory, unique per test.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cifar-pipeline-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}
