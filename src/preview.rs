//! 8-bit RGB snapshots of prepared images, for eyeballing what the trainer sees.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    IMAGE_SIDE,
    data::BatchView,
    error::{PipelineErr, Result},
};

/// An interleaved RGB image, one byte per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
}

impl PreviewImage {
    /// Writes the image as a binary PPM (`P6`) file.
    ///
    /// # Errors
    /// `PipelineErr::Io` if the file cannot be created or written.
    pub fn write_ppm(&self, path: &Path) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut out = BufWriter::new(File::create(path)?);
            write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
            out.write_all(&self.rgb)?;
            out.flush()
        };

        write().map_err(|e| PipelineErr::io(path, e))
    }
}

/// Converts the first `count` images of `batch` back to bytes.
///
/// Each normalized value `p` becomes `(p * 255) as u8`.
pub fn preview_images(batch: &BatchView<'_>, count: usize) -> Vec<PreviewImage> {
    batch
        .images
        .outer_iter()
        .take(count)
        .map(|image| PreviewImage {
            width: IMAGE_SIDE,
            height: IMAGE_SIDE,
            rgb: image.iter().map(|&p| (p * 255.0) as u8).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::{CHANNELS, IMAGE_ELEMS, PLANE_SIZE, data::Corpus, data::PreparedDataset};

    #[test]
    fn preview_restores_interleaved_bytes() {
        let mut rec = vec![2u8];
        for c in 0..CHANNELS {
            rec.extend((0..PLANE_SIZE).map(|px| ((px + c * 100) % 256) as u8));
        }
        let corpus = Corpus::from_bytes(rec).unwrap();
        let ds = PreparedDataset::prepare(&corpus, 0).unwrap();
        let batch = ds.batch(0, NonZeroUsize::new(1).unwrap()).unwrap();

        let previews = preview_images(&batch, 4);
        assert_eq!(previews.len(), 1);

        let img = &previews[0];
        assert_eq!((img.width, img.height), (32, 32));
        assert_eq!(img.rgb.len(), IMAGE_ELEMS);
        for (px, texel) in img.rgb.chunks_exact(CHANNELS).enumerate() {
            for (c, &byte) in texel.iter().enumerate() {
                let p = ds.images()[px * CHANNELS + c];
                assert_eq!(byte, (p * 255.0) as u8);
            }
        }
    }

    #[test]
    fn writes_ppm_header_and_payload() {
        let img = PreviewImage {
            width: 2,
            height: 1,
            rgb: vec![1, 2, 3, 4, 5, 6],
        };
        let path = std::env::temp_dir().join(format!("cifar-preview-{}.ppm", std::process::id()));
        img.write_ppm(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(bytes, b"P6\n2 1\n255\n\x01\x02\x03\x04\x05\x06");
    }
}
