use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::session::ImageSource;

/// Largest image accepted for upload.
pub const MAX_IMAGE_SIZE: u64 = 20 * 1024 * 1024; // 20MB

/// Reads photos from disk or stdin into an [`ImageSource`].
pub struct ImageReader;

impl ImageReader {
    /// Reads an image file. `-` reads from stdin.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, exceeds [`MAX_IMAGE_SIZE`], or is not
    /// an image. The last case carries a [`SessionError`](crate::session::SessionError).
    pub fn read(path: &Path) -> Result<ImageSource> {
        if path.as_os_str() == "-" {
            return Self::read_stream(io::stdin().lock());
        }

        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to access file: {}", path.display()))?;

        if metadata.is_dir() {
            bail!("'{}' is a directory, not an image", path.display());
        }
        check_size(metadata.len())?;

        let payload =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(ImageSource::from_file(path, payload)?)
    }

    fn read_stream(mut stream: impl Read) -> Result<ImageSource> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 64 * 1024];

        loop {
            let bytes_read = stream
                .read(&mut chunk)
                .context("Failed to read from stdin")?;

            if bytes_read == 0 {
                break;
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);
            check_size(buffer.len() as u64)?;
        }

        Ok(ImageSource::from_stdin(buffer)?)
    }
}

#[allow(clippy::cast_precision_loss)]
fn check_size(size: u64) -> Result<()> {
    if size > MAX_IMAGE_SIZE {
        bail!(
            "Image size ({:.1} MB) exceeds maximum allowed size (20 MB)",
            size as f64 / 1024.0 / 1024.0
        );
    }
    Ok(())
}
