/* Copyright 2020 @TwoCookingMice */

use std::path::{Path, PathBuf};

use crate::core::error::RenderError;
use crate::core::sensor::{SensorSignal, SignalDestination};
use crate::math::bitmap::Bitmap;

use exr::prelude::write_rgb_file;

// Write EXR Image to file
pub fn write_exr_to_file<P: AsRef<Path>>(image: &Bitmap, file_path: P) -> Result<(), RenderError> {
    let file_path = file_path.as_ref();
    log::info!("Starting writing openexr images: {}.", file_path.display());

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let pixel = image[(x, y)];
        (pixel.x, pixel.y, pixel.z)
    }).map_err(|e| RenderError::Emit(format!("{}: {}", file_path.display(), e)))?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}

/// Writes every snapshot of a signal over the same OpenEXR file.
pub struct ExrDestination {
    path: PathBuf,
    written: usize,
}

impl ExrDestination {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), written: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl SignalDestination for ExrDestination {
    fn emit(&mut self, signal: &SensorSignal, is_final: bool) -> Result<(), RenderError> {
        if !is_final {
            log::debug!("Partial signal with {} samples.", signal.total_samples());
        }
        write_exr_to_file(&signal.to_bitmap(), &self.path)?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sensor::{SensorBlock, SensorExtent};
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_destination_writes_file() {
        let path = std::env::temp_dir().join(format!("signal_{}.exr", std::process::id()));
        let mut signal = SensorSignal::new(3, 2);
        let mut block = SensorBlock::new(SensorExtent::new(0, 3, 0, 2, 1));
        block.accumulate(1, 1, RGBSpectrum::new(1.0, 0.5, 0.25));
        signal.record(&block);

        let mut destination = ExrDestination::new(&path);
        signal.emit_signal(&mut destination, true).unwrap();
        assert_eq!(destination.written(), 1);
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let bitmap = Bitmap::new(1, 1);
        let result = write_exr_to_file(&bitmap, "/nonexistent-dir/out.exr");
        assert!(matches!(result, Err(RenderError::Emit(_))));
    }
}
