//! On-disk storage for intermediate captures.
//!
//! Captures live next to the output image as `<stem>_<index>.png`, with the index
//! zero-padded to the width of the largest possible index. A later `--no-capture`
//! run finds them again by the same naming rule.

use super::types::{Capture, CaptureError};
use std::fs;
use std::path::{Path, PathBuf};

/// Naming and I/O for one run's capture files.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    /// Directory holding the capture files.
    pub directory: PathBuf,
    /// File name prefix, including the trailing underscore.
    pub prefix: String,
    /// Digits used for the zero-padded index.
    pub index_width: usize,
}

impl CaptureStore {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, max_captures: usize) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            index_width: index_width(max_captures),
        }
    }

    /// Path of the capture with the given sequence index.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.directory.join(format!(
            "{}{:0width$}.png",
            self.prefix,
            index,
            width = self.index_width
        ))
    }

    /// Write the encoded bytes of a capture exactly as the device returned them.
    pub fn save(&self, index: usize, image_data: &[u8]) -> Result<PathBuf, CaptureError> {
        let path = self.path_for(index);
        log::debug!(
            "Saving capture {} to {} ({} bytes)",
            index,
            path.display(),
            image_data.len()
        );
        fs::write(&path, image_data)?;
        Ok(path)
    }

    /// Load the consecutive run of captures starting at index 0.
    pub fn load_all(&self) -> Result<Vec<Capture>, CaptureError> {
        let mut captures = Vec::new();
        loop {
            let path = self.path_for(captures.len());
            if !path.exists() {
                break;
            }
            log::info!("Loading capture {}", path.display());
            let image = image::open(&path)?.to_rgba8();
            captures.push(Capture {
                index: captures.len(),
                image,
                saved_path: Some(path),
            });
        }
        Ok(captures)
    }

    /// Remove every capture file matching this store's prefix, regardless of index.
    ///
    /// Returns how many files were removed.
    pub fn remove_all(&self) -> Result<usize, CaptureError> {
        if !self.directory.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let path = entry.path();
            if !self.is_capture_file(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("Removed capture {}", path.display());
                    removed += 1;
                }
                Err(e) => log::warn!("Failed to remove capture {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }

    fn is_capture_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        name.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_suffix(".png"))
            .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Number of digits needed for the largest index below `max`.
pub fn index_width(max: usize) -> usize {
    max.saturating_sub(1).max(1).to_string().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(shade: u8) -> Vec<u8> {
        let image = RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255]));
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn index_width_follows_max_captures() {
        assert_eq!(index_width(1), 1);
        assert_eq!(index_width(10), 1);
        assert_eq!(index_width(50), 2);
        assert_eq!(index_width(101), 3);
        assert_eq!(index_width(1000), 3);
    }

    #[test]
    fn paths_are_zero_padded() {
        let store = CaptureStore::new("/tmp/out", "stitch000_", 50);
        assert_eq!(store.path_for(3), PathBuf::from("/tmp/out/stitch000_03.png"));
    }

    #[test]
    fn load_stops_at_first_gap() {
        let temp = TempDir::new().unwrap();
        let store = CaptureStore::new(temp.path(), "shot_", 50);
        store.save(0, &png_bytes(10)).unwrap();
        store.save(1, &png_bytes(20)).unwrap();
        store.save(3, &png_bytes(40)).unwrap();

        let captures = store.load_all().unwrap();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[1].index, 1);
        assert_eq!(captures[1].image.get_pixel(0, 0), &Rgba([20, 20, 20, 255]));
    }

    #[test]
    fn remove_only_touches_matching_files() {
        let temp = TempDir::new().unwrap();
        let store = CaptureStore::new(temp.path(), "shot_", 50);
        store.save(0, &png_bytes(1)).unwrap();
        store.save(1, &png_bytes(2)).unwrap();
        // Stale capture written with a different index width.
        std::fs::write(temp.path().join("shot_0007.png"), png_bytes(3)).unwrap();
        std::fs::write(temp.path().join("shot.png"), png_bytes(4)).unwrap();
        std::fs::write(temp.path().join("shot_notes.png"), png_bytes(5)).unwrap();

        assert_eq!(store.remove_all().unwrap(), 3);
        assert!(temp.path().join("shot.png").exists());
        assert!(temp.path().join("shot_notes.png").exists());
    }

    #[test]
    fn corrupt_capture_is_an_image_error() {
        let temp = TempDir::new().unwrap();
        let store = CaptureStore::new(temp.path(), "bad_", 10);
        store.save(0, b"not a png").unwrap();
        assert!(matches!(store.load_all(), Err(CaptureError::ImageError(_))));
    }
}
