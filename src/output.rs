//! Output naming and writing.
//!
//! Decides where the stitched image goes (`--file-prefix` picks the next free
//! numbered name, `--file-name` overwrites a fixed one), where the intermediate
//! captures live, and writes the final PNG.

use crate::capture::file::CaptureStore;
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default prefix when neither `--file-prefix` nor `--file-name` is given.
pub const DEFAULT_FILE_PREFIX: &str = "stitch";

/// Numbered names tried in prefix mode before giving up.
pub const MAX_NUMBERED_OUTPUTS: usize = 1000;

/// How the output file is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputName {
    /// `<prefix><NNN>.png` with the lowest unused index; never overwrites.
    Prefix(String),
    /// Fixed file name; overwritten on every run.
    Name(String),
}

/// Errors raised while naming or writing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("--file-prefix and --file-name are mutually exclusive")]
    ConflictingArguments,

    #[error("Capture directory {0} does not exist. Cannot stitch.")]
    MissingDirectory(PathBuf),

    #[error("--file-name is required with --no-capture")]
    NameRequired,

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Too many outputs named '{prefix}' in {}. Could not generate a file name.", .directory.display())]
    NamesExhausted { directory: PathBuf, prefix: String },

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl OutputName {
    /// Combine the two mutually exclusive naming flags.
    pub fn from_args(
        file_prefix: Option<String>,
        file_name: Option<String>,
    ) -> Result<Self, OutputError> {
        match (file_prefix, file_name) {
            (Some(_), Some(_)) => Err(OutputError::ConflictingArguments),
            (_, Some(name)) => Ok(OutputName::Name(name)),
            (Some(prefix), None) => Ok(OutputName::Prefix(prefix)),
            (None, None) => Ok(OutputName::Prefix(DEFAULT_FILE_PREFIX.to_string())),
        }
    }
}

/// Resolved locations for one run.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Where the stitched image is written.
    pub output_path: PathBuf,
    /// Where the intermediate captures are written or read.
    pub captures: CaptureStore,
}

/// Work out the output path and capture naming.
///
/// In capture mode the output directory is created when missing. In no-capture
/// mode it must already exist and the output must be named explicitly, because
/// the captures to stitch are located by that name.
pub fn plan_layout(
    out_dir: &Path,
    name: &OutputName,
    capture: bool,
    max_captures: usize,
) -> Result<OutputLayout, OutputError> {
    if !out_dir.is_dir() {
        if !capture {
            return Err(OutputError::MissingDirectory(out_dir.to_path_buf()));
        }
        ensure_directory_exists(out_dir)?;
    }

    let output_path = match name {
        OutputName::Name(file_name) => {
            // An empty or `..` name would resolve to `out_dir` itself or its parent.
            if Path::new(file_name)
                .file_name()
                .is_none_or(|name| name.is_empty())
            {
                return Err(OutputError::InvalidPath(file_name.clone()));
            }
            with_png_extension(out_dir.join(file_name))
        }
        OutputName::Prefix(_) if !capture => return Err(OutputError::NameRequired),
        OutputName::Prefix(prefix) => next_free_name(out_dir, prefix)?,
    };

    let stem = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| OutputError::InvalidPath(output_path.display().to_string()))?;
    let capture_dir = output_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| out_dir.to_path_buf());

    let captures = CaptureStore::new(capture_dir, format!("{}_", stem), max_captures);

    Ok(OutputLayout {
        output_path,
        captures,
    })
}

/// First `<prefix><NNN>.png` in `directory` that does not exist yet.
pub fn next_free_name(directory: &Path, prefix: &str) -> Result<PathBuf, OutputError> {
    let width = crate::capture::file::index_width(MAX_NUMBERED_OUTPUTS);
    (0..MAX_NUMBERED_OUTPUTS)
        .map(|index| directory.join(format!("{}{:0width$}.png", prefix, index, width = width)))
        .find(|path| !path.exists())
        .ok_or_else(|| OutputError::NamesExhausted {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
        })
}

fn with_png_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("png")
    }
}

/// Ensure the output directory exists, creating it if necessary.
pub fn ensure_directory_exists(directory: &Path) -> Result<(), OutputError> {
    if !directory.exists() {
        log::info!("Creating output directory: {}", directory.display());
        fs::create_dir_all(directory).map_err(|source| OutputError::CreateDirectory {
            path: directory.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write the stitched image; the format follows the file extension.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    log::info!(
        "Saving {}x{} image to {}",
        image.width(),
        image.height(),
        path.display()
    );
    image.save(path).map_err(|source| OutputError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// Expand tilde (~) in path strings.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn both_names_conflict() {
        let err = OutputName::from_args(Some("a".into()), Some("b.png".into())).unwrap_err();
        assert!(matches!(err, OutputError::ConflictingArguments));
    }

    #[test]
    fn prefix_defaults_to_stitch() {
        assert_eq!(
            OutputName::from_args(None, None).unwrap(),
            OutputName::Prefix("stitch".into())
        );
    }

    #[test]
    fn prefix_mode_picks_next_free_index() {
        let temp = TempDir::new().unwrap();
        let name = OutputName::Prefix("shot".into());

        let first = plan_layout(temp.path(), &name, true, 50).unwrap();
        assert_eq!(first.output_path, temp.path().join("shot000.png"));
        assert_eq!(first.captures.path_for(4), temp.path().join("shot000_04.png"));

        std::fs::write(&first.output_path, b"taken").unwrap();
        let second = plan_layout(temp.path(), &name, true, 50).unwrap();
        assert_eq!(second.output_path, temp.path().join("shot001.png"));
    }

    #[test]
    fn name_mode_reuses_path_and_adds_extension() {
        let temp = TempDir::new().unwrap();
        let name = OutputName::Name("settings".into());

        let layout = plan_layout(temp.path(), &name, true, 50).unwrap();
        assert_eq!(layout.output_path, temp.path().join("settings.png"));
        std::fs::write(&layout.output_path, b"old").unwrap();
        let again = plan_layout(temp.path(), &name, true, 50).unwrap();
        assert_eq!(again.output_path, layout.output_path);
    }

    #[test]
    fn name_must_have_a_file_component() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("out");
        for bad in ["", "..", "shots/.."] {
            let err = plan_layout(&out_dir, &OutputName::Name(bad.into()), true, 50).unwrap_err();
            assert!(matches!(err, OutputError::InvalidPath(_)), "name {bad:?}");
        }
        assert!(!temp.path().join("out.png").exists());
    }

    #[test]
    fn capture_mode_creates_directory() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("nested").join("out");
        plan_layout(&out_dir, &OutputName::Prefix("s".into()), true, 10).unwrap();
        assert!(out_dir.is_dir());
    }

    #[test]
    fn no_capture_requires_existing_directory_and_name() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let name = OutputName::Name("a.png".into());
        assert!(matches!(
            plan_layout(&missing, &name, false, 10),
            Err(OutputError::MissingDirectory(_))
        ));
        assert!(matches!(
            plan_layout(temp.path(), &OutputName::Prefix("s".into()), false, 10),
            Err(OutputError::NameRequired)
        ));
    }

    #[test]
    fn saves_png_with_alpha() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.png");
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 0]));
        save_image(&image, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }

    #[test]
    fn unsupported_extension_is_a_write_failure() {
        let temp = TempDir::new().unwrap();
        let image = RgbaImage::new(1, 1);
        let err = save_image(&image, &temp.path().join("out.xyz")).unwrap_err();
        assert!(matches!(err, OutputError::WriteFailure { .. }));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/Pictures");
        assert!(!expanded.to_string_lossy().starts_with("~"));

        let no_tilde = expand_tilde("/absolute/path");
        assert_eq!(no_tilde, PathBuf::from("/absolute/path"));
    }
}
