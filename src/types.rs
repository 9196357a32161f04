//! Types shared across the pipeline stages.

use std::fmt;
use std::path::{Path, PathBuf};

/// The input kinds the staging pipeline knows how to handle.
///
/// Classification is by extension, case-insensitive. Exactly four
/// extensions are recognized: `.svg`, `.png`, `.jpg`, `.gif`. Anything
/// else matched by an input pattern is skipped, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Svg,
    Png,
    Jpeg,
    Gif,
}

impl FileKind {
    /// Classify a path by its extension. `None` means the file is not
    /// something the pipeline processes.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A processed input: where it came from, where its staged copy lives,
/// and where it lands in the output tree.
///
/// JPEG and GIF inputs stage as themselves (`staged == src`); SVG and PNG
/// inputs stage as an optimized copy in the run's scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub src: PathBuf,
    pub staged: PathBuf,
    pub dist: PathBuf,
    pub kind: FileKind,
}

/// One renderer work item: a staged SVG rendered to `output` with
/// `options`, destined for `dist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dist: PathBuf,
    /// Target format as configured ("png", "jpg", "pdf", ...).
    pub format: String,
    /// Option string handed to the renderer alongside the output path.
    pub options: String,
}

/// A rendered (and, for PNG, re-compressed) output variant of an SVG input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterVariant {
    pub staged: PathBuf,
    pub dist: PathBuf,
    pub format: String,
}

/// Directories and flags every stage needs.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Base directory for relative patterns and output-relative paths.
    pub working_dir: PathBuf,
    /// Root of the output tree.
    pub dist_dir: PathBuf,
    /// Per-run scratch directory. Staged copies and renderer outputs land
    /// here before the final copy into `dist_dir`.
    pub temp_dir: PathBuf,
    /// Per-file logging plus scratch-directory retention after the run.
    pub debug: bool,
}
