//! Backend abstraction over the external tools.
//!
//! Every external step goes through [`ToolBackend`]: SVG optimization, PNG
//! compression, and SVG rasterization. Production code uses
//! [`ShellBackend`](super::ShellBackend); tests swap in a mock that records
//! calls and writes placeholder files.

use crate::types::RasterRequest;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to launch {tool}: {source} (is it installed and on PATH?)")]
    Launch {
        tool: &'static str,
        source: std::io::Error,
    },
    #[error("{tool} failed: {detail}")]
    Failed { tool: &'static str, detail: String },
    #[error("{tool} produced output that is not valid UTF-8")]
    BadOutput { tool: &'static str },
    #[error("path {0:?} cannot be passed to an external tool: not valid UTF-8")]
    BadPath(std::path::PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Interface to the three external tools the pipeline drives.
///
/// `Sync` because staging and rasterization fan out over a thread pool
/// sharing one backend.
pub trait ToolBackend: Sync {
    /// Run the SVG optimizer over `svg` and return the optimized markup.
    fn optimize_svg(&self, svg: &str) -> Result<String, ToolError>;

    /// Compress the PNG at `input`, writing the result to `output`.
    fn compress_png(&self, input: &Path, output: &Path) -> Result<(), ToolError>;

    /// Render every request in a single renderer invocation. On success
    /// each request's `output` file exists.
    fn render(&self, requests: &[RasterRequest]) -> Result<(), ToolError>;
}
