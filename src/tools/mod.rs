//! External tool integration.
//!
//! The pipeline never touches image bytes itself; the optimizer, the PNG
//! compressor, and the renderer all sit behind [`ToolBackend`] so tests can
//! run the whole pipeline without any of them installed.

pub mod backend;
pub mod shell;

pub use backend::{ToolBackend, ToolError};
pub use shell::ShellBackend;
