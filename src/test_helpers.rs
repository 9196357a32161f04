//! Shared helpers for unit tests.

use crate::config::{OutputFormat, RunConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp dir plus its canonicalized root. Resolution canonicalizes every
/// path, so tests must compare against a symlink-free base (the system
/// temp root is a symlink on some platforms).
pub fn canonical_tempdir() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    (tmp, root)
}

/// Write `contents` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Minimal SVG for tests that never rasterize for real.
pub fn sample_svg() -> &'static str {
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#
}

/// Config processing `patterns` into `output_dir`, caching disabled.
pub fn run_config(patterns: &[&str], output_dir: &Path) -> RunConfig {
    RunConfig {
        input: patterns.iter().map(|p| p.to_string()).collect(),
        output_dir: output_dir.to_path_buf(),
        ..RunConfig::default()
    }
}

/// `{{filename}}` rendered to PNG at native size.
pub fn png_format() -> OutputFormat {
    OutputFormat {
        filename: "{{filename}}".into(),
        format: "png".into(),
        quality: None,
        input_viewbox: None,
        output_size: None,
        viewbox_mode: None,
        styles: None,
    }
}

/// `{{filename}}-2x` rendered to PNG at doubled size.
pub fn png_2x_format() -> OutputFormat {
    OutputFormat {
        filename: "{{filename}}-2x".into(),
        output_size: Some("2x".into()),
        ..png_format()
    }
}

/// `{{filename}}` rendered to JPEG.
pub fn jpg_format() -> OutputFormat {
    OutputFormat {
        filename: "{{filename}}".into(),
        format: "jpg".into(),
        quality: Some(80),
        ..png_format()
    }
}
