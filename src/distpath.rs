//! Output path computation.
//!
//! The output tree mirrors the source layout below the working directory:
//! `<wd>/assets/logo.svg` lands at `<dist>/assets/logo.svg`. A source that
//! lives outside the working directory keeps its own directory structure
//! with the root stripped, so distinct sources still map to distinct
//! outputs.

use std::path::{Component, Path, PathBuf};

/// Directory of `src` relative to `working_dir`.
///
/// For sources not under `working_dir`, every normal component of the
/// source's directory is kept and the root (or drive prefix) is dropped.
pub fn dist_rel_dir(src: &Path, working_dir: &Path) -> PathBuf {
    let parent = src.parent().unwrap_or(Path::new(""));
    match parent.strip_prefix(working_dir) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => parent
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .collect(),
    }
}

/// Where `src` lands in the output tree.
pub fn dist_path(src: &Path, working_dir: &Path, dist_dir: &Path) -> PathBuf {
    let name = src.file_name().unwrap_or_default();
    dist_dir.join(dist_rel_dir(src, working_dir)).join(name)
}
