//! Input resolution: glob expansion, deduplication, classification, and
//! cache filtering.
//!
//! Patterns expand in config order; matches within a pattern come back in
//! the glob walker's sorted order, so the resolved list is deterministic.
//! Directories and files with unrecognized extensions are dropped silently.
//! When a cache index is supplied, files whose mtime matches the index are
//! dropped too, and every surviving check records the current mtime.

use crate::cache::CacheIndex;
use crate::types::FileKind;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("invalid input pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("cannot expand pattern {0:?}: not valid UTF-8")]
    NonUtf8Pattern(PathBuf),
    #[error("glob walk error: {0}")]
    Walk(#[from] glob::GlobError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A classified input scheduled for staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    /// Canonical absolute path.
    pub path: PathBuf,
    pub kind: FileKind,
}

/// Outcome of input resolution.
#[derive(Debug)]
pub struct Resolution {
    pub inputs: Vec<ResolvedInput>,
    /// Matched files dropped because their mtime is unchanged in the cache.
    pub unchanged: usize,
    /// Matched files dropped for lack of a recognized extension.
    pub ignored: usize,
}

/// Expand `patterns` against `base_dir` into the list of files to process.
///
/// Relative patterns resolve against `base_dir`; absolute patterns are used
/// as-is. Matches are canonicalized, deduplicated in first-seen order, and
/// classified by extension. With a cache index, unchanged files are
/// filtered out last.
pub fn resolve_inputs(
    patterns: &[String],
    base_dir: &Path,
    cache: Option<&mut CacheIndex>,
) -> Result<Resolution, ResolveError> {
    let mut seen = HashSet::new();
    let mut inputs = Vec::new();
    let mut ignored = 0usize;

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            base_dir.join(pattern)
        };
        let Some(full_str) = full.to_str() else {
            return Err(ResolveError::NonUtf8Pattern(full));
        };
        let matches = glob::glob(full_str).map_err(|source| ResolveError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in matches {
            let path = entry?;
            if !path.is_file() {
                continue;
            }
            let path = path.canonicalize()?;
            if !seen.insert(path.clone()) {
                continue;
            }
            match FileKind::from_path(&path) {
                Some(kind) => inputs.push(ResolvedInput { path, kind }),
                None => ignored += 1,
            }
        }
    }

    let mut unchanged = 0usize;
    let inputs = match cache {
        Some(cache) => {
            let mut fresh = Vec::with_capacity(inputs.len());
            for input in inputs {
                if cache.check_and_update(&input.path)? {
                    fresh.push(input);
                } else {
                    unchanged += 1;
                }
            }
            fresh
        }
        None => inputs,
    };

    Ok(Resolution {
        inputs,
        unchanged,
        ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{canonical_tempdir, write_file};

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn expands_recursive_globs_and_classifies() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "assets/logo.svg", "<svg/>");
        write_file(&root, "assets/icons/home.svg", "<svg/>");
        write_file(&root, "assets/photo.jpg", "jpg");
        write_file(&root, "assets/readme.txt", "text");

        let resolution =
            resolve_inputs(&patterns(&["assets/**/*.svg", "assets/*.jpg"]), &root, None).unwrap();

        let kinds: Vec<FileKind> = resolution.inputs.iter().map(|i| i.kind).collect();
        assert_eq!(resolution.inputs.len(), 3);
        assert!(kinds.contains(&FileKind::Svg));
        assert!(kinds.contains(&FileKind::Jpeg));
        assert_eq!(resolution.ignored, 0);
        assert_eq!(resolution.unchanged, 0);
    }

    #[test]
    fn unrecognized_extensions_are_counted_not_resolved() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "a.svg", "<svg/>");
        write_file(&root, "b.webp", "bin");
        write_file(&root, "c.jpeg", "bin");

        let resolution = resolve_inputs(&patterns(&["*"]), &root, None).unwrap();
        assert_eq!(resolution.inputs.len(), 1);
        assert_eq!(resolution.ignored, 2);
    }

    #[test]
    fn overlapping_patterns_deduplicate() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "logo.svg", "<svg/>");

        let resolution =
            resolve_inputs(&patterns(&["*.svg", "logo.*", "**/*.svg"]), &root, None).unwrap();
        assert_eq!(resolution.inputs.len(), 1);
    }

    #[test]
    fn directories_never_resolve_even_with_input_extensions() {
        let (_tmp, root) = canonical_tempdir();
        std::fs::create_dir_all(root.join("fake.svg")).unwrap();
        write_file(&root, "real.svg", "<svg/>");

        let resolution = resolve_inputs(&patterns(&["*.svg"]), &root, None).unwrap();
        assert_eq!(resolution.inputs.len(), 1);
        assert!(resolution.inputs[0].path.ends_with("real.svg"));
    }

    #[test]
    fn resolved_paths_are_absolute() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "nested/logo.svg", "<svg/>");

        let resolution = resolve_inputs(&patterns(&["nested/*.svg"]), &root, None).unwrap();
        assert_eq!(resolution.inputs[0].path, root.join("nested/logo.svg"));
        assert!(resolution.inputs[0].path.is_absolute());
    }

    #[test]
    fn resolution_is_deterministic() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "b.svg", "<svg/>");
        write_file(&root, "a.svg", "<svg/>");
        write_file(&root, "c.png", "png");

        let pats = patterns(&["*.svg", "*.png"]);
        let first = resolve_inputs(&pats, &root, None).unwrap();
        let second = resolve_inputs(&pats, &root, None).unwrap();
        assert_eq!(first.inputs, second.inputs);
        // Pattern order outranks directory order.
        assert_eq!(first.inputs.last().unwrap().kind, FileKind::Png);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let (_tmp, root) = canonical_tempdir();
        let result = resolve_inputs(&patterns(&["a[**"]), &root, None);
        assert!(matches!(result, Err(ResolveError::Pattern { .. })));
    }

    #[test]
    fn cache_filters_unchanged_files() {
        let (_tmp, root) = canonical_tempdir();
        write_file(&root, "a.svg", "<svg/>");
        write_file(&root, "b.png", "png");

        let mut index = CacheIndex::empty();
        let pats = patterns(&["*"]);

        let first = resolve_inputs(&pats, &root, Some(&mut index)).unwrap();
        assert_eq!(first.inputs.len(), 2);
        assert_eq!(first.unchanged, 0);

        let second = resolve_inputs(&pats, &root, Some(&mut index)).unwrap();
        assert!(second.inputs.is_empty());
        assert_eq!(second.unchanged, 2);
    }

    #[test]
    fn cache_readmits_files_with_stale_entries() {
        let (_tmp, root) = canonical_tempdir();
        let file = write_file(&root, "a.svg", "<svg/>");

        let mut index = CacheIndex::empty();
        let pats = patterns(&["*.svg"]);
        resolve_inputs(&pats, &root, Some(&mut index)).unwrap();

        // Rewrite with a bumped mtime so the recorded entry goes stale.
        let later = std::time::SystemTime::now() + std::time::Duration::from_secs(5);
        fs_set_mtime(&file, later);

        let again = resolve_inputs(&pats, &root, Some(&mut index)).unwrap();
        assert_eq!(again.inputs.len(), 1);
    }

    // Set an mtime without pulling in a filesystem crate: File::set_modified
    // has been stable since 1.75.
    fn fs_set_mtime(path: &Path, to: std::time::SystemTime) {
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(to).unwrap();
    }
}
