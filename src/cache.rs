//! Modification-time cache for incremental runs.
//!
//! Optimizing and rasterizing is the slow part of a run: every SVG costs an
//! optimizer pass plus one renderer invocation per output format. This
//! module lets the resolver drop inputs whose files haven't changed since
//! the last successful run.
//!
//! # Design
//!
//! The cache is an mtime index: a map from absolute source path to the
//! file's modification time in epoch milliseconds. A file is processed when
//! its current mtime differs from the recorded one (or it has no entry).
//! Checking a file also records its current mtime, so the updated index can
//! be persisted after the run. Mutation goes through `&mut self`; callers
//! check files one at a time, never concurrently.
//!
//! ## Keying by configuration
//!
//! Outputs depend on the optimizer options and the output-format list, so
//! an index is only valid for the configuration that produced it. Each
//! configuration gets its own index file, named by a SHA-256 fingerprint of
//! the combined options: `<cache_dir>/<fingerprint>.json`. Changing any
//! option switches to a different (initially empty) index, which forces a
//! full rebuild without invalidating caches for other configurations.
//!
//! ## Persistence
//!
//! The index is saved only after a fully successful run. A failed run
//! leaves the previous index in place, so files whose outputs never landed
//! are still considered changed next time. A missing or unparsable index
//! file loads as empty (full rebuild), never as an error.

use crate::config::OutputFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// On-disk mtime index for one configuration fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheIndex {
    files: BTreeMap<PathBuf, u64>,
}

impl CacheIndex {
    /// Create an empty index (first run, or caching disabled upstream).
    pub fn empty() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Load the index for `fingerprint` from `cache_dir`. Returns an empty
    /// index if the file doesn't exist or can't be parsed.
    pub fn load(cache_dir: &Path, fingerprint: &str) -> Self {
        let path = index_path(cache_dir, fingerprint);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        serde_json::from_str(&content).unwrap_or_else(|_| Self::empty())
    }

    /// Save the index for `fingerprint` under `cache_dir`, creating the
    /// directory if needed.
    pub fn save(&self, cache_dir: &Path, fingerprint: &str) -> io::Result<()> {
        fs::create_dir_all(cache_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(index_path(cache_dir, fingerprint), json)
    }

    /// Report whether `path` changed since its recorded mtime, and record
    /// the current mtime either way.
    ///
    /// A file with no entry counts as changed. Failure to stat the file is
    /// an error; inputs are expected to exist at resolution time.
    pub fn check_and_update(&mut self, path: &Path) -> io::Result<bool> {
        let mtime = mtime_millis(path)?;
        let changed = self.files.get(path) != Some(&mtime);
        self.files.insert(path.to_path_buf(), mtime);
        Ok(changed)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Resolve the index file path for a configuration fingerprint.
pub fn index_path(cache_dir: &Path, fingerprint: &str) -> PathBuf {
    cache_dir.join(format!("{fingerprint}.json"))
}

/// Modification time of `path` in milliseconds since the epoch.
fn mtime_millis(path: &Path) -> io::Result<u64> {
    let modified = fs::metadata(path)?.modified()?;
    // Files dated before the epoch map to 0.
    let millis = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Ok(millis)
}

/// SHA-256 fingerprint of everything that shapes an output: the optimizer
/// options and the full output-format list, in order.
///
/// Every field is hashed with a type tag and length prefix so distinct
/// configurations cannot collide by concatenation, and `None` hashes
/// differently from `Some("")`.
pub fn fingerprint(optimizer_options: &serde_json::Value, formats: &[OutputFormat]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"optimizer\0");
    hash_json(&mut hasher, optimizer_options);
    hasher.update(b"formats\0");
    hasher.update((formats.len() as u64).to_le_bytes());
    for spec in formats {
        hash_str(&mut hasher, &spec.filename);
        hash_str(&mut hasher, &spec.format);
        match spec.quality {
            Some(quality) => {
                hasher.update(b"\x01");
                hasher.update(quality.to_le_bytes());
            }
            None => hasher.update(b"\x00"),
        }
        hash_opt_str(&mut hasher, spec.input_viewbox.as_deref());
        hash_opt_str(&mut hasher, spec.output_size.as_deref());
        hash_opt_str(&mut hasher, spec.viewbox_mode.as_deref());
        match &spec.styles {
            Some(styles) => {
                hasher.update(b"\x01");
                hash_json(&mut hasher, styles);
            }
            None => hasher.update(b"\x00"),
        }
    }
    format!("{:x}", hasher.finalize())
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_opt_str(hasher: &mut Sha256, s: Option<&str>) {
    match s {
        Some(s) => {
            hasher.update(b"\x01");
            hash_str(hasher, s);
        }
        None => hasher.update(b"\x00"),
    }
}

/// Feed a JSON value into the hasher, type-tagged. Object keys are hashed
/// in sorted order so the result is independent of map iteration order.
fn hash_json(hasher: &mut Sha256, value: &serde_json::Value) {
    use serde_json::Value;
    match value {
        Value::Null => hasher.update(b"n"),
        Value::Bool(b) => {
            hasher.update(b"b");
            hasher.update([*b as u8]);
        }
        Value::Number(n) => {
            hasher.update(b"d");
            hash_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update(b"s");
            hash_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update(b"a");
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                hash_json(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.update(b"o");
            hasher.update((map.len() as u64).to_le_bytes());
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                hash_str(hasher, key);
                hash_json(hasher, &map[key.as_str()]);
            }
        }
    }
}
