//! Run orchestration.
//!
//! A run moves through fixed phases:
//!
//! ```text
//! init      validate config, canonicalize dirs, clean/create output dir,
//!           create scratch dir, load the cache index for this fingerprint
//! resolve   expand patterns, dedup, classify, drop unchanged files
//! stage     optimize/compress/passthrough every input        (parallel)
//! process   rasterize staged SVGs, copy everything to dist   (parallel)
//! cleanup   remove the scratch dir (kept when debug = true)
//! done      persist the cache index
//! ```
//!
//! Cleanup runs on success and failure alike. The cache index is persisted
//! only after a fully successful run; a failed run leaves the previous
//! index untouched so nothing gets marked fresh without its outputs.

use crate::cache::{self, CacheIndex};
use crate::config::{ConfigError, RunConfig};
use crate::rasterize;
use crate::resolve::{self, ResolveError, ResolvedInput};
use crate::stage::{self, StageError};
use crate::tools::{ShellBackend, ToolBackend, ToolError};
use crate::types::{FileKind, RunContext, StagedFile};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input resolution failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("processing failed: {0}")]
    Stage(#[from] StageError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files written under the output directory, in input order.
    pub outputs: Vec<PathBuf>,
    /// Inputs staged and processed this run.
    pub processed: usize,
    /// Matched files skipped as unchanged since the previous run.
    pub unchanged: usize,
    /// Matched files skipped for lack of a recognized extension.
    pub ignored: usize,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "wrote {} files from {} inputs ({} unchanged) in {:.2}s",
                self.outputs.len(),
                self.processed,
                self.unchanged,
                self.elapsed.as_secs_f64()
            )
        } else {
            write!(
                f,
                "wrote {} files from {} inputs in {:.2}s",
                self.outputs.len(),
                self.processed,
                self.elapsed.as_secs_f64()
            )
        }
    }
}

/// Dry-run result for the `check` command.
#[derive(Debug)]
pub struct Plan {
    pub inputs: Vec<ResolvedInput>,
    pub unchanged: usize,
    pub ignored: usize,
    pub fingerprint: String,
}

/// Run the full pipeline with the shell backend.
pub fn run(config: &RunConfig, working_dir: &Path) -> Result<RunSummary, RunError> {
    let backend = ShellBackend::new(&config.svg_optimizer)?;
    run_with_backend(&backend, config, working_dir)
}

/// Run the full pipeline with any backend.
///
/// The config is validated first: the CLI validates at load time, but a
/// caller constructing [`RunConfig`] directly bypasses that.
pub fn run_with_backend(
    backend: &impl ToolBackend,
    config: &RunConfig,
    working_dir: &Path,
) -> Result<RunSummary, RunError> {
    config.validate()?;
    let started = Instant::now();
    let working_dir = working_dir.canonicalize()?;
    let dist_dir = absolute(&config.output_dir, &working_dir);

    if config.clean_output_dir && dist_dir.exists() {
        fs::remove_dir_all(&dist_dir)?;
    }
    fs::create_dir_all(&dist_dir)?;

    let scratch = tempfile::Builder::new().prefix("rastermill-").tempdir()?;
    let ctx = RunContext {
        working_dir,
        dist_dir,
        temp_dir: scratch.path().to_path_buf(),
        debug: config.debug,
    };
    if config.debug {
        println!("    scratch dir {}", ctx.temp_dir.display());
        println!("    output dir {}", ctx.dist_dir.display());
    }

    let fingerprint = cache::fingerprint(&config.svg_optimizer, &config.output_formats);
    let cache_dir = config
        .cache_dir
        .as_ref()
        .map(|dir| absolute(dir, &ctx.working_dir));
    let mut index = cache_dir
        .as_ref()
        .map(|dir| CacheIndex::load(dir, &fingerprint));

    let outcome = run_stages(backend, config, &ctx, index.as_mut());

    // Scratch handling is identical on success and failure, except debug
    // runs keep the directory for inspection.
    let cleanup = if config.debug {
        println!("    keeping scratch dir {}", scratch.keep().display());
        Ok(())
    } else {
        scratch.close()
    };

    let mut summary = outcome?;
    cleanup?;

    if let (Some(dir), Some(index)) = (&cache_dir, &index) {
        index.save(dir, &fingerprint)?;
    }

    summary.elapsed = started.elapsed();
    Ok(summary)
}

/// Resolve inputs without staging or writing anything. The cache index is
/// consulted in memory only; a dry run never persists it.
pub fn plan(config: &RunConfig, working_dir: &Path) -> Result<Plan, RunError> {
    let working_dir = working_dir.canonicalize()?;
    let fingerprint = cache::fingerprint(&config.svg_optimizer, &config.output_formats);
    let mut index = config
        .cache_dir
        .as_ref()
        .map(|dir| CacheIndex::load(&absolute(dir, &working_dir), &fingerprint));

    let resolution = resolve::resolve_inputs(&config.input, &working_dir, index.as_mut())?;
    Ok(Plan {
        inputs: resolution.inputs,
        unchanged: resolution.unchanged,
        ignored: resolution.ignored,
        fingerprint,
    })
}

fn run_stages(
    backend: &impl ToolBackend,
    config: &RunConfig,
    ctx: &RunContext,
    cache: Option<&mut CacheIndex>,
) -> Result<RunSummary, RunError> {
    let resolution = resolve::resolve_inputs(&config.input, &ctx.working_dir, cache)?;
    let staged = stage::stage_inputs(backend, &resolution.inputs, ctx)?;
    let outputs = process_staged(backend, config, &staged, ctx)?;
    Ok(RunSummary {
        outputs,
        processed: resolution.inputs.len(),
        unchanged: resolution.unchanged,
        ignored: resolution.ignored,
        elapsed: Duration::ZERO,
    })
}

/// Copy every staged artifact to its destination; staged SVGs fan out to
/// their rendered variants instead of being copied themselves.
fn process_staged(
    backend: &impl ToolBackend,
    config: &RunConfig,
    staged: &[StagedFile],
    ctx: &RunContext,
) -> Result<Vec<PathBuf>, RunError> {
    let nested: Vec<Vec<PathBuf>> = staged
        .par_iter()
        .map(|file| -> Result<Vec<PathBuf>, RunError> {
            match file.kind {
                FileKind::Svg => {
                    let variants =
                        rasterize::rasterize_staged(backend, file, &config.output_formats, ctx)?;
                    let mut written = Vec::with_capacity(variants.len());
                    for variant in &variants {
                        written.push(copy_to_dist(&variant.staged, &variant.dist)?);
                    }
                    Ok(written)
                }
                _ => Ok(vec![copy_to_dist(&file.staged, &file.dist)?]),
            }
        })
        .collect::<Result<_, _>>()?;
    Ok(nested.into_iter().flatten().collect())
}

/// Copy a staged artifact to its destination, creating parent directories.
fn copy_to_dist(staged: &Path, dist: &Path) -> io::Result<PathBuf> {
    if let Some(parent) = dist.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(staged, dist)?;
    Ok(dist.to_path_buf())
}

fn absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
