//! Staging: produce an optimized or passthrough artifact for every
//! resolved input.
//!
//! Dispatch is by [`FileKind`]:
//!
//! | kind | staged artifact                                  |
//! |------|--------------------------------------------------|
//! | svg  | optimizer output written to the scratch dir      |
//! | png  | compressor output written to the scratch dir     |
//! | jpg  | the source itself (no work)                      |
//! | gif  | the source itself (no work)                      |
//!
//! Scratch artifacts mirror the source's output-relative directory, so two
//! same-named files from different directories never collide. Inputs fan
//! out across the thread pool; the first failure aborts the run.

use crate::distpath;
use crate::report;
use crate::resolve::ResolvedInput;
use crate::tools::{ToolBackend, ToolError};
use crate::types::{FileKind, RunContext, StagedFile};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stage every resolved input, in parallel. The result has exactly one
/// entry per input, in input order.
pub fn stage_inputs(
    backend: &impl ToolBackend,
    inputs: &[ResolvedInput],
    ctx: &RunContext,
) -> Result<Vec<StagedFile>, StageError> {
    inputs
        .par_iter()
        .map(|input| stage_one(backend, input, ctx))
        .collect()
}

fn stage_one(
    backend: &impl ToolBackend,
    input: &ResolvedInput,
    ctx: &RunContext,
) -> Result<StagedFile, StageError> {
    let staged = match input.kind {
        FileKind::Svg => {
            let svg = fs::read_to_string(&input.path)?;
            let optimized = backend.optimize_svg(&svg)?;
            let staged = scratch_path(input, ctx, "svg")?;
            fs::write(&staged, optimized)?;
            staged
        }
        FileKind::Png => {
            let staged = scratch_path(input, ctx, "png")?;
            backend.compress_png(&input.path, &staged)?;
            staged
        }
        // JPEG and GIF pass through untouched.
        FileKind::Jpeg | FileKind::Gif => input.path.clone(),
    };
    let file = StagedFile {
        src: input.path.clone(),
        staged,
        dist: distpath::dist_path(&input.path, &ctx.working_dir, &ctx.dist_dir),
        kind: input.kind,
    };
    if ctx.debug {
        println!("{}", report::format_staged(&file));
    }
    Ok(file)
}

/// Scratch path for the optimized copy of `input`, mirroring its
/// output-relative directory. Creates the directory.
fn scratch_path(input: &ResolvedInput, ctx: &RunContext, ext: &str) -> io::Result<PathBuf> {
    let dir = ctx
        .temp_dir
        .join(distpath::dist_rel_dir(&input.path, &ctx.working_dir));
    fs::create_dir_all(&dir)?;
    let stem = input.path.file_stem().unwrap_or_default().to_string_lossy();
    Ok(dir.join(format!("{stem}.optimized.{ext}")))
}
