//! # Rastermill
//!
//! A batch rasterizer for SVG assets. Point it at a set of glob patterns
//! and it optimizes every matched SVG, renders it to each configured
//! raster variant, compresses PNGs, and lays the results out in an output
//! directory that mirrors the source tree. JPEG and GIF inputs are copied
//! through unchanged.
//!
//! # Architecture: Staged Pipeline
//!
//! A run moves every input through fixed phases, working in a scratch
//! directory until the final copy:
//!
//! ```text
//! 1. Resolve    patterns   →  input list       (glob, dedup, cache filter)
//! 2. Stage      input      →  scratch artifact (optimize / compress / passthrough)
//! 3. Process    staged SVG →  raster variants  (render, re-compress PNGs)
//!               artifacts  →  dist/            (copy)
//! 4. Cleanup    scratch directory removed      (kept with debug = true)
//! ```
//!
//! Every file reaches the output directory by copying a finished scratch
//! artifact, so `dist/` never holds an in-progress optimization. There is
//! no transactional guarantee beyond that: a failed run can leave a
//! partial set of outputs. Staging and processing fan out across a thread
//! pool; the first failure aborts the run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`resolve`] | Glob expansion, deduplication, classification, cache filtering |
//! | [`stage`] | Per-kind staging: SVG optimization, PNG compression, passthrough |
//! | [`rasterize`] | Renderer request planning and PNG re-compression of variants |
//! | [`pipeline`] | Run lifecycle, parallel fan-out, cache persistence |
//! | [`cache`] | Config-fingerprinted mtime index for incremental runs |
//! | [`distpath`] | Source path → output path mapping |
//! | [`tools`] | External tool abstraction (`ToolBackend`) and the shell implementation |
//! | [`config`] | `rastermill.toml` loading and validation |
//! | [`types`] | Types shared between stages (`FileKind`, `StagedFile`, ...) |
//! | [`report`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## External Tools Behind One Trait
//!
//! The optimizer (svgo), the PNG compressor (pngquant), and the renderer
//! (svgexport) are mature tools with no direct Rust equivalent covering
//! the same config surface, so rastermill drives them as child processes.
//! All three sit behind [`tools::ToolBackend`], which keeps every unit
//! test runnable on a machine with none of them installed and confines
//! process plumbing to one module.
//!
//! ## Mtime Cache, Fingerprinted by Config
//!
//! Incremental runs skip files whose modification time hasn't changed.
//! Output bytes depend on the optimizer options and output-format list,
//! so each configuration gets its own index file named by a SHA-256
//! fingerprint of those options; editing the config never serves stale
//! outputs from a previous configuration. See [`cache`].
//!
//! ## Batch Rendering
//!
//! The renderer is a Node process with a noticeable startup cost. All
//! variants of one SVG are rendered in a single invocation via a JSON
//! datafile instead of one process per output file.

pub mod cache;
pub mod config;
pub mod distpath;
pub mod pipeline;
pub mod rasterize;
pub mod report;
pub mod resolve;
pub mod stage;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
