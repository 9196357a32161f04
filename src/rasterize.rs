//! Rasterization: fan one staged SVG out to its configured output formats.
//!
//! Each staged SVG becomes one renderer invocation covering every
//! `[[output_format]]` block. Rendered PNGs take a second trip through the
//! PNG compressor; other formats are used as rendered. Variants land in
//! the scratch dir next to the staged SVG and are copied out by the
//! pipeline afterwards.

use crate::config::{FILENAME_PLACEHOLDER, OutputFormat};
use crate::distpath;
use crate::report;
use crate::stage::StageError;
use crate::tools::ToolBackend;
use crate::types::{RasterRequest, RasterVariant, RunContext, StagedFile};
use std::fs;
use std::path::{Path, PathBuf};

/// Build the renderer work list for one staged SVG: one request per
/// output format, named from the format's filename template.
pub fn plan_requests(
    staged: &StagedFile,
    formats: &[OutputFormat],
    ctx: &RunContext,
) -> Result<Vec<RasterRequest>, StageError> {
    let stem = staged.src.file_stem().unwrap_or_default().to_string_lossy();
    let rel_dir = distpath::dist_rel_dir(&staged.src, &ctx.working_dir);
    formats
        .iter()
        .map(|spec| {
            let file_name = format!(
                "{}.{}",
                spec.filename.replace(FILENAME_PLACEHOLDER, &stem),
                spec.format
            );
            Ok(RasterRequest {
                input: staged.staged.clone(),
                output: ctx.temp_dir.join(&rel_dir).join(&file_name),
                dist: ctx.dist_dir.join(&rel_dir).join(&file_name),
                format: spec.format.clone(),
                options: render_options(spec)?,
            })
        })
        .collect()
}

/// The option string handed to the renderer next to the output path:
/// `format [quality%] [input viewbox] [output size] [mode] [css]`.
/// Absent options are omitted; the order is fixed.
fn render_options(spec: &OutputFormat) -> Result<String, StageError> {
    let mut parts = vec![spec.format.clone()];
    if let Some(quality) = spec.quality {
        parts.push(format!("{quality}%"));
    }
    if let Some(viewbox) = &spec.input_viewbox {
        parts.push(viewbox.clone());
    }
    if let Some(size) = &spec.output_size {
        parts.push(size.clone());
    }
    if let Some(mode) = &spec.viewbox_mode {
        parts.push(mode.clone());
    }
    if let Some(styles) = &spec.styles {
        parts.push(serde_json::to_string(styles)?);
    }
    Ok(parts.join(" "))
}

/// Render every variant of one staged SVG, re-compressing PNG variants.
pub fn rasterize_staged(
    backend: &impl ToolBackend,
    staged: &StagedFile,
    formats: &[OutputFormat],
    ctx: &RunContext,
) -> Result<Vec<RasterVariant>, StageError> {
    let requests = plan_requests(staged, formats, ctx)?;
    for request in &requests {
        if let Some(parent) = request.output.parent() {
            fs::create_dir_all(parent)?;
        }
    }
    backend.render(&requests)?;

    let mut variants = Vec::with_capacity(requests.len());
    for request in requests {
        let variant = if request.format.eq_ignore_ascii_case("png") {
            let compressed = compressed_sibling(&request.output);
            backend.compress_png(&request.output, &compressed)?;
            RasterVariant {
                staged: compressed,
                dist: request.dist,
                format: request.format,
            }
        } else {
            RasterVariant {
                staged: request.output,
                dist: request.dist,
                format: request.format,
            }
        };
        if ctx.debug {
            println!("{}", report::format_rendered(&variant));
        }
        variants.push(variant);
    }
    Ok(variants)
}

/// `foo-2x.png` becomes `foo-2x.optimized.png`, next to the original.
fn compressed_sibling(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = path.extension().unwrap_or_default().to_string_lossy();
    path.with_file_name(format!("{stem}.optimized.{ext}"))
}
