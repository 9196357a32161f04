//! Production backend that shells out to the external tools.
//!
//! Tool contract:
//! - `svgo --input - --output -`, with `--config <file>` when optimizer
//!   options are configured; SVG text goes in on stdin, optimized SVG
//!   comes back on stdout.
//! - `pngquant <input> --force --output <output>`.
//! - `svgexport <datafile>`, where the datafile is a JSON array of
//!   `{"input": ..., "output": "<file> \"<options>\""}` entries. One
//!   invocation renders a whole request batch.

use super::backend::{ToolBackend, ToolError};
use crate::types::RasterRequest;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const SVGO: &str = "svgo";
const PNGQUANT: &str = "pngquant";
const SVGEXPORT: &str = "svgexport";

/// Drives svgo, pngquant, and svgexport as child processes.
pub struct ShellBackend {
    /// Optimizer options materialized as a config file once per run. The
    /// temp file lives exactly as long as the backend.
    svgo_config: Option<tempfile::NamedTempFile>,
}

impl ShellBackend {
    /// Create a backend. Non-null `optimizer_options` are written to a
    /// temp config file handed to the optimizer on every call.
    ///
    /// svgo only loads JS config modules, so the options are wrapped in
    /// `module.exports = ...`; JSON is a valid JS object literal.
    pub fn new(optimizer_options: &serde_json::Value) -> Result<Self, ToolError> {
        let svgo_config = match optimizer_options {
            serde_json::Value::Null => None,
            options => {
                let mut file = tempfile::Builder::new()
                    .prefix("rastermill-svgo-")
                    .suffix(".cjs")
                    .tempfile()?;
                write!(file, "module.exports = {options};")?;
                file.flush()?;
                Some(file)
            }
        };
        Ok(Self { svgo_config })
    }
}

impl ToolBackend for ShellBackend {
    fn optimize_svg(&self, svg: &str) -> Result<String, ToolError> {
        let mut command = Command::new(SVGO);
        command.args(["--input", "-", "--output", "-"]);
        if let Some(config) = &self.svgo_config {
            command.arg("--config").arg(config.path());
        }
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Launch { tool: SVGO, source })?;

        // Feed stdin from a second thread; the optimizer writes stdout
        // concurrently and both pipes block once full.
        let mut stdin = child.stdin.take().ok_or_else(|| ToolError::Failed {
            tool: SVGO,
            detail: "stdin unavailable".into(),
        })?;
        let bytes = svg.as_bytes().to_vec();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            stdin.write_all(&bytes)
        });

        let output = child.wait_with_output()?;
        let written = writer.join().map_err(|_| ToolError::Failed {
            tool: SVGO,
            detail: "stdin writer panicked".into(),
        })?;
        check_status(SVGO, &output)?;
        written?;
        String::from_utf8(output.stdout).map_err(|_| ToolError::BadOutput { tool: SVGO })
    }

    fn compress_png(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let result = Command::new(PNGQUANT)
            .arg(input)
            .arg("--force")
            .arg("--output")
            .arg(output)
            .output()
            .map_err(|source| ToolError::Launch {
                tool: PNGQUANT,
                source,
            })?;
        check_status(PNGQUANT, &result)
    }

    fn render(&self, requests: &[RasterRequest]) -> Result<(), ToolError> {
        if requests.is_empty() {
            return Ok(());
        }
        let mut entries = Vec::with_capacity(requests.len());
        for request in requests {
            let input = path_str(&request.input)?;
            let output = path_str(&request.output)?;
            entries.push(serde_json::json!({
                "input": input,
                "output": format!("{} \"{}\"", output, request.options),
            }));
        }
        let mut datafile = tempfile::Builder::new()
            .prefix("rastermill-render-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut datafile, &entries).map_err(std::io::Error::from)?;
        datafile.flush()?;

        let result = Command::new(SVGEXPORT)
            .arg(datafile.path())
            .output()
            .map_err(|source| ToolError::Launch {
                tool: SVGEXPORT,
                source,
            })?;
        check_status(SVGEXPORT, &result)
    }
}

fn check_status(tool: &'static str, output: &Output) -> Result<(), ToolError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(ToolError::Failed {
        tool,
        detail: format!("{} ({})", stderr.trim(), output.status),
    })
}

fn path_str(path: &Path) -> Result<&str, ToolError> {
    path.to_str().ok_or_else(|| ToolError::BadPath(path.to_path_buf()))
}
