//! End-to-end tests against the real svgo, pngquant, and svgexport tools.
//!
//! Run with: `cargo test --test shell_tools -- --ignored`
//!
//! Requires svgo, pngquant, and svgexport on PATH.

use rastermill::config::{OutputFormat, RunConfig};
use rastermill::pipeline;
use rastermill::tools::{ShellBackend, ToolBackend};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <!-- editor scaffolding, optimized away -->
  <rect x="8" y="8" width="48" height="48" fill="#d22"/>
</svg>
"##;

/// A valid 4x4 RGBA checkerboard PNG.
const SAMPLE_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x04,
    0x08, 0x06, 0x00, 0x00, 0x00, 0xA9, 0xF1, 0x9E, 0x7E, 0x00, 0x00, 0x00,
    0x1B, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xB8, 0xA3, 0xA1, 0xF1,
    0x5F, 0x43, 0xE3, 0xCE, 0x7F, 0x18, 0xCD, 0x80, 0xCC, 0x01, 0xD1, 0x0C,
    0x04, 0x55, 0x00, 0x00, 0x8D, 0x58, 0x22, 0xB1, 0x80, 0xF3, 0xAD, 0x2E,
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

fn write_file(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

fn png_format(filename: &str, output_size: Option<&str>) -> OutputFormat {
    OutputFormat {
        filename: filename.into(),
        format: "png".into(),
        quality: None,
        input_viewbox: None,
        output_size: output_size.map(Into::into),
        viewbox_mode: None,
        styles: None,
    }
}

fn backend() -> ShellBackend {
    ShellBackend::new(&serde_json::Value::Null).unwrap()
}

/// Width from the IHDR chunk, which always directly follows the signature.
fn png_width(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(bytes[16..20].try_into().unwrap())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn optimizer_strips_comments() {
    let optimized = backend().optimize_svg(SAMPLE_SVG).unwrap();
    assert!(optimized.contains("<svg"), "{optimized}");
    assert!(!optimized.contains("scaffolding"), "{optimized}");
    assert!(optimized.len() < SAMPLE_SVG.len());
}

#[test]
#[ignore]
fn compressor_rewrites_the_png() {
    let tmp = TempDir::new().unwrap();
    let input = write_file(tmp.path(), "in.png", SAMPLE_PNG);
    let output = tmp.path().join("out.png");

    backend().compress_png(&input, &output).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(PNG_MAGIC));
    assert_eq!(png_width(&bytes), 4);
}

#[test]
#[ignore]
fn output_size_scales_the_render() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    write_file(&root, "logo.svg", SAMPLE_SVG.as_bytes());

    let config = RunConfig {
        input: vec!["*.svg".into()],
        output_dir: root.join("dist"),
        output_formats: vec![
            png_format("{{filename}}", None),
            png_format("{{filename}}-2x", Some("2x")),
        ],
        ..RunConfig::default()
    };

    pipeline::run(&config, &root).unwrap();

    let one = std::fs::read(root.join("dist/logo.png")).unwrap();
    let two = std::fs::read(root.join("dist/logo-2x.png")).unwrap();
    assert_eq!(png_width(&one), 64);
    assert_eq!(png_width(&two), 128);
}

#[test]
#[ignore]
fn full_build_renders_and_copies() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    write_file(&root, "assets/logo.svg", SAMPLE_SVG.as_bytes());
    write_file(&root, "assets/icons/chat.png", SAMPLE_PNG);
    write_file(&root, "assets/photo.jpg", b"jpeg bytes");

    let config = RunConfig {
        input: vec!["assets/**/*".into()],
        output_dir: root.join("dist"),
        output_formats: vec![png_format("{{filename}}", None)],
        ..RunConfig::default()
    };

    let summary = pipeline::run(&config, &root).unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.outputs.len(), 3);
    let rendered = std::fs::read(root.join("dist/assets/logo.png")).unwrap();
    assert!(rendered.starts_with(PNG_MAGIC));
    let compressed = std::fs::read(root.join("dist/assets/icons/chat.png")).unwrap();
    assert!(compressed.starts_with(PNG_MAGIC));
    // JPEGs pass through byte for byte.
    assert_eq!(
        std::fs::read(root.join("dist/assets/photo.jpg")).unwrap(),
        b"jpeg bytes"
    );
}

#[test]
#[ignore]
fn optimizer_config_is_honored() {
    // js2svg.pretty makes the output larger, proving the config file was
    // read rather than ignored.
    let pretty = ShellBackend::new(&serde_json::json!({"js2svg": {"pretty": true}})).unwrap();
    let compact = backend();

    let pretty_svg = pretty.optimize_svg(SAMPLE_SVG).unwrap();
    let compact_svg = compact.optimize_svg(SAMPLE_SVG).unwrap();
    assert!(pretty_svg.len() > compact_svg.len());
}
