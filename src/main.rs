use clap::{Parser, Subcommand};
use rastermill::{config, pipeline, report};
use std::path::{Path, PathBuf};

/// Shared flags for commands that consult the mtime cache.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Ignore the cache — process every matched file
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "rastermill")]
#[command(about = "Rasterize SVG assets into optimized output variants")]
#[command(long_about = "\
Rasterize SVG assets into optimized output variants

Point rastermill at a set of glob patterns and it optimizes every matched
SVG, renders it to each configured raster variant (sizes, qualities, extra
CSS), compresses PNGs, and lays the results out in an output directory that
mirrors your source tree. JPEG and GIF files are copied through unchanged.

A config file drives everything:

  input = [\"assets/**/*.svg\", \"assets/**/*.png\"]
  output_dir = \"dist\"

  [[output_format]]
  filename = \"{{filename}}\"
  format = \"png\"

  [[output_format]]
  filename = \"{{filename}}-2x\"
  format = \"png\"
  output_size = \"2x\"

With cache_dir set, repeat runs skip files whose modification time hasn't
changed. Requires svgo, pngquant, and svgexport on PATH.

Run 'rastermill gen-config' to generate a documented rastermill.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "rastermill.toml", global = true)]
    config: PathBuf,

    /// Directory that input patterns and relative paths resolve against
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline: resolve → stage → rasterize → copy
    Build(CacheArgs),
    /// List the files a build would process, without writing anything
    Check(CacheArgs),
    /// Print a stock rastermill.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let working_dir = match &cli.cwd {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    match &cli.command {
        Command::Build(cache_args) => {
            let config = load_cli_config(&cli, &working_dir, cache_args)?;
            init_thread_pool(&config.processing);
            println!("==> Rasterizing into {}", config.output_dir.display());
            let summary = pipeline::run(&config, &working_dir)?;
            if config.debug {
                report::print_outputs(&summary.outputs, &working_dir.canonicalize()?);
            }
            println!("==> {}", summary);
        }
        Command::Check(cache_args) => {
            let config = load_cli_config(&cli, &working_dir, cache_args)?;
            let base = working_dir.canonicalize()?;
            let plan = pipeline::plan(&config, &base)?;
            report::print_plan(&plan, &base);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file relative to the working directory and apply CLI
/// overrides.
fn load_cli_config(
    cli: &Cli,
    working_dir: &Path,
    cache_args: &CacheArgs,
) -> Result<config::RunConfig, config::ConfigError> {
    let path = if cli.config.is_absolute() {
        cli.config.clone()
    } else {
        working_dir.join(&cli.config)
    };
    let mut config = config::load_config(&path)?;
    if cache_args.no_cache {
        config.cache_dir = None;
    }
    Ok(config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
