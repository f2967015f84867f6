//! svgnorm CLI
//!
//! Usage:
//!   svgnorm [OPTIONS] [PATHS]...
//!
//! Options:
//!   -c, --config <FILE>   Configuration file (TOML format)
//!   --bbox <BOX>          Glyph bounding box XMIN,YMIN,XMAX,YMAX (one file only)
//!   --no-prefix-ids       Leave element ids untouched
//!   --keep-metadata       Keep <metadata> children of the root
//!   --no-accessibility    Do not add role/focusable/preserveAspectRatio
//!   -n, --dry-run         Normalize without writing files
//!   --stdout              Print the normalized document instead of writing it
//!   -v, --verbose         Debug logging
//!   -h, --help            Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use svgnorm::batch::{collect_svg_files, normalize_file, normalize_str, run_batch, BatchOptions};
use svgnorm::{BoundingBox, Config, IdPrefix, NormalizeOptions};

#[derive(Parser)]
#[command(name = "svgnorm")]
#[command(about = "Normalize SVG icons: viewBox, scalable size, prefixed ids, accessible defaults")]
struct Cli {
    /// SVG files or directories (defaults to the configured target_dir)
    paths: Vec<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Glyph bounding box used to derive a square viewBox (one file only)
    #[arg(long, value_name = "XMIN,YMIN,XMAX,YMAX", allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// Leave element ids and references untouched
    #[arg(long)]
    no_prefix_ids: bool,

    /// Keep <metadata> children of the root element
    #[arg(long)]
    keep_metadata: bool,

    /// Do not add role, focusable and preserveAspectRatio
    #[arg(long)]
    no_accessibility: bool,

    /// Normalize and report, but do not write files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Print the normalized document of a single file to stdout
    #[arg(long)]
    stdout: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags override whatever the configuration file set
    fn apply_flags(&self, mut options: NormalizeOptions) -> NormalizeOptions {
        if self.no_prefix_ids {
            options.prefix_ids = false;
        }
        if self.keep_metadata {
            options.strip_metadata = false;
        }
        if self.no_accessibility {
            options.accessibility = false;
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration
    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    let options = cli.apply_flags(config.normalize.clone());

    let paths = if cli.paths.is_empty() {
        match &config.target_dir {
            Some(dir) => vec![dir.clone()],
            None => {
                eprintln!("Error: no paths given and no target_dir configured");
                std::process::exit(1);
            }
        }
    } else {
        cli.paths.clone()
    };

    if cli.bbox.is_some() || cli.stdout {
        let [path] = paths.as_slice() else {
            eprintln!("Error: --bbox and --stdout take exactly one file");
            std::process::exit(1);
        };
        if !path.is_file() {
            eprintln!("Error: '{}' is not a file", path.display());
            std::process::exit(1);
        }
        if cli.stdout {
            print_normalized(path, cli.bbox.as_ref(), &options);
        } else {
            normalize_single(path, cli.bbox.as_ref(), &options, cli.dry_run);
        }
        return;
    }

    // Expand directories; a directory that cannot be listed counts as a failure
    let mut files = Vec::new();
    let mut listing_failed = false;
    for path in &paths {
        if path.is_dir() {
            match collect_svg_files(path) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    error!("{}", e);
                    listing_failed = true;
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    let batch_options = BatchOptions::new(options).with_dry_run(cli.dry_run);

    let report = run_batch(&files, &batch_options);
    println!("{}", report.summary());

    if report.has_failures() || listing_failed {
        std::process::exit(1);
    }
}

fn normalize_single(
    path: &Path,
    bbox: Option<&BoundingBox>,
    options: &NormalizeOptions,
    dry_run: bool,
) {
    match normalize_file(path, bbox, options, dry_run) {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!("Warning: {}: {}", path.display(), warning);
            }
            println!("Normalized {} (viewBox: {}).", path.display(), report.viewbox);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_normalized(path: &Path, bbox: Option<&BoundingBox>, options: &NormalizeOptions) {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };

    match normalize_str(&source, &IdPrefix::from_path(path), bbox, options) {
        Ok((svg, report)) => {
            for warning in &report.warnings {
                eprintln!("Warning: {}", warning);
            }
            println!("{}", svg);
        }
        Err(e) => {
            eprintln!("{}", e.format(&source, &path.display().to_string()));
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
