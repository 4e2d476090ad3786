use std::path::PathBuf;
use std::time::Instant;
use clap::{Parser, ValueEnum};
use tracing::{info, warn, Level};

use fruit_count_lib::batch::{run_batch, BatchOptions};
use fruit_count_lib::config::Config;
use fruit_count_lib::errors::{FruitCountError, Result};
use fruit_count_lib::output::{write_results, OutputFormat};
use fruit_count_lib::pipeline::Detector;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "fruit_count - count colored fruit in photographs")]
struct Args {
    /// Path to data directory
    #[clap(short = 'p', long)]
    data_path: Option<String>,

    /// Path to output file
    #[clap(short, long)]
    output_file_path: Option<String>,

    /// Path to configuration file (built-in thresholds when omitted)
    #[clap(short, long)]
    config: Option<String>,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,

    /// Minimum region area for a region to count (overwrites config)
    #[clap(long)]
    min_area: Option<f64>,

    /// Process images one at a time
    #[clap(long)]
    sequential: bool,

    /// Save cleaned masks for every image and class into this directory
    #[clap(long)]
    debug_dir: Option<String>,

    /// Write the built-in configuration to this path and exit
    #[clap(long)]
    save_default_config: Option<String>,

    /// Log per-class details
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

/// Main function
fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &args.save_default_config {
        Config::default().save_to_file(path)?;
        info!(path = %path, "default configuration written");
        return Ok(());
    }

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with command-line arguments
    if let Some(data_path) = args.data_path.clone() {
        config.input_path = data_path;
    }

    if let Some(output) = args.output_file_path.clone() {
        config.output_path = output;
    }

    if let Some(min_area) = args.min_area {
        config.min_region_area = min_area;
    }

    if args.sequential {
        config.use_parallel = false;
    }

    // Validate configuration before touching any image
    let detector = Detector::from_config(&config)?;

    let input_path = PathBuf::from(&config.input_path);
    if !input_path.is_dir() {
        return Err(FruitCountError::InvalidPath(input_path));
    }

    // Start timing
    let start_time = Instant::now();

    let options = BatchOptions {
        parallel: config.use_parallel,
        debug_dir: args.debug_dir.as_ref().map(PathBuf::from),
    };
    let report = run_batch(&input_path, &config.extensions, &detector, &options)?;

    for skipped in &report.skipped {
        warn!(path = %skipped.path.display(), reason = %skipped.reason, "not included in output");
    }

    write_results(
        &report.results,
        &config.labels(),
        args.format.into(),
        &config.output_path,
    )?;

    // Report elapsed time
    let elapsed = start_time.elapsed();
    info!(
        images = report.results.len(),
        skipped = report.skipped.len(),
        output = %config.output_path,
        "processing completed in {:.2} seconds",
        elapsed.as_secs_f64()
    );

    Ok(())
}
