//! Decline Indicators - regional decline criteria from statistics extracts
//!
//! A CLI tool that reads population, business and building-age extracts,
//! evaluates each decline criterion per region and exports the category
//! tables plus a cross-category summary as CSV and XLSX.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error, or a category/summary run failed

use anyhow::{Context, Result};
use chrono::Local;
use decline_indicators::analysis::Criteria;
use decline_indicators::cli::Args;
use decline_indicators::config::{Config, CONFIG_FILE};
use decline_indicators::ingest::{InputScanner, ScanConfig};
use decline_indicators::report::generate_markdown_table;
use decline_indicators::{Category, Pipeline, PipelineOutcome, Selector};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Decline Indicators v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .decline.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize output directory, formats and the decline run length.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run every requested category, then the summary. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let output_dir = PathBuf::from(&config.general.output_dir);
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let scanner = InputScanner::new(ScanConfig::from(&config.input));
    let mut pipeline = Pipeline::new(Criteria::from(&config.analysis));

    let requested: Vec<(Category, &Vec<PathBuf>)> = [
        (Category::Demographic, &args.population),
        (Category::Economic, &args.business),
        (Category::PhysicalStock, &args.buildings),
    ]
    .into_iter()
    .filter(|(_, paths)| !paths.is_empty())
    .collect();

    let stages = requested.len() + usize::from(args.has_all_categories());
    let progress = progress_bar(stages as u64, args.quiet);
    let mut failures = 0usize;

    for (category, paths) in requested {
        progress.set_message(format!("Analyzing {}", category));

        let outcome = match scanner.collect(paths) {
            Ok(files) => {
                info!("{}: {} input files", category, files.len());
                pipeline.run_paths(category, &files).await
            }
            Err(e) => PipelineOutcome::failed(format!(
                "Failed to collect {} inputs: {:#}",
                category, e
            )),
        };
        progress.inc(1);
        failures += usize::from(!outcome.success);
        report_outcome(&progress, category.into(), &outcome, &args, &config, &output_dir)?;
    }

    if args.has_all_categories() {
        progress.set_message("Merging summary");
        let outcome = pipeline.run(Selector::Summary, &[]);
        progress.inc(1);
        failures += usize::from(!outcome.success);
        report_outcome(&progress, Selector::Summary, &outcome, &args, &config, &output_dir)?;

        if let (true, Some(path)) = (outcome.success, args.map_json.as_ref()) {
            write_criteria_map(&pipeline, path)?;
        }
    } else {
        debug!("Summary skipped: not every category was supplied");
    }

    progress.finish_and_clear();

    if !args.quiet {
        println!(
            "\n📊 Done in {:.1}s. Output directory: {}",
            start_time.elapsed().as_secs_f64(),
            output_dir.display()
        );
    }

    if failures > 0 {
        warn!("{} run(s) failed", failures);
        return Ok(1);
    }
    Ok(0)
}

fn progress_bar(len: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Print the outcome and write its artifacts.
fn report_outcome(
    progress: &ProgressBar,
    selector: Selector,
    outcome: &PipelineOutcome,
    args: &Args,
    config: &Config,
    output_dir: &Path,
) -> Result<()> {
    if !outcome.success {
        error!("{} failed: {}", selector, outcome.message);
        progress.suspend(|| eprintln!("❌ {}: {}", selector, outcome.message));
        return Ok(());
    }

    let written = write_artifacts(output_dir, selector, outcome, config)?;

    progress.suspend(|| {
        if !args.quiet {
            println!("✅ {}", outcome.message);
            for path in &written {
                println!("   📄 {}", path.display());
            }
        }
        if args.preview {
            if let Some(ref preview) = outcome.preview {
                println!(
                    "\n{}",
                    generate_markdown_table(preview, config.export.preview_rows)
                );
            }
        }
    });

    Ok(())
}

/// Write the artifacts selected by the export format.
fn write_artifacts(
    output_dir: &Path,
    selector: Selector,
    outcome: &PipelineOutcome,
    config: &Config,
) -> Result<Vec<PathBuf>> {
    let stem = if config.export.timestamp_filenames {
        format!("{}_{}", selector.slug(), Local::now().format("%Y%m%d"))
    } else {
        selector.slug().to_string()
    };

    let mut written = Vec::new();
    let format = config.export.format;

    if let (true, Some(bytes)) = (format.includes_csv(), outcome.text_artifact.as_ref()) {
        let path = output_dir.join(format!("{}.csv", stem));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if let (true, Some(bytes)) = (format.includes_xlsx(), outcome.spreadsheet_artifact.as_ref()) {
        let path = output_dir.join(format!("{}.xlsx", stem));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

/// Write region code -> criteria met as JSON for map renderers.
fn write_criteria_map(pipeline: &Pipeline, path: &Path) -> Result<()> {
    let map = pipeline.criteria_map()?;
    let json = serde_json::to_string_pretty(&map)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote criteria map for {} regions to {}", map.len(), path.display());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
