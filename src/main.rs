use clap::{Parser, Subcommand};
use log::info;
use photolift::imaging::{EncodeOptions, Quality, RustBackend};
use photolift::{config, decide, logging, promote, report, resolve, scan};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "photolift")]
#[command(about = "Promote staged product photos into production")]
#[command(long_about = "\
Promote staged product photos into production

Staging is a tree of per-item folders named by a 5-digit item code;
production is one flat directory of normalized images. photolift scans
both, keeps the newest staged copy of every logical image, promotes the
copies that are newer than (or missing from) production, and writes an
audit report.

Staging structure:

  staging/
  ├── 12345/                  # Item folder (code 12345)
  │   ├── 12345.jpg           # Primary photo
  │   └── 12345_1.jpg         # Variant photo 1
  ├── 12345-reshoot/          # Same code → reported as duplicate folder
  │   └── 12345.jpg           # Copies race on creation time
  └── 54321 blue sofa/        # Code prefix + free text is fine
      └── 54321.png

Production structure (flat, maintained by photolift):

  production/
  ├── 12345.jpg
  ├── 12345_1.jpg
  └── 54321.jpg

Individual failures (bad names, unreadable images, encode errors) are
logged and reported, never fatal. Run 'photolift gen-config' for a
documented photolift.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "photolift.toml", global = true)]
    config: PathBuf,

    /// Staging tree (overrides config)
    #[arg(long, global = true)]
    staging: Option<PathBuf>,

    /// Production directory (overrides config)
    #[arg(long, global = true)]
    production: Option<PathBuf>,

    /// Report output directory (overrides config)
    #[arg(long, global = true)]
    reports: Option<PathBuf>,

    /// Log output directory (overrides config)
    #[arg(long, global = true)]
    logs: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → resolve → decide → promote → report
    Run,
    /// Everything except promotion — decide and report, touch nothing
    Check,
    /// Print a stock photolift.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut run_config = config::load_config(&cli.config)?;
    if let Some(staging) = cli.staging {
        run_config.staging_root = staging;
    }
    if let Some(production) = cli.production {
        run_config.production_root = production;
    }
    if let Some(reports) = cli.reports {
        run_config.reports_dir = reports;
    }
    if let Some(logs) = cli.logs {
        run_config.logs_dir = logs;
    }

    let log_path = logging::init_logging(&run_config.logs_dir)?;
    info!("Starting; logging to {}", log_path.display());

    let promote_phase = matches!(cli.command, Command::Run);
    reconcile(&run_config, promote_phase)
}

/// Run the pipeline phases in order. `promote_phase` is false for a
/// dry run (`check`), which decides and reports without touching
/// production.
fn reconcile(
    run_config: &config::RunConfig,
    promote_phase: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = RustBackend::new();
    let options = EncodeOptions {
        quality: Quality::new(run_config.encoding.quality),
        resize_threshold: run_config.encoding.resize_threshold,
    };

    let phase = Instant::now();
    let mut staging = scan::scan_staging(&run_config.staging_root, &backend)?;
    info!(
        "Scanned {} staging folders ({} images) in {:.2}s",
        staging.folders.len(),
        staging.image_count(),
        phase.elapsed().as_secs_f32()
    );

    let phase = Instant::now();
    resolve::resolve_newest(&mut staging);
    info!(
        "Resolved newest staged copies in {:.2}s",
        phase.elapsed().as_secs_f32()
    );

    let phase = Instant::now();
    let production_images = scan::scan_production(&run_config.production_root, &backend)?;
    let existing = production_images.len();
    let production = decide::ProductionIndex::build(production_images);
    info!(
        "Scanned {} production images in {:.2}s",
        existing,
        phase.elapsed().as_secs_f32()
    );

    let phase = Instant::now();
    decide::decide_promotion(&mut staging, &production);
    info!(
        "Decided promotion eligibility in {:.2}s",
        phase.elapsed().as_secs_f32()
    );

    let promoted = if promote_phase {
        let phase = Instant::now();
        let promoted = promote::promote_all(
            &mut staging,
            &run_config.production_root,
            &backend,
            &options,
            &run_config.encoding.target_extension,
        );
        info!(
            "Promoted {} images in {:.2}s",
            promoted,
            phase.elapsed().as_secs_f32()
        );
        promoted
    } else {
        info!("Dry run: skipping promotion");
        0
    };

    info!(
        "Done. Found {} files in production, moved {} files to production.",
        existing, promoted
    );

    let run_report = report::build_report(&staging, promoted, existing);
    let csv_path = report::write_reports(
        &run_report,
        &run_config.reports_dir,
        &run_config.report_name,
    )?;
    info!("Report written to {}", csv_path.display());

    Ok(())
}
