// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! archcontour CLI

use anyhow::{bail, Context, Result};
use archcontour::analysis::{analyze_scan, AreaStatistics, ClassificationSummary};
use archcontour::cli::Reporter;
use archcontour::config::{ViewConfig, DEFAULT_CONFIG_FILE};
use archcontour::{io, ContourView};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "archcontour")]
#[command(about = "Contour highlighting and collision checks for opposing surface scans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a composited frame of one or two scans
    Render {
        /// Primary (classified) STL scan
        primary: PathBuf,

        /// Opposing STL scan
        opposing: Option<PathBuf>,

        /// Output PNG file
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,

        /// Config file (defaults to archcontour.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of frames to render
        #[arg(long, default_value_t = 1)]
        frames: u64,
    },

    /// Classify a scan and print a summary
    Analyze {
        /// STL scan
        input: PathBuf,

        /// Config file (defaults to archcontour.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON instead of the colored report
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination file
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    file: &'a Path,
    triangles: usize,
    summary: ClassificationSummary,
    area_statistics: Option<AreaStatistics>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            primary,
            opposing,
            output,
            config,
            frames,
        } => render_command(&primary, opposing.as_deref(), &output, config.as_deref(), frames),
        Commands::Analyze {
            input,
            config,
            json,
        } => analyze_command(&input, config.as_deref(), json),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
        Commands::Version => {
            println!("archcontour v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "archcontour=debug" } else { "archcontour=info" };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive(level.parse().unwrap_or_default());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    let mut config = match path {
        Some(path) => ViewConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => return ViewConfig::load().context("Failed to load configuration"),
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn render_command(
    primary: &Path,
    opposing: Option<&Path>,
    output: &Path,
    config: Option<&Path>,
    frames: u64,
) -> Result<()> {
    if frames == 0 {
        bail!("--frames must be at least 1");
    }
    let config = load_config(config)?;
    let start = Instant::now();

    // Both scans load concurrently; either may fail independently
    let (primary_soup, opposing_soup) = rayon::join(
        || io::load_stl(primary),
        || opposing.map(|path| io::load_stl(path)).transpose(),
    );

    let mut view = ContourView::new(config).context("Failed to create view")?;
    match primary_soup {
        Ok(soup) => view.load_primary(soup),
        Err(e) => Reporter::report_warning(&format!("primary scan not loaded: {e}")),
    }
    match opposing_soup {
        Ok(Some(soup)) => view.load_opposing(soup),
        Ok(None) => {}
        Err(e) => Reporter::report_warning(&format!("opposing scan not loaded: {e}")),
    }

    let progress = (frames > 1).then(|| {
        let pb = ProgressBar::new(frames);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    });

    let mut frame = view.frame();
    for _ in 1..frames {
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
        frame = view.frame();
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    io::save_png(&frame, output)
        .with_context(|| format!("Failed to write frame to {}", output.display()))?;

    let collision = view.collision();
    let rendered = view.teardown();
    Reporter::report_render(
        &output.display().to_string(),
        rendered,
        collision,
        start.elapsed(),
    );
    Ok(())
}

fn analyze_command(input: &Path, config: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config)?;
    let start = Instant::now();

    let soup = io::load_stl(input)
        .with_context(|| format!("Failed to load scan: {}", input.display()))?;
    let analysis = analyze_scan(
        &soup,
        &config.classification.topology_builder(),
        &config.classification.classifier(),
    );
    let summary = analysis.classification.summary();
    let area = analysis.classification.area_statistics().copied();

    if json {
        let report = AnalysisReport {
            file: input,
            triangles: soup.triangle_count(),
            summary,
            area_statistics: area,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        Reporter::report_analysis(
            &input.display().to_string(),
            soup.triangle_count(),
            &summary,
            area.as_ref(),
            start.elapsed(),
        );
    }
    Ok(())
}

fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ViewConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Reporter::success(&format!("Wrote {}", path.display()));
    Ok(())
}
