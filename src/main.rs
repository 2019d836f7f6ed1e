//! Non-Cash Dashboard - Payment survey viewer and chart exporter

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use eframe::egui;
use noncash_dashboard::charts::StaticChartRenderer;
use noncash_dashboard::config::DashboardConfig;
use noncash_dashboard::data::{DataSource, DerivedTable, EmploymentStatus, UsageType};
use noncash_dashboard::gui::DashboardApp;
use noncash_dashboard::stats::{HomeSummary, OverviewSummary};
use noncash_dashboard::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "noncash-dashboard",
    about = "Explore the cash vs non-cash payment survey",
    version
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Survey spreadsheet (overrides the configured path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the desktop dashboard (default command)
    Gui,
    /// Render every chart as PNG and write summary.json
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Output directory
    #[arg(long)]
    out: PathBuf,
    /// Overview usage selection
    #[arg(long, value_parser = parse_usage, default_value = "Cash")]
    usage: UsageType,
    /// Overview employment selection
    #[arg(long, value_parser = parse_employment, default_value = "Employed")]
    employment: EmploymentStatus,
    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn parse_usage(value: &str) -> Result<UsageType, String> {
    UsageType::from_label(value).ok_or_else(|| {
        format!(
            "expected one of {}",
            UsageType::ALL.map(|u| u.label()).join(", ")
        )
    })
}

fn parse_employment(value: &str) -> Result<EmploymentStatus, String> {
    EmploymentStatus::from_label(value).ok_or_else(|| {
        format!(
            "expected one of {}",
            EmploymentStatus::ALL.map(|e| e.label()).join(", ")
        )
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        DashboardConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }
    telemetry::init(&config.log_level)?;

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => run_gui(config),
        Command::Export(args) => run_export(&config, args),
    }
}

fn run_export(config: &DashboardConfig, args: ExportArgs) -> Result<()> {
    let responses = DataSource::load(&config.data_path)
        .with_context(|| format!("loading survey {}", config.data_path.display()))?;
    let table = DerivedTable::from_responses(&responses).context("deriving respondent fields")?;

    let home = HomeSummary::build(&table, config.survey_year, &config.coverage)
        .context("building home summary")?;
    let overview = OverviewSummary::build(&table, args.usage, args.employment)
        .context("building overview summary")?;

    let width = args.width.unwrap_or(config.export.width);
    let height = args.height.unwrap_or(config.export.height);
    let charts = StaticChartRenderer::export_all(&home, &overview, &args.out, width, height)
        .context("rendering charts")?;
    let summary = StaticChartRenderer::write_summary(&home, &overview, &args.out)
        .context("writing summary")?;

    info!(
        charts = charts.len(),
        summary = %summary.display(),
        "export complete"
    );
    for path in &charts {
        println!("{}", path.display());
    }
    println!("{}", summary.display());
    Ok(())
}

fn run_gui(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Non-Cash Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Non-Cash Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
