use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use exoscan_core::{
    gauge::GaugeFrame, FileCandidate, ManualEntry, ManualField, ManualStrategy, ModelKind,
    OutputFormat, Presenter, ScannerController, ScannerSettings, Views,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{render_bar, TerminalFiles, TerminalGauge, TerminalPanel, TerminalTabs};

#[derive(Parser, Debug)]
#[command(
    name = "exoscan",
    author,
    version,
    about = "Exoplanet candidate scanner console"
)]
struct Cli {
    /// Settings file (TOML, YAML or JSON); EXOSCAN_* variables still apply on top
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Base URL of the prediction service
    #[arg(long, value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Model tab to select (logistic, random-forest, gradient-boosting, lightgbm)
    #[arg(long, value_name = "ID", global = true)]
    model: Option<ModelKind>,

    /// Emit results as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Jump straight to the final gauge value
    #[arg(long, global = true)]
    no_animate: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the selectable models
    Models,
    /// Stage a CSV file and score it
    AnalyzeFile {
        /// CSV file to analyze
        path: PathBuf,
    },
    /// Score manually entered KOI fields
    AnalyzeManual(ManualArgs),
    /// Draw a single gauge frame
    Gauge {
        /// Value between 0 and 100
        value: f64,
    },
}

#[derive(Args, Debug)]
struct ManualArgs {
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_fpflag_ss: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_fpflag_nt: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_fpflag_co: String,
    /// Transit duration in hours
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_duration: String,
    /// Transit epoch (BJD - 2454833)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_time0bk: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_fpflag_ec: String,
    /// Right ascension in degrees
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    ra: String,
    /// Planet count of the system (heuristic strategy only)
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    koi_count: String,
    /// Score remotely or with the local heuristic
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<ManualStrategy>,
}

impl ManualArgs {
    fn entry(&self) -> ManualEntry {
        ManualEntry::new()
            .with(ManualField::KoiFpflagSs, &self.koi_fpflag_ss)
            .with(ManualField::KoiFpflagNt, &self.koi_fpflag_nt)
            .with(ManualField::KoiFpflagCo, &self.koi_fpflag_co)
            .with(ManualField::KoiDuration, &self.koi_duration)
            .with(ManualField::KoiTime0bk, &self.koi_time0bk)
            .with(ManualField::KoiFpflagEc, &self.koi_fpflag_ec)
            .with(ManualField::Ra, &self.ra)
            .with(ManualField::KoiCount, &self.koi_count)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let mut settings = load_settings(&cli)?;
    match cli.command.as_ref().unwrap_or(&Commands::Models) {
        Commands::Models => list_models(cli.json)?,
        Commands::AnalyzeFile { path } => analyze_file(&cli, &settings, path).await?,
        Commands::AnalyzeManual(args) => {
            if let Some(strategy) = args.strategy {
                settings.manual_strategy = strategy;
            }
            analyze_manual(&cli, &settings, args).await?
        }
        Commands::Gauge { value } => draw_gauge(&cli, *value)?,
    }
    Ok(())
}

/// Defaults, then environment (or `--config` layered with the environment), then flags.
fn load_settings(cli: &Cli) -> Result<ScannerSettings> {
    let mut settings = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => ScannerSettings::from_env()?,
    };
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(model) = cli.model {
        settings.model = model;
    }
    Ok(settings)
}

fn load_config_file(path: &Path) -> Result<ScannerSettings> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("EXOSCAN"))
        .build()
        .and_then(|cfg| cfg.try_deserialize::<ScannerSettings>())
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

fn presenter(cli: &Cli) -> Presenter {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    Presenter::new(format, !cli.no_color)
}

fn controller(cli: &Cli, settings: &ScannerSettings) -> Result<ScannerController<TerminalGauge>> {
    let views = Views {
        results: Box::new(TerminalPanel::new(presenter(cli))),
        file: Box::new(TerminalFiles::new(cli.json)),
        tabs: Box::new(TerminalTabs),
    };
    let surface = TerminalGauge::new(!cli.json && !cli.no_animate, !cli.no_color);
    let mut controller = ScannerController::new(settings, views, surface)?;
    controller.set_animate(!cli.no_animate);
    Ok(controller)
}

async fn analyze_file(cli: &Cli, settings: &ScannerSettings, path: &Path) -> Result<()> {
    let candidate = FileCandidate::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut controller = controller(cli, settings)?;
    controller.select_file(candidate)?;
    let outcome = controller.analyze_file().await;
    finish_gauge(cli, &mut controller).await;
    outcome?;
    Ok(())
}

async fn analyze_manual(cli: &Cli, settings: &ScannerSettings, args: &ManualArgs) -> Result<()> {
    let mut controller = controller(cli, settings)?;
    let entry = args.entry();
    controller.update_fields(&entry);
    let outcome = controller.analyze_manual(&entry).await;
    finish_gauge(cli, &mut controller).await;
    outcome?;
    Ok(())
}

async fn finish_gauge(cli: &Cli, controller: &mut ScannerController<TerminalGauge>) {
    controller.gauge_finished().await;
    if !cli.json && !cli.no_animate {
        eprintln!();
    }
}

#[derive(Serialize)]
struct ModelRow {
    id: &'static str,
    name: &'static str,
}

fn list_models(json: bool) -> Result<()> {
    let rows: Vec<_> = ModelKind::ALL
        .into_iter()
        .map(|model| ModelRow {
            id: model.id(),
            name: model.display_name(),
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} model(s) available", rows.len());
    for row in rows {
        let marker = if row.id == ModelKind::default().id() {
            " (default)"
        } else {
            ""
        };
        println!("- {id:<18} {name}{marker}", id = row.id, name = row.name);
    }
    Ok(())
}

fn draw_gauge(cli: &Cli, value: f64) -> Result<()> {
    let frame = GaugeFrame::for_value(value);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&frame)?);
        return Ok(());
    }
    let tint = frame.band.stops().0;
    println!(
        "{}",
        render_bar(
            frame.value_arc.sweep(),
            Some(tint),
            frame.readout,
            !cli.no_color
        )
    );
    println!(
        "band {:?}, arc {:.4} -> {:.4} rad",
        frame.band, frame.value_arc.start_angle, frame.value_arc.end_angle
    );
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
