use analytics::{KpiSummary, OverviewKind};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use configuration::Config;
use core_types::{FilterRequest, Period, Risk, ViewFilter};
use dashboards::ViewId;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};
use web_server::AppState;

/// The main entry point for the MarketLens analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; values in it become MARKETLENS_* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _guard = init_tracing(&config)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            tracing::info!(address = %config.server.address(), data = %config.data.path.display(), "Starting MarketLens server.");
            web_server::run_server(config).await
        }
        Commands::View(args) => handle_view(&config, args),
        Commands::Kpi(filter) => handle_kpi(&config, filter),
        Commands::Overview(args) => handle_overview(&config, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Financial analytics over a static stock dataset, served to dashboards.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, global = true, default_value = "marketlens.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Print the JSON payload of one dashboard view.
    View(ViewArgs),
    /// Print the five-field KPI summary as a table.
    Kpi(FilterArgs),
    /// Print one of the overview KPI sets as a table.
    Overview(OverviewArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep only rows of this sector (exact match).
    #[arg(long)]
    sector: Option<String>,
    /// Keep only rows of this risk tier: Low, Medium or High.
    #[arg(long)]
    risk: Option<Risk>,
}

impl FilterArgs {
    fn into_filter(self) -> ViewFilter {
        ViewFilter::new(self.sector, self.risk)
    }
}

#[derive(Args)]
struct ViewArgs {
    /// summary, sector-risk or deep-dive.
    view: ViewId,
    #[command(flatten)]
    filter: FilterArgs,
    /// Bucketing period: Y, Q or M. Defaults to the view's own period.
    #[arg(long)]
    period: Option<Period>,
}

#[derive(Args)]
struct OverviewArgs {
    /// market, performance or valuation.
    kind: OverviewKind,
    #[command(flatten)]
    filter: FilterArgs,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_view(config: &Config, args: ViewArgs) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let filter = args.filter.into_filter();
    let request = FilterRequest {
        filter,
        period: args.period,
    };

    let payload = state.service.view(args.view, &request)?;
    println!("{}", serde_json::to_string_pretty(payload.as_ref())?);
    Ok(())
}

fn handle_kpi(config: &Config, args: FilterArgs) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let kpi: KpiSummary = state.service.kpi(&args.into_filter())?;
    println!("{}", render_table("KPI", &kpi.entries()));
    Ok(())
}

fn handle_overview(config: &Config, args: OverviewArgs) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let overview = state.service.overview(args.kind, &args.filter.into_filter())?;
    println!("{}", render_table(args.kind.as_str(), &overview.entries()));
    Ok(())
}

/// Renders label/value pairs as a two-column table.
fn render_table(title: &str, entries: &[(&'static str, f64)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![title, "Value"]);
    for (label, value) in entries {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

// ==============================================================================
// Tracing
// ==============================================================================

/// Installs the global subscriber: stdout always, plus a daily log file when
/// `logging.directory` is set. `RUST_LOG` wins over `logging.level`.
///
/// The returned guard flushes the file writer and must live until exit.
fn init_tracing(config: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging.level filter")?;

    let (file_layer, guard) = match &config.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "marketlens.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}
