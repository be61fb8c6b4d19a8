use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tracing::{error, info};

use nusa_gateway::api::{self, AppState, Limits};
use nusa_gateway::config::Settings;
use nusa_gateway::indexer::PonderClient;
use nusa_gateway::numeric;
use nusa_gateway::telemetry;

#[derive(Parser)]
#[command(name = "nusa-gateway", version, about = "JSON gateway between the Nusa dashboard and the Ponder indexer")]
struct Cli {
    /// Settings file (defaults to ./nusa.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Listen address, overrides the settings file
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Indexer base URL, overrides PONDER_API_URL
    #[arg(long, global = true)]
    ponder_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway (default)
    Serve,
    /// Convert a fixed-point value and print it
    Convert {
        value: String,
        #[arg(long = "as", value_enum, default_value_t = ConvertKind::Ray)]
        kind: ConvertKind,
        /// Token decimals for `--as units`
        #[arg(long, default_value_t = 18)]
        decimals: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConvertKind {
    Ray,
    Percent,
    Usd,
    Bps,
    Units,
}

fn convert(value: &str, kind: ConvertKind, decimals: u32) -> String {
    match kind {
        ConvertKind::Ray => numeric::ray_to_number(value).to_string(),
        ConvertKind::Percent => format!("{}%", numeric::format_percent(value)),
        ConvertKind::Usd => numeric::format_usd(numeric::to_usd(value)),
        ConvertKind::Bps => format!("{}%", numeric::format_bps(numeric::parse_bps(value))),
        ConvertKind::Units => numeric::format_units(value, decimals).to_string(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(url) = cli.ponder_url {
        settings.ponder_api_url = url;
    }
    settings.validate()?;

    telemetry::init_tracing(&settings.log_filter);
    telemetry::init_metrics(settings.metrics_addr.parse()?)?;
    numeric::install_cache_capacity(settings.cache_capacity);

    let client = PonderClient::new(settings.graphql_url(), settings.request_timeout())?;
    let state = AppState::new(Arc::new(client), Limits::from(&settings));
    let app = api::router(state, &settings.cors_allow_origin);

    let listener = TcpListener::bind(settings.socket_addr()?).await?;
    info!(
        addr = %listener.local_addr()?,
        indexer = %settings.graphql_url(),
        "nusa gateway listening"
    );
    api::serve(listener, app, shutdown_signal()).await?;
    info!("gateway stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Convert { ref value, kind, decimals }) => {
            println!("{}", convert(value, kind, decimals));
            Ok(())
        }
        Some(Command::Serve) | None => serve(cli).await,
    }
}
