//! Quantum Archives - Entry Point
//!
//! Runs either the interactive shell or the HTTP API over one session.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quantum_archives::{
    Config, GeminiClient, GenerativeModel, PaperDiscovery, RagResponder, SessionController,
    server::ArchiveServer,
};

#[derive(Parser, Debug)]
#[command(name = "quantum-archives")]
#[command(about = "Discover quantum-mechanics papers and chat about your collection")]
#[command(version)]
struct Cli {
    /// Gemini API key (defaults to API_KEY, then GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name (defaults to GEMINI_MODEL, then gemini-2.5-flash)
    #[arg(long)]
    model: Option<String>,

    /// API base URL (defaults to GEMINI_API_BASE_URL, then the public endpoint)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Front-end: shell or http
    #[arg(long, default_value = "shell")]
    mode: Mode,

    /// HTTP server port (only used with --mode http)
    #[arg(long, default_value = "8080", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Mode {
    /// Interactive terminal shell
    #[default]
    Shell,
    /// JSON API with server-sent events
    Http,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(cli: &Cli) -> Config {
    Config::from_env().with_overrides(
        cli.api_key.clone(),
        cli.model.clone(),
        cli.api_base_url.clone(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?cli.mode,
        "Starting Quantum Archives"
    );

    let config = load_config(&cli);
    let discovery_count = config.papers_per_physicist;
    let temperature = config.discovery_temperature;
    let history_window = config.history_window;

    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config)?);
    let discovery = PaperDiscovery::new(Arc::clone(&model))
        .with_paper_count(discovery_count)
        .with_temperature(temperature);
    let rag = RagResponder::new(model).with_history_window(history_window);

    let session = SessionController::new(discovery, rag).spawn();
    let server = ArchiveServer::new(session);

    match cli.mode {
        Mode::Shell => {
            tracing::info!("Running in shell mode");
            server.run_shell().await?;
        }
        Mode::Http => {
            tracing::info!(port = cli.port, "Running in HTTP mode");
            server.run_http(cli.port).await?;
        }
    }

    Ok(())
}
