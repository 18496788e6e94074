use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use clap::Parser;
use terp_core::{Config, HttpTransport, Session};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Used when RUST_LOG is unset. The binary's own target is its crate name.
const DEFAULT_LOG_FILTER: &str = concat!(env!("CARGO_CRATE_NAME"), "=info,terp_core=info");

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "terp")]
#[command(about = "Chat with the PlanetTerp assistant about UMD courses and professors")]
#[command(version)]
struct Cli {
    /// Backend address (overrides TERP_API_URL and the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Write logs here instead of the default cache location
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Persist the resolved backend address to the config file and exit
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    let api_url = config.resolve_api_url(cli.api_url.as_deref());

    if cli.save_config {
        config.api_url = Some(api_url);
        let path = config.save()?;
        println!("Saved configuration to {}", path.display());
        return Ok(());
    }

    let log_path = init_logging(cli.log_file)?;
    info!(%api_url, log = %log_path.display(), "starting terp");

    let transport = Arc::new(HttpTransport::new(&api_url, config.request_timeout())?);
    let mut session = Session::new(transport, config.rotation_interval());
    session.mount();

    let mut app = App::new(session, api_url);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;

    app.session.shutdown();
    tui::restore()?;
    info!("terp exited");

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

/// Logs go to a file because the terminal belongs to the UI
fn init_logging(log_file: Option<PathBuf>) -> Result<PathBuf> {
    let log_path = match log_file {
        Some(path) => path,
        None => dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?
            .join("terp-chat")
            .join("terp-chat.log"),
    };

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(log_path)
}
