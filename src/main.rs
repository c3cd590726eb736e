//! preview-relay
//!
//! Live markdown preview: a websocket broadcast relay plus a file-backed
//! producer that pushes rendered HTML to every open viewer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use preview_relay::adapters::browser::SystemBrowser;
use preview_relay::adapters::document::{FileDocument, FileSaveWatcher};
use preview_relay::adapters::markdown::PulldownRenderer;
use preview_relay::adapters::websocket::RelayServer;
use preview_relay::application::PreviewSession;
use preview_relay::config::AppConfig;
use preview_relay::ports::BrowserLauncher;

/// Live markdown preview relay
#[derive(Parser, Debug)]
#[command(name = "preview-relay", version)]
#[command(about = "Live markdown preview broadcaster over WebSocket", long_about = None)]
struct Args {
    /// Relay port (overrides PREVIEW_RELAY__RELAY__PORT)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay only
    Serve,
    /// Preview a markdown file, republishing on save and on every idle tick
    Preview {
        /// Markdown file to preview
        file: PathBuf,

        /// Don't open the viewer page
        #[arg(long)]
        no_browser: bool,

        /// Lines the editor window shows, used to centre the scroll position
        #[arg(long, default_value_t = 40)]
        visible_lines: usize,
    },
    /// Open the viewer page of a running relay
    Open,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load().context("loading configuration")?;
    if let Some(port) = args.port {
        config.relay.port = port;
    }
    config.validate().context("validating configuration")?;

    init_tracing(&config.relay.log_level, args.json_logs);
    info!("Starting preview-relay v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Serve => serve(config).await,
        Command::Preview {
            file,
            no_browser,
            visible_lines,
        } => {
            if no_browser {
                config.preview.open_browser = false;
            }
            preview(config, file, visible_lines).await
        }
        Command::Open => {
            let url = config.viewer_url();
            SystemBrowser.open(&url)?;
            info!(%url, "Opened viewer page");
            Ok(())
        }
    }
}

fn init_tracing(default_filter: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let relay = RelayServer::new(config.relay);
    let addr = relay.start().await?;
    info!(%addr, "Relay listening; press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    relay.shutdown().await;
    Ok(())
}

async fn preview(config: AppConfig, file: PathBuf, visible_lines: usize) -> Result<()> {
    let document = FileDocument::new(&file).with_visible_lines(visible_lines);
    let session = PreviewSession::new(
        config.preview,
        Arc::new(RelayServer::new(config.relay)),
        Arc::new(document),
        Arc::new(PulldownRenderer::new()),
        Arc::new(SystemBrowser),
    );

    let addr = session.start_preview().await?;
    info!(%addr, file = %file.display(), "Previewing; press Ctrl+C to stop");

    let (_watcher, mut saves) = FileSaveWatcher::new(&file)
        .with_context(|| format!("watching {}", file.display()))?;
    let on_save = {
        let session = session.clone();
        tokio::spawn(async move {
            while saves.recv().await.is_some() {
                session.notify_saved().await;
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    on_save.abort();
    session.cleanup().await;
    Ok(())
}
