use anyhow::{Context, Result};
use clap::Parser;
use meeting_assistant::{
    build_providers, create_router, AppState, AssistantDefaults, Config, MeetingStore,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meeting-assistant")]
#[command(about = "Meeting wizard backend: agenda, audio, transcription, template filling")]
struct Cli {
    /// Config file, without extension
    #[arg(short, long, default_value = "config/meeting-assistant")]
    config: String,

    /// Address to bind, overrides the config file
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Use offline mock providers instead of the configured APIs
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("meeting_assistant=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }
    cfg.mock_mode |= cli.mock;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let store = MeetingStore::new(&cfg.storage.path, cfg.storage.max_upload_bytes());
    store.init().await?;

    let (transcriber, chat) = build_providers(&cfg).context("Failed to create API clients")?;
    info!(
        "Providers: transcription={}, chat={}",
        transcriber.provider_name(),
        chat.provider_name()
    );

    let state = AppState::new(store, transcriber, chat, AssistantDefaults::from_config(&cfg));
    let app = create_router(state, cfg.service.static_dir.as_ref().map(PathBuf::from));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
