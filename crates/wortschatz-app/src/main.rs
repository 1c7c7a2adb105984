use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use wortschatz_config::Config;
use wortschatz_gateway::{GeminiClient, TutorBackend};
use wortschatz_store::WordStore;

mod controller;
mod events;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::state::AppState;

#[derive(Parser)]
#[command(name = "wortschatz", about = "AI-backed German vocabulary tutor")]
struct Cli {
    /// Override the notebook storage file
    #[arg(long)]
    store_path: Option<PathBuf>,

    /// Override the language the tutor explains things in
    #[arg(long)]
    display_language: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::new();
    if let Some(path) = cli.store_path {
        config.storage.path = path;
    }
    if let Some(language) = cli.display_language {
        config.gateway.display_language = language;
    }

    if config.gateway.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; remote calls will fail");
    }

    let store = WordStore::open(&config.storage.path);
    let backend: Arc<dyn TutorBackend> = Arc::new(GeminiClient::new(config.gateway.clone()));
    let state = Arc::new(AppState::new(config));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(store, backend);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
        result = tasks.join_next() => {
            match result {
                Some(Ok(Ok(()))) => tracing::info!("task finished"),
                Some(Ok(Err(e))) => tracing::error!("task failed: {e:#}"),
                Some(Err(e)) => tracing::error!("task panicked: {e}"),
                None => {}
            }
        }
    }

    controller.shutdown();
    while tasks.join_next().await.is_some() {}

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    // Logs go to stderr; stdout belongs to the UI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_writer(std::io::stderr)
        .init();
}
