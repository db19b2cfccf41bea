use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use mars_scraper::api::{self, AppState};
use mars_scraper::browser::ChromeRenderer;
use mars_scraper::config::{ConfigManager, FileConfigManager};
use mars_scraper::scraper::{HttpFetcher, MarsScraper};
use mars_scraper::storage::{FileRecordStore, RecordStore};

const ONCE_ENV: &str = "MARS_SCRAPER_ONCE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mars_scraper=info,tower_http=info")),
        )
        .init();

    let config = FileConfigManager::from_env().load_config().await?;
    tracing::info!("Starting Mars scraper");

    let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
    let renderer = Arc::new(ChromeRenderer::new(config.browser.clone()));
    let scraper = Arc::new(MarsScraper::new(config.sources.clone(), fetcher, renderer)?);
    let record_store = FileRecordStore::new(config.storage.path.clone());
    tracing::info!(path = ?record_store.path(), "Using record store");
    let store: Arc<dyn RecordStore> = Arc::new(record_store);
    let state = AppState::new(scraper, store);

    // one-shot mode for cron jobs: scrape, store, print, exit
    if std::env::var(ONCE_ENV).map_or(false, |v| v == "1") {
        let stored = state.scrape_and_store().await?;
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }

    api::start_server(state, config.bind_addr()?).await?;

    tracing::info!("Mars scraper stopped.");
    Ok(())
}
