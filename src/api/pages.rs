use askama::Template;
use axum::{extract::State, response::Html};

use crate::api::{AppError, AppState};
use crate::error::ScrapingError;
use crate::parser::ScrapeRecord;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    record: &'a ScrapeRecord,
    scraped_at: String,
}

/// Display the stored snapshot, scraping first if nothing has been stored.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let stored = state.load_or_scrape().await?;

    let page = IndexTemplate {
        record: &stored.record,
        scraped_at: stored.scraped_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    }
    .render()
    .map_err(ScrapingError::from)?;

    Ok(Html(page))
}
