pub mod pages;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{Result, ScrapingError};
use crate::scraper::MarsScraper;
use crate::storage::{RecordStore, StoredRecord};

#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<MarsScraper>,
    pub store: Arc<dyn RecordStore>,
    scrape_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(scraper: Arc<MarsScraper>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            scraper,
            store,
            scrape_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run the pipeline and replace the stored record. Concurrent callers
    /// queue here so only one run writes at a time.
    pub async fn scrape_and_store(&self) -> Result<StoredRecord> {
        let _guard = self.scrape_lock.lock().await;
        self.run_and_store().await
    }

    /// The stored snapshot, scraping once if there is none. Requests that
    /// arrive while that first scrape runs wait for it instead of starting
    /// their own.
    pub async fn load_or_scrape(&self) -> Result<StoredRecord> {
        if let Some(stored) = self.store.load().await? {
            return Ok(stored);
        }

        let _guard = self.scrape_lock.lock().await;
        match self.store.load().await? {
            Some(stored) => Ok(stored),
            None => self.run_and_store().await,
        }
    }

    async fn run_and_store(&self) -> Result<StoredRecord> {
        let record = self.scraper.run().await?;
        self.store.upsert(&record).await
    }
}

/// Maps pipeline failures onto HTTP statuses for the page routes.
pub struct AppError(ScrapingError);

impl From<ScrapingError> for AppError {
    fn from(err: ScrapingError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ScrapingError::NetworkError(_)
            | ScrapingError::BrowserError(_)
            | ScrapingError::StructureMismatch { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!(%status, error = %self.0, "Request failed");
        (status, self.0.to_string()).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/scrape", get(trigger_scrape))
        .route("/api/record", get(get_record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ScrapingError::ConfigError(format!("Failed to bind {}: {}", addr, e)))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(|e| ScrapingError::NetworkError(format!("Server error: {}", e)))
}

async fn trigger_scrape(State(state): State<AppState>) -> std::result::Result<Response, AppError> {
    state.scrape_and_store().await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, "/")]).into_response())
}

async fn get_record(State(state): State<AppState>) -> Json<ApiResponse<StoredRecord>> {
    match state.store.load().await {
        Ok(Some(stored)) => Json(ApiResponse::success(stored)),
        Ok(None) => Json(ApiResponse::error("No record stored yet".to_string())),
        Err(e) => Json(ApiResponse::error(format!("Failed to load record: {}", e))),
    }
}
