pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod parser;
pub mod scraper;
pub mod storage;

pub use error::{Result, ScrapingError};
pub use config::Config;
pub use parser::{Hemisphere, ScrapeRecord};
pub use scraper::MarsScraper;
pub use storage::{FileRecordStore, RecordStore, StoredRecord};
