pub mod fetch;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod fixtures;


pub use fetch::{HttpFetcher, PageFetcher};
pub use orchestrator::MarsScraper;
