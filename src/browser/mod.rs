pub mod manager;

pub use manager::ChromeRenderer;

use crate::error::Result;

/// Produces the HTML of a page after its scripts have run.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}
