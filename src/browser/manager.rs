use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::browser::PageRenderer;
use crate::config::BrowserConfig;
use crate::error::{Result, ScrapingError};

/// Renders pages in a real Chrome/Chromium so client-side scripts run before
/// the HTML is read. Every call launches its own browser and tears it down.
pub struct ChromeRenderer {
    config: BrowserConfig,
}

impl ChromeRenderer {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let session = BrowserSession::launch(&self.config).await?;
        render_once(session, url, self.config.settle_delay).await
    }
}

/// A launched browser that can show one page and must then be shut down.
#[async_trait::async_trait]
trait RenderSession: Send + Sync + Sized {
    async fn visit(&self, url: &str, settle_delay: Duration) -> Result<String>;
    async fn close(self);
}

/// Visit a single page and close the session whether or not the visit worked.
async fn render_once<S: RenderSession>(session: S, url: &str, settle_delay: Duration) -> Result<String> {
    let html = session.visit(url, settle_delay).await;
    session.close().await;
    html
}

/// A launched browser plus the task draining its CDP event stream.
struct BrowserSession {
    id: Uuid,
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl BrowserSession {
    async fn launch(config: &BrowserConfig) -> Result<Self> {
        let id = Uuid::new_v4();

        // unique profile dir so concurrent launches never share a singleton lock
        let user_data_dir = std::env::temp_dir().join(format!("mars-scraper-{}-{}", std::process::id(), id));
        std::fs::create_dir_all(&user_data_dir)
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create profile dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .user_data_dir(&user_data_dir)
            .launch_timeout(config.launch_timeout)
            .args(vec![
                "--disable-gpu",
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--mute-audio",
                "--no-first-run",
                "--disable-default-apps",
                "--disable-sync",
            ]);

        if let Some(ref executable) = config.executable {
            builder = builder.chrome_executable(executable);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let chrome_config = builder
            .build()
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to create browser config: {}", e)))?;

        info!(session = %id, "Launching browser");
        let (browser, mut handler) = match tokio::time::timeout(config.launch_timeout, Browser::launch(chrome_config)).await {
            Ok(Ok(launched)) => launched,
            Ok(Err(e)) => {
                let _ = std::fs::remove_dir_all(&user_data_dir);
                return Err(ScrapingError::BrowserError(format!("Failed to launch browser: {}", e)));
            }
            Err(_) => {
                let _ = std::fs::remove_dir_all(&user_data_dir);
                return Err(ScrapingError::BrowserError("Timeout launching browser".to_string()));
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            debug!("Browser handler task ended");
        });

        Ok(Self {
            id,
            browser,
            handler_task,
            user_data_dir,
        })
    }
}

#[async_trait::async_trait]
impl RenderSession for BrowserSession {

    /// Open one page, let it settle, and return the rendered document.
    async fn visit(&self, url: &str, settle_delay: Duration) -> Result<String> {
        info!(session = %self.id, %url, "Navigating browser");

        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScrapingError::BrowserError(format!("Failed to open {}: {}", url, e)))?;

        let html: Result<String> = async {
            page.wait_for_navigation().await?;
            tokio::time::sleep(settle_delay).await;
            Ok::<String, ScrapingError>(page.content().await?)
        }
        .await;

        if let Err(e) = page.close().await {
            warn!(session = %self.id, "Failed to close page: {}", e);
        }

        html
    }

    /// Shut the browser down and reap the child process. Never fails; problems
    /// are logged since the caller already has the result it cares about.
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(session = %self.id, "Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!(session = %self.id, "Failed to reap browser process: {}", e);
        }
        self.handler_task.abort();

        if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
            debug!(session = %self.id, "Failed to remove profile dir: {}", e);
        }
        info!(session = %self.id, "Closed browser");
    }
}
