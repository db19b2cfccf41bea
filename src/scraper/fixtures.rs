//! Canned pages for every source, served by in-memory fetcher and renderer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::browser::PageRenderer;
use crate::config::{Config, SourceConfig};
use crate::error::{Result, ScrapingError};
use crate::scraper::{MarsScraper, PageFetcher};

pub const NEWS_HTML: &str = r#"
<html><body>
  <div class="slide">
    <div class="image_and_description_container">
      <a href="/news/8436/">
        <div class="rollover_description">
          <div class="rollover_description_inner">
The lander's seismometer picked up a faint rumble.
</div>
        </div>
      </a>
    </div>
    <div class="content_title">
NASA's InSight Detects First Likely 'Quake' on Mars
</div>
  </div>
</body></html>
"#;

pub const FEATURED_IMAGE_HTML: &str = r#"
<html><body>
  <section class="centered_text clearfix main_feature primary_media_feature single">
    <div class="carousel_items">
      <article class="carousel_item" style="background-image: url('/spaceimages/images/wallpaper/PIA16105-1920x1200.jpg');"></article>
    </div>
  </section>
</body></html>
"#;

pub const WEATHER_HTML: &str = r#"
<div class="stream">
  <p class="TweetTextSize js-tweet-text">InSight sol 145 (2019-04-25) low -97.7ºC (-143.8ºF) high -19.5ºC (-3.1ºF)</p>
</div>
"#;

pub const FACTS_HTML: &str = r#"
<table class="tablepress">
  <tbody>
    <tr><td>Diameter</td><td>6,779 km</td></tr>
    <tr><td>Mass</td><td>6.42 × 10^23 kg</td></tr>
  </tbody>
</table>
"#;

pub const HEMISPHERES_HTML: &str = r#"
<div class="results">
  <div class="item">
    <a href="/search/map/Mars/Viking/cerberus_enhanced" class="itemLink product-item"><h3>Cerberus Hemisphere Enhanced</h3></a>
  </div>
  <div class="item">
    <a href="/search/map/Mars/Viking/schiaparelli_enhanced" class="itemLink product-item"><h3>Schiaparelli Hemisphere Enhanced</h3></a>
  </div>
  <div class="item">
    <a href="/search/map/Mars/Viking/syrtis_major_enhanced" class="itemLink product-item"><h3>Syrtis Major Hemisphere Enhanced</h3></a>
  </div>
</div>
"#;

pub const CERBERUS_URL: &str = "https://astrogeology.usgs.gov/search/map/Mars/Viking/cerberus_enhanced";
pub const SCHIAPARELLI_URL: &str = "https://astrogeology.usgs.gov/search/map/Mars/Viking/schiaparelli_enhanced";
pub const SYRTIS_URL: &str = "https://astrogeology.usgs.gov/search/map/Mars/Viking/syrtis_major_enhanced";

pub fn detail_html(image: &str) -> String {
    format!(
        r#"<div class="downloads"><h3>Download</h3><ul><li><a href="{}">Sample</a> (jpg)</li><li><a href="/original.tif">Original</a></li></ul></div>"#,
        image
    )
}

pub fn sources() -> SourceConfig {
    Config::default().sources
}

/// Serves pages from a map; unknown URLs fail like an unreachable host.
#[derive(Clone, Default)]
pub struct FixturePages {
    pages: Arc<HashMap<String, String>>,
    requests: Arc<AtomicUsize>,
}

impl FixturePages {
    /// Every source page in its well-formed shape.
    pub fn complete() -> HashMap<String, String> {
        let sources = sources();
        HashMap::from([
            (sources.news_url, NEWS_HTML.to_string()),
            (sources.featured_image_url, FEATURED_IMAGE_HTML.to_string()),
            (sources.weather_url, WEATHER_HTML.to_string()),
            (sources.facts_url, FACTS_HTML.to_string()),
            (sources.hemispheres_url, HEMISPHERES_HTML.to_string()),
            (CERBERUS_URL.to_string(), detail_html("/cache/images/cerberus_enhanced.tif_full.jpg")),
            (SCHIAPARELLI_URL.to_string(), detail_html("/cache/images/schiaparelli_enhanced.tif_full.jpg")),
            (SYRTIS_URL.to_string(), detail_html("/cache/images/syrtis_major_enhanced.tif_full.jpg")),
        ])
    }

    pub fn new(pages: HashMap<String, String>) -> Self {
        Self {
            pages: Arc::new(pages),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn serve(&self, url: &str) -> Result<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapingError::NetworkError(format!("connection refused: {}", url)))
    }
}

#[async_trait::async_trait]
impl PageFetcher for FixturePages {
    async fn fetch(&self, url: &str) -> Result<String> {
        // give concurrent callers a chance to interleave like real I/O would
        tokio::task::yield_now().await;
        self.serve(url)
    }
}

#[async_trait::async_trait]
impl PageRenderer for FixturePages {
    async fn render(&self, url: &str) -> Result<String> {
        self.serve(url)
    }
}

pub fn scraper_for(pages: &FixturePages) -> MarsScraper {
    MarsScraper::new(sources(), Arc::new(pages.clone()), Arc::new(pages.clone())).unwrap()
}
