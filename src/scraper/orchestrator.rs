use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::browser::PageRenderer;
use crate::config::SourceConfig;
use crate::error::{RecoveryStrategy, Result};
use crate::parser::{
    FactsTableParser, FeaturedImageParser, Hemisphere, HemisphereItem, HemisphereParser, NewsFragment, NewsParser,
    ScrapeRecord, WeatherParser,
};
use crate::scraper::PageFetcher;

/// Runs the five extractors one after another and merges their output.
///
/// Any extractor failure aborts the whole run; no partial record is ever
/// returned. Only individual hemisphere entries with broken markup are
/// skipped.
pub struct MarsScraper {
    sources: SourceConfig,
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageRenderer>,
    news_parser: NewsParser,
    featured_image_parser: FeaturedImageParser,
    weather_parser: WeatherParser,
    facts_parser: FactsTableParser,
    hemisphere_parser: HemisphereParser,
}

impl MarsScraper {
    pub fn new(sources: SourceConfig, fetcher: Arc<dyn PageFetcher>, renderer: Arc<dyn PageRenderer>) -> Result<Self> {
        Ok(Self {
            featured_image_parser: FeaturedImageParser::new(&sources.jpl_origin)?,
            hemisphere_parser: HemisphereParser::new(&sources.usgs_origin)?,
            news_parser: NewsParser::new()?,
            weather_parser: WeatherParser::new()?,
            facts_parser: FactsTableParser::new()?,
            sources,
            fetcher,
            renderer,
        })
    }

    pub async fn run(&self) -> Result<ScrapeRecord> {
        let started = Instant::now();
        info!("Starting full scrape");

        let news = self.scrape_news().await?;
        let featured_image_url = self.scrape_featured_image().await?;
        let weather = self.scrape_weather().await?;
        let facts_table_html = self.scrape_facts().await?;
        let hemisphere_image_urls = self.scrape_hemispheres().await?;

        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Full scrape finished");
        Ok(ScrapeRecord {
            news_title: news.title,
            news_paragraph: news.paragraph,
            featured_image_url,
            weather,
            facts_table_html,
            hemisphere_image_urls,
        })
    }

    pub async fn scrape_news(&self) -> Result<NewsFragment> {
        let html = self.fetcher.fetch(&self.sources.news_url).await?;
        let news = self.news_parser.parse(&html)?;
        info!(title = %news.title, "Scraped latest news");
        Ok(news)
    }

    pub async fn scrape_featured_image(&self) -> Result<String> {
        let html = self.renderer.render(&self.sources.featured_image_url).await?;
        let url = self.featured_image_parser.parse(&html)?;
        info!(%url, "Scraped featured image");
        Ok(url)
    }

    pub async fn scrape_weather(&self) -> Result<String> {
        let html = self.fetcher.fetch(&self.sources.weather_url).await?;
        let weather = self.weather_parser.parse(&html)?;
        info!(chars = weather.chars().count(), "Scraped weather report");
        Ok(weather)
    }

    pub async fn scrape_facts(&self) -> Result<String> {
        let html = self.fetcher.fetch(&self.sources.facts_url).await?;
        let table = self.facts_parser.parse(&html)?;
        info!(bytes = table.len(), "Scraped facts table");
        Ok(table)
    }

    /// Listing first, then one detail page per listed item. Each item travels
    /// through both stages as a unit, so a skip in either stage can never
    /// misalign titles and image links.
    pub async fn scrape_hemispheres(&self) -> Result<Vec<Hemisphere>> {
        let html = self.fetcher.fetch(&self.sources.hemispheres_url).await?;
        let listing = self.hemisphere_parser.parse_listing(&html);

        let mut outcomes = Vec::with_capacity(listing.len());
        for listed in listing {
            let outcome = match listed {
                Ok(item) => self.resolve_hemisphere(item).await,
                Err(e) => Err(e),
            };
            match outcome {
                Err(e) if e.recovery_strategy() == RecoveryStrategy::AbortRun => return Err(e),
                outcome => outcomes.push(outcome),
            }
        }

        let listed = outcomes.len();
        let hemispheres: Vec<Hemisphere> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(hemisphere) => Some(hemisphere),
                Err(e) => {
                    warn!(error = %e, "Skipping hemisphere entry");
                    None
                }
            })
            .collect();

        info!(listed, resolved = hemispheres.len(), "Scraped hemisphere images");
        Ok(hemispheres)
    }

    async fn resolve_hemisphere(&self, item: HemisphereItem) -> Result<Hemisphere> {
        debug!(title = %item.title, url = %item.detail_url, "Resolving hemisphere image");
        let html = self.fetcher.fetch(&item.detail_url).await?;
        let img_url = self.hemisphere_parser.parse_detail(&html, &item.detail_url)?;
        Ok(item.resolve(img_url))
    }
}
