use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapingError};
use crate::parser::compile;

const PAGE: &str = "featured image page";

/// Reads the featured image out of the rendered photo index. The image path
/// only exists inside the carousel item's inline `background-image` style.
pub struct FeaturedImageParser {
    origin: Url,
    feature_selector: Selector,
    carousel_selector: Selector,
    item_selector: Selector,
}

impl FeaturedImageParser {
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
            feature_selector: compile("section.primary_media_feature")?,
            carousel_selector: compile("div.carousel_items")?,
            item_selector: compile("article.carousel_item")?,
        })
    }

    pub fn parse(&self, html: &str) -> Result<String> {
        let document = Html::parse_document(html);

        let feature = document
            .select(&self.feature_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "no section.primary_media_feature"))?;

        let carousel = feature
            .select(&self.carousel_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "feature section has no div.carousel_items"))?;

        let style = carousel
            .select(&self.item_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "carousel has no article.carousel_item"))?
            .value()
            .attr("style")
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "carousel item has no style attribute"))?;

        let partial = quoted_path(style)
            .ok_or_else(|| ScrapingError::mismatch(PAGE, format!("no quoted image path in style '{}'", style)))?;

        let url = self.origin.join(partial)?.to_string();
        debug!(%url, "Parsed featured image");
        Ok(url)
    }
}

// text between the first pair of single quotes
fn quoted_path(style: &str) -> Option<&str> {
    let mut parts = style.split('\'');
    parts.next()?;
    let inner = parts.next()?;
    parts.next()?;
    (!inner.is_empty()).then_some(inner)
}
