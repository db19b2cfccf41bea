use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapingError};
use crate::parser::{compile, element_text, HemisphereItem};

/// Parses both hemisphere pages: the search listing (titles and detail links)
/// and each detail page (full resolution download link).
pub struct HemisphereParser {
    origin: Url,
    item_selector: Selector,
    item_link_selector: Selector,
    anchor_selector: Selector,
    downloads_selector: Selector,
    list_selector: Selector,
    list_item_selector: Selector,
}

impl HemisphereParser {
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            origin: Url::parse(origin)?,
            item_selector: compile("div.item")?,
            item_link_selector: compile("a.itemLink")?,
            anchor_selector: compile("a[href]")?,
            downloads_selector: compile("div.downloads")?,
            list_selector: compile("ul")?,
            list_item_selector: compile("li")?,
        })
    }

    /// One entry per listing item, in page order. Items that lack a title or
    /// link come back as errors so the caller can skip them individually.
    pub fn parse_listing(&self, html: &str) -> Vec<Result<HemisphereItem>> {
        let document = Html::parse_document(html);
        let items: Vec<Result<HemisphereItem>> = document
            .select(&self.item_selector)
            .enumerate()
            .map(|(position, item)| self.parse_item(position, &item))
            .collect();

        debug!(items = items.len(), "Parsed hemisphere listing");
        items
    }

    fn parse_item(&self, position: usize, item: &ElementRef) -> Result<HemisphereItem> {
        let page = format!("hemisphere listing item {}", position + 1);

        let title = item
            .select(&self.item_link_selector)
            .map(|link| element_text(&link).trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or_else(|| ScrapingError::mismatch(&page, "no a.itemLink with a title"))?;

        let href = item
            .select(&self.anchor_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .ok_or_else(|| ScrapingError::mismatch(&page, "no link to a detail page"))?;

        let detail_url = self
            .origin
            .join(href)
            .map_err(|e| ScrapingError::mismatch(&page, format!("unusable link '{}': {}", href, e)))?;

        Ok(HemisphereItem {
            title,
            detail_url: detail_url.to_string(),
        })
    }

    /// Full resolution image link from a detail page: the first anchor in the
    /// first list item of the first list under `div.downloads`.
    pub fn parse_detail(&self, html: &str, page_url: &str) -> Result<String> {
        let document = Html::parse_document(html);

        let downloads = document
            .select(&self.downloads_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(page_url, "no div.downloads section"))?;

        let list = downloads
            .select(&self.list_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(page_url, "downloads section has no list"))?;

        let first_item = list
            .select(&self.list_item_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(page_url, "downloads list is empty"))?;

        let href = first_item
            .select(&self.anchor_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .ok_or_else(|| ScrapingError::mismatch(page_url, "first download has no link"))?;

        Url::parse(page_url)
            .and_then(|base| base.join(href))
            .map(|url| url.to_string())
            .map_err(|e| ScrapingError::mismatch(page_url, format!("unusable link '{}': {}", href, e)))
    }
}
