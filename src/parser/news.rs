use scraper::{Html, Selector};
use tracing::debug;

use crate::error::{Result, ScrapingError};
use crate::parser::{compile, element_text, NewsFragment};

const PAGE: &str = "news listing";

/// Pulls the latest headline and teaser out of the mission news listing.
pub struct NewsParser {
    slide_selector: Selector,
    title_selector: Selector,
    paragraph_selector: Selector,
}

impl NewsParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            slide_selector: compile("div.slide")?,
            title_selector: compile("div.content_title")?,
            paragraph_selector: compile("div.rollover_description_inner")?,
        })
    }

    pub fn parse(&self, html: &str) -> Result<NewsFragment> {
        let document = Html::parse_document(html);

        let slide = document
            .select(&self.slide_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "no div.slide element"))?;

        let title = slide
            .select(&self.title_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "first slide has no div.content_title"))?;

        let paragraph = slide
            .select(&self.paragraph_selector)
            .next()
            .ok_or_else(|| ScrapingError::mismatch(PAGE, "first slide has no teaser text block"))?;

        let fragment = NewsFragment {
            title: element_text(&title).replace('\n', ""),
            paragraph: element_text(&paragraph).replace('\n', ""),
        };
        debug!(title = %fragment.title, "Parsed news headline");
        Ok(fragment)
    }
}
