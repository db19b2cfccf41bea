use scraper::{Html, Selector};

use crate::error::{Result, ScrapingError};
use crate::parser::{compile, element_text};

pub struct WeatherParser {
    tweet_selector: Selector,
}

impl WeatherParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tweet_selector: compile("p.TweetTextSize")?,
        })
    }

    /// Text of the newest status on the profile, kept verbatim.
    pub fn parse(&self, html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.tweet_selector)
            .next()
            .map(|tweet| element_text(&tweet))
            .ok_or_else(|| ScrapingError::mismatch("weather profile", "no p.TweetTextSize element"))
    }
}
