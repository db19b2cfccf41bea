pub mod facts;
pub mod featured_image;
pub mod hemispheres;
pub mod news;
pub mod record;
pub mod weather;

pub use facts::{Fact, FactsTableParser};
pub use featured_image::FeaturedImageParser;
pub use hemispheres::HemisphereParser;
pub use news::NewsParser;
pub use record::*;
pub use weather::WeatherParser;

use scraper::{ElementRef, Selector};

use crate::error::{Result, ScrapingError};

/// Compile a CSS selector, naming it in the error if it is invalid.
pub(crate) fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapingError::ParseError(format!("Invalid selector '{}': {}", selector, e)))
}

/// All descendant text of an element, concatenated in document order.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}
