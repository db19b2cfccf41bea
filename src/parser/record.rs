use serde::{Deserialize, Serialize};

/// The merged snapshot produced by one scrape run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRecord {
    pub news_title: String,
    pub news_paragraph: String,
    pub featured_image_url: String,
    pub weather: String,
    pub facts_table_html: String,
    pub hemisphere_image_urls: Vec<Hemisphere>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hemisphere {
    pub title: String,
    pub img_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFragment {
    pub title: String,
    pub paragraph: String,
}

/// One listing entry carried through both hemisphere stages as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HemisphereItem {
    pub title: String,
    pub detail_url: String,
}

impl HemisphereItem {
    pub fn resolve(self, img_url: String) -> Hemisphere {
        Hemisphere {
            title: self.title,
            img_url,
        }
    }
}
