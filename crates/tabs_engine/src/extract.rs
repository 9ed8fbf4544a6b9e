use scraper::{Html, Selector};
use tabs_core::markup::RECOMMENDATIONS_TAG;

/// Pulls the part of a response that belongs to one source element.
pub trait FragmentExtractor: Send + Sync {
    /// Inner markup of the matching element, or `None` when there is none or
    /// it is blank.
    fn extract(&self, html: &str, element_id: &str) -> Option<String>;
}

/// Finds `<product-recommendations id="…">` in a section-rendered response.
#[derive(Debug, Default)]
pub struct RecommendationsExtractor;

impl FragmentExtractor for RecommendationsExtractor {
    fn extract(&self, html: &str, element_id: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let selector = Selector::parse(RECOMMENDATIONS_TAG).ok()?;

        doc.select(&selector)
            .find(|el| el.value().id() == Some(element_id))
            .map(|el| el.inner_html())
            .filter(|inner| !inner.trim().is_empty())
    }
}
