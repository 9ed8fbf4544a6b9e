use pretty_assertions::assert_eq;
use tabs_engine::{FragmentExtractor, RecommendationsExtractor};

const RESPONSE: &str = r#"<!doctype html>
<html><head><title>Section</title></head><body>
<div id="shopify-section-main">
  <product-recommendations id="rec-a"><ul><li class="resource-list__item">A</li></ul></product-recommendations>
  <product-recommendations id="rec-b">
  </product-recommendations>
</div>
</body></html>"#;

#[test]
fn matches_recommendations_element_by_id() {
    let fragment = RecommendationsExtractor.extract(RESPONSE, "rec-a");
    assert_eq!(
        fragment.as_deref(),
        Some(r#"<ul><li class="resource-list__item">A</li></ul>"#)
    );
}

#[test]
fn blank_or_missing_element_yields_nothing() {
    assert_eq!(RecommendationsExtractor.extract(RESPONSE, "rec-b"), None);
    assert_eq!(RecommendationsExtractor.extract(RESPONSE, "rec-z"), None);
    assert_eq!(
        RecommendationsExtractor.extract(r#"<div id="rec-a">lookalike</div>"#, "rec-a"),
        None
    );
}
