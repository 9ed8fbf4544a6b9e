use std::sync::Arc;

use pretty_assertions::assert_eq;
use tabs_core::{Document, LoadOutcome, NodeId, RecommendationRequest};
use tabs_engine::{FetchSettings, RecommendationLoader, ReqwestFetcher};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.select_first(doc.root(), |el| el.id() == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

const PANEL: &str = r#"
<div class="tp-panel" id="p2" aria-labelledby="t2">
  <product-recommendations class="tp-recommendations" id="rec-2"
    data-product-id="42" data-section-id="s1" data-intent="related"
    data-url="/recommendations/products?limit=4"></product-recommendations>
</div>
"#;

const SECTION_RESPONSE: &str = r#"<!doctype html>
<div id="shopify-section-s1">
  <product-recommendations class="tp-recommendations" id="rec-2"><div class="resource-list__item">Shirt</div><div class="resource-list__item">Sock</div></product-recommendations>
</div>"#;

fn loader_for(server: &MockServer) -> RecommendationLoader {
    let origin = Url::parse(&server.uri()).ok();
    RecommendationLoader::new(
        Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap()),
        origin,
    )
}

async fn mount_section(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/recommendations/products"))
        .and(query_param("limit", "4"))
        .and(query_param("product_id", "42"))
        .and(query_param("section_id", "s1"))
        .and(query_param("intent", "related"))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn load_splices_fragment_and_counts_items() {
    let server = MockServer::start().await;
    mount_section(&server, 200, SECTION_RESPONSE).await;
    let loader = loader_for(&server);
    let mut doc = Document::parse(PANEL);
    let panel = by_id(&doc, "p2");
    let source = by_id(&doc, "rec-2");

    assert_eq!(loader.load(&mut doc, panel).await, 2);
    assert_eq!(doc.attr(source, "data-recommendations-performed"), Some("true"));
    assert_eq!(
        doc.inner_html(source),
        r#"<div class="resource-list__item">Shirt</div><div class="resource-list__item">Sock</div>"#
    );
}

#[tokio::test]
async fn performed_source_is_counted_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let loader = loader_for(&server);
    let mut doc = Document::parse(&PANEL.replace(
        r#"data-intent="related""#,
        r#"data-intent="related" data-recommendations-performed="true""#,
    ));
    let source = by_id(&doc, "rec-2");
    doc.set_inner_html(source, r#"<div class="resource-list__item">Kept</div>"#);

    let panel = by_id(&doc, "p2");
    assert_eq!(loader.load(&mut doc, panel).await, 1);
}

#[tokio::test]
async fn malformed_source_yields_zero_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let loader = loader_for(&server);
    let mut doc = Document::parse(&PANEL.replace(r#"data-product-id="42""#, ""));

    let panel = by_id(&doc, "p2");
    assert_eq!(loader.load(&mut doc, panel).await, 0);
}

#[tokio::test]
async fn failed_or_unmatched_response_leaves_panel_untouched() {
    let server = MockServer::start().await;
    mount_section(&server, 500, "oops").await;
    let loader = loader_for(&server);
    let mut doc = Document::parse(PANEL);
    let before = doc.to_html();

    let panel = by_id(&doc, "p2");
    assert_eq!(loader.load(&mut doc, panel).await, 0);
    assert_eq!(doc.to_html(), before);

    let server = MockServer::start().await;
    mount_section(&server, 200, &SECTION_RESPONSE.replace("rec-2", "rec-9")).await;
    let loader = loader_for(&server);
    let panel = by_id(&doc, "p2");
    assert_eq!(loader.load(&mut doc, panel).await, 0);
    assert_eq!(doc.attr(by_id(&doc, "rec-2"), "data-recommendations-performed"), None);
}

#[tokio::test]
async fn fetch_outcome_reports_why_nothing_came_back() {
    let server = MockServer::start().await;
    mount_section(&server, 404, "").await;
    let loader = loader_for(&server);
    let doc = Document::parse(PANEL);
    let request = RecommendationRequest {
        source: by_id(&doc, "rec-2"),
        element_id: Some("rec-2".into()),
        url: "/recommendations/products?limit=4&product_id=42&section_id=s1&intent=related"
            .into(),
    };

    match loader.fetch_outcome(&request).await {
        LoadOutcome::Failed(reason) => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn relative_urls_need_an_origin() {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap());
    let without = RecommendationLoader::new(fetcher.clone(), None);
    assert!(without.resolve("/recommendations/products?x=1").is_err());
    assert_eq!(
        without.resolve("https://shop.test/r?x=1").unwrap().as_str(),
        "https://shop.test/r?x=1"
    );

    let with = RecommendationLoader::new(fetcher, Url::parse("https://shop.test/en/").ok());
    assert_eq!(
        with.resolve("/recommendations/products?limit=4&product_id=1")
            .unwrap()
            .as_str(),
        "https://shop.test/recommendations/products?limit=4&product_id=1"
    );
}
