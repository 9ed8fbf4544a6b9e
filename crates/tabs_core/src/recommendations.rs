use ego_tree::NodeId;
use tabs_logging::{tabs_debug, tabs_warn};

use crate::dom::Document;
use crate::markup::attr;
use crate::probe::{count_items, is_performed};

/// One network fetch for a recommendations source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationRequest {
    pub source: NodeId,
    /// `id` of the source element; the response fragment is matched on it.
    pub element_id: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// Already fetched; carries the current item count.
    AlreadyPerformed(usize),
    /// No product id or base url; nothing to fetch.
    Malformed,
    Fetch(RecommendationRequest),
}

/// How a fetch settled, as far as the document is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Inner markup of the matching response element.
    Fragment(String),
    NoMatch,
    Failed(String),
}

pub fn request_url(base: &str, product_id: &str, section_id: &str, intent: &str) -> String {
    format!("{base}&product_id={product_id}&section_id={section_id}&intent={intent}")
}

pub fn plan_load(doc: &Document, source: NodeId) -> LoadPlan {
    if is_performed(doc, source) {
        return LoadPlan::AlreadyPerformed(count_items(doc, source));
    }

    let (Some(product_id), Some(base)) = (
        non_empty_attr(doc, source, attr::PRODUCT_ID),
        non_empty_attr(doc, source, attr::URL),
    ) else {
        tabs_debug!("Recommendations source lacks product id or url; treating as empty");
        return LoadPlan::Malformed;
    };

    LoadPlan::Fetch(RecommendationRequest {
        source,
        element_id: doc.attr(source, attr::ID).map(str::to_owned),
        url: request_url(
            base,
            product_id,
            doc.attr(source, attr::SECTION_ID).unwrap_or_default(),
            doc.attr(source, attr::INTENT).unwrap_or_default(),
        ),
    })
}

fn non_empty_attr<'a>(doc: &'a Document, node: NodeId, name: &str) -> Option<&'a str> {
    doc.attr(node, name).filter(|value| !value.is_empty())
}

/// Merge a settled fetch into the source element and return its item count.
///
/// Only a non-empty fragment touches the document. Results for a source that
/// has since been detached are dropped.
pub fn apply_load(doc: &mut Document, source: NodeId, outcome: &LoadOutcome) -> usize {
    if !doc.is_connected(source) {
        tabs_debug!("Dropping recommendations for a detached source");
        return 0;
    }

    match outcome {
        LoadOutcome::Fragment(markup) if !markup.trim().is_empty() => {
            doc.set_attr(source, attr::PERFORMED, "true");
            doc.set_inner_html(source, markup);
            count_items(doc, source)
        }
        LoadOutcome::Fragment(_) | LoadOutcome::NoMatch => {
            tabs_debug!("Recommendations response had no usable fragment");
            0
        }
        LoadOutcome::Failed(reason) => {
            tabs_warn!("Recommendations fetch failed: {reason}");
            0
        }
    }
}
