use ego_tree::NodeId;

use crate::dom::Document;
use crate::markup::{attr, class};

/// Decide whether a panel has nothing worth showing.
///
/// A hidden or errored recommendations source is always empty. A source that
/// has been fetched is judged by its result items. A source still waiting on
/// its fetch gets the benefit of the doubt. Panels without a source are judged
/// by their result items alone.
pub fn is_panel_empty(doc: &Document, panel: NodeId) -> bool {
    if let Some(source) = recommendations_source(doc, panel) {
        if doc.has_class(source, class::HIDDEN) || doc.attr(source, attr::ERROR).is_some() {
            return true;
        }
        if is_performed(doc, source) {
            return count_items(doc, panel) == 0;
        }
        return false;
    }

    count_items(doc, panel) == 0
}

pub fn recommendations_source(doc: &Document, panel: NodeId) -> Option<NodeId> {
    doc.select_first(panel, |el| el.has_class(class::RECOMMENDATIONS))
}

pub fn is_performed(doc: &Document, source: NodeId) -> bool {
    doc.attr(source, attr::PERFORMED) == Some("true")
}

pub fn count_items(doc: &Document, scope: NodeId) -> usize {
    doc.select_all(scope, |el| el.has_class(class::RESULT_ITEM))
        .len()
}
