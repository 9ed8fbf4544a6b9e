use tabs_logging::tabs_debug;

use crate::dom::Document;
use crate::markup::{attr, class};
use crate::registry::TabRegistry;

/// Make `tab_id` the single active tab/panel pair.
///
/// Returns true when the activation was applied; the caller owes the page a
/// layout-change notification in that case. Does nothing when either the tab
/// or the panel list is empty, or when no tab carries `tab_id`.
pub fn activate(doc: &mut Document, registry: &TabRegistry, tab_id: &str) -> bool {
    let tabs = registry.tabs(doc);
    let panels = registry.panels(doc);
    if tabs.is_empty() || panels.is_empty() {
        return false;
    }
    if !tabs.iter().any(|&tab| doc.attr(tab, attr::ID) == Some(tab_id)) {
        tabs_debug!("Ignoring activation of unknown tab {tab_id:?}");
        return false;
    }

    for tab in tabs {
        let on = doc.attr(tab, attr::ID) == Some(tab_id);
        doc.toggle_class(tab, class::ACTIVE, on);
        doc.set_attr(tab, attr::ARIA_SELECTED, if on { "true" } else { "false" });
        doc.set_attr(tab, attr::TABINDEX, if on { "0" } else { "-1" });
    }

    for panel in panels {
        let on = doc.attr(panel, attr::LABELLED_BY) == Some(tab_id);
        doc.toggle_class(panel, class::ACTIVE, on);
    }

    true
}
