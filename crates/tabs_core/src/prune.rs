use tabs_logging::tabs_debug;

use crate::activation::activate;
use crate::dom::Document;
use crate::markup::attr;
use crate::probe::is_panel_empty;
use crate::registry::TabRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Tab ids whose pairs were removed in this pass.
    pub removed_tabs: Vec<String>,
    pub removed_panels: usize,
    /// Whole widget suppressed because no tab survived.
    pub hidden: bool,
    /// Tab activated because none was active after removal.
    pub activated: Option<String>,
}

/// Remove every empty panel along with its tab, then either hide the widget
/// or make sure exactly one tab is active. Safe to call any number of times.
pub fn prune(doc: &mut Document, registry: &TabRegistry) -> PruneReport {
    let mut report = PruneReport::default();

    for panel in registry.panels(doc) {
        if !is_panel_empty(doc, panel) {
            continue;
        }
        let tab_id = doc.attr(panel, attr::LABELLED_BY).map(str::to_owned);
        if registry.remove_panel(doc, panel) {
            report.removed_panels += 1;
            report.removed_tabs.extend(tab_id);
        }
    }

    let root = registry.root();
    let tabs = registry.tabs(doc);
    let Some(&first) = tabs.first() else {
        doc.set_style_property(root, "display", "none");
        report.hidden = true;
        tabs_debug!("Pruned every tab; widget hidden");
        return report;
    };
    doc.remove_style_property(root, "display");

    if registry.active_tab(doc).is_none() {
        if let Some(tab_id) = doc.attr(first, attr::ID).map(str::to_owned) {
            if activate(doc, registry, &tab_id) {
                report.activated = Some(tab_id);
            }
        }
    }

    if report.removed_panels > 0 {
        tabs_debug!(
            "Pruned {} panel(s): {:?}",
            report.removed_panels,
            report.removed_tabs
        );
    }
    report
}
