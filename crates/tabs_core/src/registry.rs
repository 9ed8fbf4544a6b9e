use ego_tree::NodeId;
use tabs_logging::tabs_warn;

use crate::dom::Document;
use crate::error::MountError;
use crate::markup::{attr, class, DEFAULT_TAB_LABEL};

/// Declarative placeholder a tab button is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub tab_id: String,
    pub panel_id: String,
    pub label: String,
    pub active: bool,
}

impl Seed {
    fn read(doc: &Document, node: NodeId) -> Option<Self> {
        let el = doc.element(node)?;
        let Some(tab_id) = el.attr(attr::SEED_TAB_ID).filter(|id| !id.is_empty()) else {
            tabs_warn!("Skipping tab seed without {}", attr::SEED_TAB_ID);
            return None;
        };
        Some(Self {
            tab_id: tab_id.to_string(),
            panel_id: el.attr(attr::SEED_PANEL_ID).unwrap_or_default().to_string(),
            label: el
                .attr(attr::SEED_LABEL)
                .filter(|label| !label.is_empty())
                .unwrap_or(DEFAULT_TAB_LABEL)
                .to_string(),
            active: el.attr(attr::SEED_ACTIVE) == Some("1"),
        })
    }
}

/// Handles to the structural elements of one widget plus the tab/panel
/// bookkeeping built on them. Everything else is re-read from the live
/// document on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRegistry {
    root: NodeId,
    tablist: NodeId,
    panels: NodeId,
}

impl TabRegistry {
    pub fn locate(doc: &Document, root: NodeId) -> Result<Self, MountError> {
        let tablist = doc
            .select_first(root, |el| el.has_class(class::TABLIST))
            .ok_or(MountError::StructuralMismatch {
                missing: class::TABLIST,
            })?;
        let panels = doc
            .select_first(root, |el| el.has_class(class::PANELS))
            .ok_or(MountError::StructuralMismatch {
                missing: class::PANELS,
            })?;
        Ok(Self {
            root,
            tablist,
            panels,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tablist(&self) -> NodeId {
        self.tablist
    }

    pub fn panel_container(&self) -> NodeId {
        self.panels
    }

    pub fn seeds(&self, doc: &Document) -> Vec<Seed> {
        doc.select_all(self.root, |el| el.has_class(class::TAB_SEED))
            .into_iter()
            .filter_map(|node| Seed::read(doc, node))
            .collect()
    }

    /// Build one tab button per seed, but only while the tab strip is empty.
    /// Returns the number of tabs created.
    pub fn synthesize_missing_tabs(&self, doc: &mut Document) -> usize {
        if !doc.element_children(self.tablist).is_empty() {
            return 0;
        }

        let mut created = 0;
        for seed in self.seeds(doc) {
            let class_value = if seed.active {
                format!("{} {}", class::TAB, class::ACTIVE)
            } else {
                class::TAB.to_string()
            };
            let (selected, tabindex) = if seed.active { ("true", "0") } else { ("false", "-1") };
            let Some(button) = doc.create_element(
                self.tablist,
                "button",
                &[
                    (attr::ID, seed.tab_id.as_str()),
                    (attr::CLASS, class_value.as_str()),
                    (attr::ROLE, "tab"),
                    (attr::ARIA_CONTROLS, seed.panel_id.as_str()),
                    (attr::ARIA_SELECTED, selected),
                    (attr::TABINDEX, tabindex),
                ],
            ) else {
                continue;
            };
            doc.append_text(button, &seed.label);
            created += 1;
        }
        created
    }

    /// Remove the tab with `tab_id`, its seed and every panel labelled by it.
    pub fn remove_tab_and_panel(&self, doc: &mut Document, tab_id: &str) -> bool {
        let mut removed = false;
        let seeds = doc.select_all(self.root, |el| {
            el.has_class(class::TAB_SEED) && el.attr(attr::SEED_TAB_ID) == Some(tab_id)
        });
        for seed in seeds {
            removed |= doc.remove(seed);
        }
        if let Some(tab) = doc.select_first(self.root, |el| el.id() == Some(tab_id)) {
            removed |= doc.remove(tab);
        }
        let panels = doc.select_all(self.root, |el| {
            el.has_class(class::PANEL) && el.attr(attr::LABELLED_BY) == Some(tab_id)
        });
        for panel in panels {
            removed |= doc.remove(panel);
        }
        removed
    }

    /// Remove a panel together with the tab it is labelled by.
    pub fn remove_panel(&self, doc: &mut Document, panel: NodeId) -> bool {
        let mut removed = false;
        if let Some(tab_id) = doc.attr(panel, attr::LABELLED_BY).map(str::to_owned) {
            removed |= self.remove_tab_and_panel(doc, &tab_id);
        }
        removed |= doc.remove(panel);
        removed
    }

    pub fn tabs(&self, doc: &Document) -> Vec<NodeId> {
        doc.select_all(self.root, |el| el.has_class(class::TAB))
    }

    pub fn panels(&self, doc: &Document) -> Vec<NodeId> {
        doc.select_all(self.root, |el| el.has_class(class::PANEL))
    }

    pub fn tab_ids(&self, doc: &Document) -> Vec<String> {
        self.tabs(doc)
            .into_iter()
            .filter_map(|tab| doc.attr(tab, attr::ID).map(str::to_owned))
            .collect()
    }

    pub fn active_tab(&self, doc: &Document) -> Option<NodeId> {
        doc.select_first(self.root, |el| {
            el.has_class(class::TAB) && el.has_class(class::ACTIVE)
        })
    }
}
