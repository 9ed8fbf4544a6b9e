use ego_tree::NodeId;

use crate::dom::{Document, ObserverId};
use crate::markup::{attr, class};
use crate::registry::TabRegistry;
use crate::view_model::WidgetView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    /// Recommendation fetches in flight; widget hidden.
    Priming,
    /// Revealed, wired and observing.
    Visible,
    Destroyed,
}

/// Per-instance bookkeeping for one mounted widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetState {
    pub(crate) root: NodeId,
    pub(crate) phase: Phase,
    pub(crate) initialized: bool,
    pub(crate) busy: bool,
    pub(crate) pending_loads: usize,
    pub(crate) listeners_wired: bool,
    pub(crate) observer: Option<ObserverId>,
    pub(crate) registry: Option<TabRegistry>,
}

impl WidgetState {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            phase: Phase::Uninitialized,
            initialized: false,
            busy: false,
            pending_loads: 0,
            listeners_wired: false,
            observer: None,
            registry: None,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads
    }

    pub fn listeners_wired(&self) -> bool {
        self.listeners_wired
    }

    pub fn observer(&self) -> Option<ObserverId> {
        self.observer
    }

    pub fn registry(&self) -> Option<&TabRegistry> {
        self.registry.as_ref()
    }

    pub fn view(&self, doc: &Document) -> WidgetView {
        let (tabs, active_tab, active_panels) = match &self.registry {
            Some(registry) => {
                let active_tab = registry
                    .active_tab(doc)
                    .and_then(|tab| doc.attr(tab, attr::ID).map(str::to_owned));
                let active_panels = registry
                    .panels(doc)
                    .into_iter()
                    .filter(|&panel| doc.has_class(panel, class::ACTIVE))
                    .filter_map(|panel| doc.attr(panel, attr::LABELLED_BY).map(str::to_owned))
                    .collect();
                (registry.tab_ids(doc), active_tab, active_panels)
            }
            None => (Vec::new(), None, Vec::new()),
        };

        WidgetView {
            phase: self.phase,
            tabs,
            active_tab,
            active_panels,
            visible: is_displayed(doc, self.root),
            busy: self.busy,
        }
    }
}

fn is_displayed(doc: &Document, root: NodeId) -> bool {
    doc.is_connected(root)
        && doc.style_property(root, "display").as_deref() != Some("none")
        && doc.style_property(root, "visibility").as_deref() != Some("hidden")
}
