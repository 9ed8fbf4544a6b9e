use ego_tree::NodeId;

use crate::dom::Document;
use crate::markup::{attr, class};
use crate::registry::TabRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Other(String),
}

impl Key {
    /// Map a `KeyboardEvent.key` style name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Where roving focus lands after an arrow key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RovingMove {
    pub tab: NodeId,
    pub tab_id: String,
}

/// Resolve a click inside the tab strip to the id of the tab it hit.
pub fn route_click(doc: &Document, registry: &TabRegistry, target: NodeId) -> Option<String> {
    if !doc.contains(registry.tablist(), target) {
        return None;
    }
    let tab = doc.closest(target, |el| el.has_class(class::TAB))?;
    if !doc.contains(registry.root(), tab) {
        return None;
    }
    doc.attr(tab, attr::ID).map(str::to_owned)
}

/// Resolve an arrow key pressed inside the tab strip to the next tab, with
/// wraparound. `None` means the event is not ours to handle.
pub fn route_key(
    doc: &Document,
    registry: &TabRegistry,
    target: NodeId,
    key: &Key,
) -> Option<RovingMove> {
    let forward = match key {
        Key::ArrowRight => true,
        Key::ArrowLeft => false,
        Key::Other(_) => return None,
    };
    if !doc.contains(registry.tablist(), target) {
        return None;
    }

    let tabs = registry.tabs(doc);
    let current = doc.active_element()?;
    let i = tabs.iter().position(|&tab| tab == current)?;
    let n = tabs.len();
    let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
    let tab = tabs[next];

    Some(RovingMove {
        tab,
        tab_id: doc.attr(tab, attr::ID).unwrap_or_default().to_string(),
    })
}
