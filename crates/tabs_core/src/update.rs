use ego_tree::NodeId;
use tabs_logging::{tabs_debug, tabs_info, tabs_trace, tabs_warn};

use crate::activation::activate;
use crate::dom::{Document, ObserveOptions};
use crate::input::{route_click, route_key, Key};
use crate::markup::{attr, class};
use crate::probe::recommendations_source;
use crate::prune::prune;
use crate::recommendations::{apply_load, plan_load, LoadOutcome, LoadPlan};
use crate::registry::TabRegistry;
use crate::{Effect, Msg, Phase, WidgetState};

/// Applies a message to one widget and returns any effects for the host.
///
/// All document mutation for the widget happens here, on the caller's thread.
pub fn update(doc: &mut Document, mut state: WidgetState, msg: Msg) -> (WidgetState, Vec<Effect>) {
    let effects = match msg {
        Msg::Mount => mount(doc, &mut state),
        Msg::RecommendationsLoaded { source, outcome } => {
            settle_load(doc, &mut state, source, &outcome)
        }
        Msg::PrimingTimedOut => {
            if state.phase == Phase::Priming {
                tabs_warn!(
                    "Revealing widget with {} recommendation fetch(es) outstanding",
                    state.pending_loads
                );
                reveal(doc, &mut state)
            } else {
                Vec::new()
            }
        }
        Msg::Click { target } => click(doc, &state, target),
        Msg::KeyDown { target, key } => keydown(doc, &state, target, &key),
        Msg::PanelsMutated(records) => {
            if state.phase == Phase::Visible {
                tabs_trace!("Re-pruning after {} mutation record(s)", records.len());
                prune_and_notify(doc, &state)
            } else {
                Vec::new()
            }
        }
        Msg::Unmount => {
            unmount(doc, &mut state);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn mount(doc: &mut Document, state: &mut WidgetState) -> Vec<Effect> {
    if state.phase != Phase::Uninitialized
        || state.initialized
        || doc.attr(state.root, attr::INIT) == Some("1")
    {
        tabs_debug!("Widget already initialized; ignoring mount");
        return Vec::new();
    }

    let registry = match TabRegistry::locate(doc, state.root) {
        Ok(registry) => registry,
        Err(err) => {
            tabs_debug!("Widget declined to initialize: {err}");
            return Vec::new();
        }
    };

    registry.synthesize_missing_tabs(doc);

    let root = state.root;
    state.initialized = true;
    state.busy = true;
    state.registry = Some(registry);
    doc.set_attr(root, attr::INIT, "1");
    doc.set_attr(root, attr::ARIA_BUSY, "true");
    doc.set_style_property(root, "visibility", "hidden");

    let mut effects = Vec::new();
    for panel in registry.panels(doc) {
        let Some(source) = recommendations_source(doc, panel) else {
            continue;
        };
        match plan_load(doc, source) {
            LoadPlan::Fetch(request) => {
                state.pending_loads += 1;
                effects.push(Effect::FetchRecommendations(request));
            }
            LoadPlan::AlreadyPerformed(count) if count > 0 => {}
            LoadPlan::AlreadyPerformed(_) | LoadPlan::Malformed => {
                registry.remove_panel(doc, panel);
            }
        }
    }

    state.phase = Phase::Priming;
    tabs_debug!("Priming widget with {} fetch(es)", state.pending_loads);
    if state.pending_loads == 0 {
        effects.extend(reveal(doc, state));
    }
    effects
}

fn settle_load(
    doc: &mut Document,
    state: &mut WidgetState,
    source: NodeId,
    outcome: &LoadOutcome,
) -> Vec<Effect> {
    let Some(registry) = state.registry else {
        tabs_debug!("Ignoring recommendations for an inactive widget");
        return Vec::new();
    };
    if !matches!(state.phase, Phase::Priming | Phase::Visible) {
        return Vec::new();
    }

    if apply_load(doc, source, outcome) == 0 {
        let panel = doc.closest(source, |el| el.has_class(class::PANEL));
        if let Some(panel) = panel.filter(|&p| doc.contains(registry.root(), p)) {
            registry.remove_panel(doc, panel);
        }
    }

    if state.phase == Phase::Priming {
        state.pending_loads = state.pending_loads.saturating_sub(1);
        if state.pending_loads == 0 {
            return reveal(doc, state);
        }
    }
    Vec::new()
}

/// Priming -> Visible.
fn reveal(doc: &mut Document, state: &mut WidgetState) -> Vec<Effect> {
    let Some(registry) = state.registry else {
        return Vec::new();
    };
    let mut effects = Vec::new();

    registry.synthesize_missing_tabs(doc);
    if prune(doc, &registry).activated.is_some() {
        effects.push(Effect::NotifyLayoutChanged);
    }

    state.listeners_wired = true;

    let current = registry
        .active_tab(doc)
        .or_else(|| registry.tabs(doc).first().copied())
        .and_then(|tab| doc.attr(tab, attr::ID).map(str::to_owned));
    if let Some(tab_id) = current {
        if activate(doc, &registry, &tab_id) {
            effects.push(Effect::NotifyLayoutChanged);
        }
    }

    state.observer = Some(doc.observe(
        registry.panel_container(),
        ObserveOptions {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: vec![
                attr::CLASS.to_string(),
                attr::ERROR.to_string(),
                attr::PERFORMED.to_string(),
            ],
        },
    ));

    state.busy = false;
    state.pending_loads = 0;
    doc.remove_attr(state.root, attr::ARIA_BUSY);
    doc.remove_style_property(state.root, "visibility");
    state.phase = Phase::Visible;

    tabs_info!("Widget visible with tabs {:?}", registry.tab_ids(doc));
    effects
}

fn wired_registry(state: &WidgetState) -> Option<TabRegistry> {
    state.registry.filter(|_| state.listeners_wired)
}

fn click(doc: &mut Document, state: &WidgetState, target: NodeId) -> Vec<Effect> {
    let Some(registry) = wired_registry(state) else {
        return Vec::new();
    };
    match route_click(doc, &registry, target) {
        Some(tab_id) if activate(doc, &registry, &tab_id) => vec![Effect::NotifyLayoutChanged],
        _ => Vec::new(),
    }
}

fn keydown(doc: &mut Document, state: &WidgetState, target: NodeId, key: &Key) -> Vec<Effect> {
    let Some(registry) = wired_registry(state) else {
        return Vec::new();
    };
    let Some(step) = route_key(doc, &registry, target, key) else {
        return Vec::new();
    };

    let mut effects = vec![Effect::SuppressDefault];
    doc.focus(step.tab);
    if activate(doc, &registry, &step.tab_id) {
        effects.push(Effect::NotifyLayoutChanged);
    }
    effects
}

fn prune_and_notify(doc: &mut Document, state: &WidgetState) -> Vec<Effect> {
    let Some(registry) = state.registry else {
        return Vec::new();
    };
    if prune(doc, &registry).activated.is_some() {
        vec![Effect::NotifyLayoutChanged]
    } else {
        Vec::new()
    }
}

fn unmount(doc: &mut Document, state: &mut WidgetState) {
    if let Some(observer) = state.observer.take() {
        doc.disconnect(observer);
    }
    if state.initialized {
        doc.remove_attr(state.root, attr::INIT);
    }
    state.listeners_wired = false;
    state.registry = None;
    state.pending_loads = 0;
    state.busy = false;
    state.initialized = false;
    state.phase = Phase::Destroyed;
    tabs_debug!("Widget destroyed");
}
