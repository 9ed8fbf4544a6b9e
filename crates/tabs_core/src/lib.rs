//! Tabs core: document model and the pure widget state machine.
pub mod dom;
pub mod markup;

mod activation;
mod effect;
mod error;
mod input;
mod msg;
mod probe;
mod prune;
mod recommendations;
mod registry;
mod state;
mod update;
mod view_model;

pub use activation::activate;
pub use dom::{
    Document, DomNode, ElementData, MutationKind, MutationRecord, ObserveOptions, ObserverId,
};
pub use effect::Effect;
pub use ego_tree::NodeId;
pub use error::MountError;
pub use input::{route_click, route_key, Key, RovingMove};
pub use msg::Msg;
pub use probe::{count_items, is_panel_empty, is_performed, recommendations_source};
pub use prune::{prune, PruneReport};
pub use recommendations::{
    apply_load, plan_load, request_url, LoadOutcome, LoadPlan, RecommendationRequest,
};
pub use registry::{Seed, TabRegistry};
pub use state::{Phase, WidgetState};
pub use update::update;
pub use view_model::WidgetView;
