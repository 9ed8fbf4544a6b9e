use ego_tree::NodeId;

use crate::dom::MutationRecord;
use crate::input::Key;
use crate::recommendations::LoadOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host attached the widget's subtree.
    Mount,
    /// A recommendations fetch issued at mount settled.
    RecommendationsLoaded {
        source: NodeId,
        outcome: LoadOutcome,
    },
    /// Host gave up waiting on outstanding fetches.
    PrimingTimedOut,
    /// Pointer click; `target` is the innermost element hit.
    Click { target: NodeId },
    /// Key press dispatched at `target`.
    KeyDown { target: NodeId, key: Key },
    /// Standing observer delivered records for the panel container.
    PanelsMutated(Vec<MutationRecord>),
    /// Host detached the widget's subtree.
    Unmount,
    /// Fallback for placeholder wiring.
    NoOp,
}
