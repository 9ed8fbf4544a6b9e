use crate::state::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetView {
    pub phase: Phase,
    /// Tab ids in document order.
    pub tabs: Vec<String>,
    pub active_tab: Option<String>,
    /// `aria-labelledby` of every panel carrying the active class.
    pub active_panels: Vec<String>,
    pub visible: bool,
    pub busy: bool,
}
