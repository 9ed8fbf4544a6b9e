use crate::recommendations::RecommendationRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchRecommendations(RecommendationRequest),
    /// Broadcast a layout change so dependants (carousels) can re-measure.
    NotifyLayoutChanged,
    /// Suppress the default action of the key event being handled.
    SuppressDefault,
}
