use std::sync::Arc;

use tabs_core::{
    apply_load, plan_load, recommendations_source, Document, LoadOutcome, LoadPlan, NodeId,
    RecommendationRequest,
};
use tabs_logging::{tabs_debug, tabs_trace};
use url::Url;

use crate::decode::decode_body;
use crate::extract::{FragmentExtractor, RecommendationsExtractor};
use crate::{FailureKind, FetchError, Fetcher};

/// Turns recommendation requests into settled outcomes.
///
/// `data-url` values are usually root-relative; they are resolved against
/// `origin` when one is configured.
pub struct RecommendationLoader {
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn FragmentExtractor>,
    origin: Option<Url>,
}

impl RecommendationLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, origin: Option<Url>) -> Self {
        Self {
            fetcher,
            extractor: Box::new(RecommendationsExtractor),
            origin,
        }
    }

    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = self.origin.as_ref().ok_or_else(|| {
                    FetchError::new(FailureKind::InvalidUrl, format!("no origin to resolve {url}"))
                })?;
                origin
                    .join(url)
                    .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
            }
            Err(err) => Err(FetchError::new(FailureKind::InvalidUrl, err.to_string())),
        }
    }

    /// Fetch and extract without touching any document. Never fails: every
    /// error becomes [`LoadOutcome::Failed`].
    pub async fn fetch_outcome(&self, request: &RecommendationRequest) -> LoadOutcome {
        match self.fetch_fragment(request).await {
            Ok(Some(fragment)) => LoadOutcome::Fragment(fragment),
            Ok(None) => LoadOutcome::NoMatch,
            Err(err) => LoadOutcome::Failed(err.to_string()),
        }
    }

    async fn fetch_fragment(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Option<String>, FetchError> {
        let url = self.resolve(&request.url)?;
        let output = self.fetcher.fetch(url.as_str()).await?;
        tabs_trace!(
            "Fetched {} byte(s) from {}",
            output.metadata.byte_len,
            output.metadata.final_url
        );
        let html = decode_body(&output)?;

        let Some(element_id) = request.element_id.as_deref() else {
            tabs_debug!("Recommendations source has no id; response cannot be matched");
            return Ok(None);
        };
        Ok(self.extractor.extract(&html, element_id))
    }

    /// Load one panel in place and return how many result items it ends up with.
    ///
    /// A source that was already fetched is counted without a request; a
    /// malformed source, a failure, or an empty response all yield 0 and leave
    /// the panel untouched.
    pub async fn load(&self, doc: &mut Document, panel: NodeId) -> usize {
        let Some(source) = recommendations_source(doc, panel) else {
            return 0;
        };
        match plan_load(doc, source) {
            LoadPlan::AlreadyPerformed(count) => count,
            LoadPlan::Malformed => 0,
            LoadPlan::Fetch(request) => {
                let outcome = self.fetch_outcome(&request).await;
                apply_load(doc, source, &outcome)
            }
        }
    }
}
