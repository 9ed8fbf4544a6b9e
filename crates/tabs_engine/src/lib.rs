//! Tabs engine: recommendation fetching and the page host that drives widgets.
mod decode;
mod engine;
mod events;
mod extract;
mod fetch;
mod host;
mod loader;
mod persist;
mod types;

pub use decode::{decode_body, decode_html, DecodeError, DecodedHtml};
pub use engine::EngineHandle;
pub use events::{ChannelEventSink, PageEvent, PageEventSink};
pub use extract::{FragmentExtractor, RecommendationsExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use host::{HostSettings, TabsHost, WidgetId};
pub use loader::RecommendationLoader;
pub use persist::{AtomicFileWriter, PersistError};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobId};
