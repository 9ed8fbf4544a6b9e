use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use tabs_core::{LoadOutcome, RecommendationRequest};
use tabs_logging::tabs_error;
use url::Url;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::loader::RecommendationLoader;
use crate::{EngineEvent, FetchError, JobId};

enum EngineCommand {
    Load {
        job_id: JobId,
        request: RecommendationRequest,
    },
}

/// Background IO: a thread owning a tokio runtime that runs recommendation
/// fetches concurrently. Requests go in over one channel, settled outcomes
/// come back over another.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings, origin: Option<Url>) -> Result<Self, FetchError> {
        let fetcher = ReqwestFetcher::new(settings)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), origin))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, origin: Option<Url>) -> Self {
        Self::with_loader(RecommendationLoader::new(fetcher, origin))
    }

    pub fn with_loader(loader: RecommendationLoader) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let loader = Arc::new(loader);

        thread::spawn(move || run(loader, cmd_rx, event_tx));

        Self { cmd_tx, event_rx }
    }

    pub fn enqueue(&self, job_id: JobId, request: RecommendationRequest) {
        if self
            .cmd_tx
            .send(EngineCommand::Load { job_id, request })
            .is_err()
        {
            tabs_error!("Engine thread is gone; job {job_id} will never settle");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run(
    loader: Arc<RecommendationLoader>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => Some(runtime),
        Err(err) => {
            tabs_error!("Failed to start fetch runtime: {err}");
            None
        }
    };

    while let Ok(command) = cmd_rx.recv() {
        let EngineCommand::Load { job_id, request } = command;
        let Some(runtime) = runtime.as_ref() else {
            // Still settle, so waiters are not stuck.
            let _ = event_tx.send(EngineEvent::LoadSettled {
                job_id,
                outcome: LoadOutcome::Failed("fetch runtime unavailable".into()),
            });
            continue;
        };

        let loader = loader.clone();
        let event_tx = event_tx.clone();
        runtime.spawn(async move {
            let outcome = loader.fetch_outcome(&request).await;
            let _ = event_tx.send(EngineEvent::LoadSettled { job_id, outcome });
        });
    }
}
