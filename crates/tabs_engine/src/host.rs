use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use tabs_core::markup::class;
use tabs_core::{
    update, Document, Effect, Key, Msg, MutationRecord, NodeId, Phase, WidgetState, WidgetView,
};
use tabs_logging::{tabs_debug, tabs_trace, tabs_warn};

use crate::engine::EngineHandle;
use crate::events::{PageEvent, PageEventSink};
use crate::{EngineEvent, JobId};

/// Observer deliveries per checkpoint before giving up on a widget that keeps
/// mutating its own panels.
const MAX_DELIVERY_ROUNDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSettings {
    /// Reveal a priming widget after this long even if fetches are outstanding.
    pub priming_timeout: Option<Duration>,
}

struct Slot {
    state: WidgetState,
    priming_deadline: Option<Instant>,
}

struct PendingJob {
    widget: WidgetId,
    source: NodeId,
}

/// Owns the page document and drives every widget on it.
///
/// All document mutation happens on the thread that owns the host; fetches
/// run on the engine and come back through [`TabsHost::pump`].
pub struct TabsHost {
    document: Document,
    widgets: BTreeMap<WidgetId, Slot>,
    jobs: HashMap<JobId, PendingJob>,
    engine: EngineHandle,
    sink: Box<dyn PageEventSink>,
    settings: HostSettings,
    next_widget: u64,
    next_job: JobId,
}

impl TabsHost {
    pub fn new(
        document: Document,
        engine: EngineHandle,
        sink: Box<dyn PageEventSink>,
        settings: HostSettings,
    ) -> Self {
        Self {
            document,
            widgets: BTreeMap::new(),
            jobs: HashMap::new(),
            engine,
            sink,
            settings,
            next_widget: 1,
            next_job: 1,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.widgets.keys().copied().collect()
    }

    pub fn widget_root(&self, widget: WidgetId) -> Option<NodeId> {
        self.widgets.get(&widget).map(|slot| slot.state.root())
    }

    pub fn widget_at(&self, root: NodeId) -> Option<WidgetId> {
        self.widgets
            .iter()
            .find(|(_, slot)| slot.state.root() == root)
            .map(|(&id, _)| id)
    }

    pub fn view(&self, widget: WidgetId) -> Option<WidgetView> {
        self.widgets
            .get(&widget)
            .map(|slot| slot.state.view(&self.document))
    }

    pub fn outstanding_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Page load: mount every widget root in the document.
    pub fn boot(&mut self) -> usize {
        let root = self.document.root();
        self.mount_within(root)
    }

    /// A section was (re)rendered: mount the widget roots inside it.
    pub fn section_load(&mut self, section: NodeId) -> usize {
        self.mount_within(section)
    }

    /// A section is going away: unmount its widgets, then detach it.
    pub fn section_unload(&mut self, section: NodeId) -> usize {
        let doomed: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|(_, slot)| {
                let root = slot.state.root();
                root == section || self.document.contains(section, root)
            })
            .map(|(&id, _)| id)
            .collect();
        for &widget in &doomed {
            self.unmount(widget);
        }
        self.document.remove(section);
        doomed.len()
    }

    fn mount_within(&mut self, scope: NodeId) -> usize {
        let mut roots = self
            .document
            .select_all(scope, |el| el.has_class(class::WIDGET_ROOT));
        if self.document.has_class(scope, class::WIDGET_ROOT) {
            roots.insert(0, scope);
        }
        roots
            .into_iter()
            .filter_map(|root| self.mount(root))
            .count()
    }

    /// Mount one widget. Returns `None` when `root` already has a live widget
    /// or declined to initialize.
    pub fn mount(&mut self, root: NodeId) -> Option<WidgetId> {
        if self.widget_at(root).is_some() {
            tabs_debug!("Root already hosts a widget; skipping mount");
            return None;
        }

        let widget = WidgetId(self.next_widget);
        self.next_widget += 1;
        self.widgets.insert(
            widget,
            Slot {
                state: WidgetState::new(root),
                priming_deadline: None,
            },
        );
        self.dispatch(widget, Msg::Mount);

        let slot = self.widgets.get_mut(&widget)?;
        match slot.state.phase() {
            Phase::Uninitialized => {
                self.widgets.remove(&widget);
                None
            }
            Phase::Priming => {
                slot.priming_deadline = self
                    .settings
                    .priming_timeout
                    .map(|timeout| Instant::now() + timeout);
                Some(widget)
            }
            _ => Some(widget),
        }
    }

    pub fn unmount(&mut self, widget: WidgetId) -> bool {
        if !self.widgets.contains_key(&widget) {
            return false;
        }
        self.dispatch(widget, Msg::Unmount);
        self.widgets.remove(&widget);
        true
    }

    pub fn click(&mut self, target: NodeId) {
        if let Some(widget) = self.widget_containing(target) {
            self.dispatch(widget, Msg::Click { target });
        }
    }

    /// Returns whether the key's default action was suppressed.
    pub fn keydown(&mut self, target: NodeId, key: Key) -> bool {
        match self.widget_containing(target) {
            Some(widget) => self.dispatch(widget, Msg::KeyDown { target, key }),
            None => false,
        }
    }

    pub fn focus(&mut self, node: NodeId) -> bool {
        self.document.focus(node)
    }

    /// Apply an outside change to the document (a theme script, an editor)
    /// and let observing widgets react to it.
    pub fn mutate<R>(&mut self, change: impl FnOnce(&mut Document) -> R) -> R {
        let result = change(&mut self.document);
        self.deliver_mutations();
        result
    }

    /// Handle every engine event that is ready and any elapsed priming
    /// deadlines. Returns the number of engine events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.engine.try_recv() {
            self.handle_engine_event(event);
            handled += 1;
        }
        self.expire_priming(Instant::now());
        handled
    }

    /// No fetch outstanding and no widget still priming.
    pub fn is_settled(&self) -> bool {
        self.jobs.is_empty()
            && self
                .widgets
                .values()
                .all(|slot| slot.state.phase() != Phase::Priming)
    }

    /// Block until settled or until `max_wait` elapses. Returns whether the
    /// host settled.
    pub fn run_until_settled(&mut self, max_wait: Duration) -> bool {
        let deadline = Instant::now() + max_wait;
        loop {
            self.pump();
            if self.is_settled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let mut wait = deadline - now;
            if let Some(next) = self.next_priming_deadline() {
                wait = wait.min(next.saturating_duration_since(now));
            }
            if let Some(event) = self.engine.recv_timeout(wait) {
                self.handle_engine_event(event);
            }
        }
    }

    fn next_priming_deadline(&self) -> Option<Instant> {
        self.widgets
            .values()
            .filter_map(|slot| slot.priming_deadline)
            .min()
    }

    fn expire_priming(&mut self, now: Instant) {
        let expired: Vec<WidgetId> = self
            .widgets
            .iter_mut()
            .filter_map(|(&id, slot)| match slot.priming_deadline {
                Some(deadline) if deadline <= now => {
                    slot.priming_deadline = None;
                    Some(id)
                }
                _ => None,
            })
            .collect();
        for widget in expired {
            self.dispatch(widget, Msg::PrimingTimedOut);
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        let EngineEvent::LoadSettled { job_id, outcome } = event;
        let Some(job) = self.jobs.remove(&job_id) else {
            tabs_warn!("Settled job {job_id} was never issued");
            return;
        };
        if !self.widgets.contains_key(&job.widget) {
            tabs_debug!("Dropping job {job_id}; its widget was unmounted");
            return;
        }
        self.dispatch(
            job.widget,
            Msg::RecommendationsLoaded {
                source: job.source,
                outcome,
            },
        );
    }

    fn widget_containing(&self, target: NodeId) -> Option<WidgetId> {
        self.widgets
            .iter()
            .find(|(_, slot)| {
                let root = slot.state.root();
                root == target || self.document.contains(root, target)
            })
            .map(|(&id, _)| id)
    }

    /// Run one message through a widget, execute its effects, then deliver
    /// whatever the observers saw. Returns whether a default was suppressed.
    fn dispatch(&mut self, widget: WidgetId, msg: Msg) -> bool {
        let Some(slot) = self.widgets.get_mut(&widget) else {
            return false;
        };
        let (state, effects) = update(&mut self.document, slot.state.clone(), msg);
        let root = state.root();
        if state.phase() != Phase::Priming {
            slot.priming_deadline = None;
        }
        slot.state = state;

        let mut suppressed = false;
        for effect in effects {
            match effect {
                Effect::FetchRecommendations(request) => {
                    let job_id = self.next_job;
                    self.next_job += 1;
                    self.jobs.insert(
                        job_id,
                        PendingJob {
                            widget,
                            source: request.source,
                        },
                    );
                    tabs_trace!("Job {job_id}: {}", request.url);
                    self.engine.enqueue(job_id, request);
                }
                Effect::NotifyLayoutChanged => self.sink.emit(PageEvent::LayoutChanged { root }),
                Effect::SuppressDefault => suppressed = true,
            }
        }

        self.deliver_mutations();
        suppressed
    }

    /// Checkpoint: hand queued mutation records to their widgets until the
    /// document stops changing.
    fn deliver_mutations(&mut self) {
        for _ in 0..MAX_DELIVERY_ROUNDS {
            if !self.document.has_pending_records() {
                return;
            }
            let batches: Vec<(WidgetId, Vec<MutationRecord>)> = self
                .widgets
                .iter()
                .filter_map(|(&id, slot)| slot.state.observer().map(|observer| (id, observer)))
                .map(|(id, observer)| (id, self.document.take_records(observer)))
                .filter(|(_, records)| !records.is_empty())
                .collect();
            if batches.is_empty() {
                return;
            }
            for (widget, records) in batches {
                self.apply_records(widget, records);
            }
        }
        tabs_warn!("Mutation delivery did not settle after {MAX_DELIVERY_ROUNDS} rounds");
    }

    fn apply_records(&mut self, widget: WidgetId, records: Vec<MutationRecord>) {
        let Some(slot) = self.widgets.get_mut(&widget) else {
            return;
        };
        let (state, effects) = update(
            &mut self.document,
            slot.state.clone(),
            Msg::PanelsMutated(records),
        );
        let root = state.root();
        slot.state = state;
        for effect in effects {
            if effect == Effect::NotifyLayoutChanged {
                self.sink.emit(PageEvent::LayoutChanged { root });
            }
        }
    }
}
