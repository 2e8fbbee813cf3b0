//! Live query → result-set pipeline.
//!
//! Raw text (and, on the full surface, filter) changes are debounced,
//! gated on a minimum length, de-duplicated and dispatched to a
//! [`SearchGateway`]. Each dispatch gets a fresh generation number; the
//! previous in-flight call is aborted and any completion whose generation is
//! not the latest one is dropped, so consumers only ever see results in issue
//! order. Gateway failures never escape: they become degraded result sets.
//!
//! ```text
//! set_text ─┐                       ┌─ Searching{generation}
//!           ├─ debounce ─ gate ─ dedupe ─ dispatch ─┤
//! clear ────┘        (no-query set)       └─ Settled(ResultSet)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use super::fallback::FallbackDialect;
use super::gateway::{GatewayError, SearchGateway};
use crate::model::types::{Query, ResultItem, ResultSet, SearchFilters, SearchResponse};

/// Which gateway call a pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Autocomplete box: `quick_search`, text only.
    Instant,
    /// Filtered search: `search` with filters, facets and paging.
    Full,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub surface: Surface,
    pub debounce: Duration,
    /// Queries with fewer trimmed chars never reach the gateway.
    pub min_query_len: usize,
    /// Item cap for the instant surface (the full surface uses its filters).
    pub limit: usize,
    pub fallback: FallbackDialect,
    /// `None` lets a hung call sit until superseded.
    pub request_timeout: Option<Duration>,
}

impl PipelineSettings {
    pub fn instant() -> Self {
        Self {
            surface: Surface::Instant,
            debounce: Duration::from_millis(50),
            min_query_len: 2,
            limit: 10,
            fallback: FallbackDialect::CannedSample,
            request_timeout: None,
        }
    }

    pub fn full() -> Self {
        Self {
            surface: Surface::Full,
            debounce: Duration::from_millis(300),
            min_query_len: 1,
            limit: 20,
            fallback: FallbackDialect::Advisory,
            request_timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A gateway call went out for `query`.
    Searching { generation: u64, query: Query },
    /// The result set for the latest accepted query.
    Settled(ResultSet),
}

#[derive(Debug)]
enum Input {
    Text(String),
    Filters(SearchFilters),
    Clear,
}

enum Fetched {
    Items(Vec<ResultItem>),
    Response(SearchResponse),
}

struct Completion {
    generation: u64,
    query: Query,
    outcome: Result<Fetched, GatewayError>,
}

#[derive(Debug, PartialEq)]
enum Step {
    Wait,
    Emit(ResultSet),
    Dispatch { generation: u64, query: Query },
}

/// Synchronous pipeline state; the driver task feeds it events.
struct PipelineCore {
    settings: PipelineSettings,
    /// Most recent input, not yet past the debounce window.
    pending: Query,
    /// Last query that made it through debounce; the dedupe reference.
    settled: Option<Query>,
    /// Latest issued generation.
    generation: u64,
}

impl PipelineCore {
    fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            pending: Query::default(),
            settled: None,
            generation: 0,
        }
    }

    fn on_input(&mut self, input: Input) {
        self.pending = match input {
            Input::Text(text) => self.pending.with_text(text),
            Input::Filters(filters) => self.pending.with_filters(filters),
            Input::Clear => self.pending.with_text(""),
        };
    }

    /// Debounce window closed (or a clear forced it closed).
    fn settle(&mut self) -> Step {
        if self.settled.as_ref() == Some(&self.pending) {
            debug!(query = %self.pending.text, "search_duplicate_skipped");
            return Step::Wait;
        }
        let query = self.pending.clone();
        self.settled = Some(query.clone());
        self.generation += 1;

        if query.effective_len() < self.settings.min_query_len {
            return Step::Emit(ResultSet::no_query(self.generation));
        }
        Step::Dispatch {
            generation: self.generation,
            query,
        }
    }

    /// Turn a completion into a result set, or `None` when it is stale.
    fn accept(&self, completion: Completion) -> Option<ResultSet> {
        let Completion {
            generation,
            query,
            outcome,
        } = completion;
        if generation != self.generation {
            debug!(
                generation,
                latest = self.generation,
                query = %query.text,
                "search_stale_discarded"
            );
            return None;
        }
        let set = match outcome {
            Ok(Fetched::Items(items)) => ResultSet::matches(generation, items),
            Ok(Fetched::Response(response)) => ResultSet::from_response(generation, response),
            Err(err) => {
                warn!(generation, query = %query.text, "search failed, degrading: {err}");
                let (items, advisory) = self.settings.fallback.degrade(&query.text);
                ResultSet::degraded(generation, items, advisory)
            }
        };
        debug!(generation, items = set.len(), "search_settled");
        Some(set)
    }
}

/// Aborts the wrapped task when dropped.
struct InFlight(JoinHandle<()>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle to a running pipeline. Dropping it tears the pipeline down and
/// closes the event stream.
pub struct QueryPipeline {
    inputs: mpsc::UnboundedSender<Input>,
    _driver: InFlight,
}

impl QueryPipeline {
    /// Start a pipeline on the current tokio runtime.
    pub fn spawn<G: SearchGateway>(
        gateway: Arc<G>,
        settings: PipelineSettings,
    ) -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (inputs, input_rx) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(gateway, PipelineCore::new(settings), input_rx, events));
        (
            Self {
                inputs,
                _driver: InFlight(driver),
            },
            event_rx,
        )
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let _ = self.inputs.send(Input::Text(text.into()));
    }

    pub fn set_filters(&self, filters: SearchFilters) {
        let _ = self.inputs.send(Input::Filters(filters));
    }

    /// Empty the query immediately, superseding anything in flight.
    pub fn clear(&self) {
        let _ = self.inputs.send(Input::Clear);
    }
}

/// Wait for the next settled result set, skipping progress events.
pub async fn next_settled(events: &mut mpsc::UnboundedReceiver<PipelineEvent>) -> Option<ResultSet> {
    while let Some(event) = events.recv().await {
        if let PipelineEvent::Settled(set) = event {
            return Some(set);
        }
    }
    None
}

async fn drive<G: SearchGateway>(
    gateway: Arc<G>,
    mut core: PipelineCore,
    mut inputs: mpsc::UnboundedReceiver<Input>,
    events: mpsc::UnboundedSender<PipelineEvent>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut deadline: Option<Instant> = None;
    let mut in_flight: Option<InFlight> = None;

    loop {
        let step = tokio::select! {
            biased;
            input = inputs.recv() => {
                let Some(input) = input else { break };
                match input {
                    Input::Clear => {
                        deadline = None;
                        core.on_input(Input::Clear);
                        core.settle()
                    }
                    other => {
                        core.on_input(other);
                        deadline = Some(Instant::now() + core.settings.debounce);
                        Step::Wait
                    }
                }
            }
            Some(done) = done_rx.recv() => {
                if let Some(set) = core.accept(done) {
                    in_flight = None;
                    if events.send(PipelineEvent::Settled(set)).is_err() {
                        break;
                    }
                }
                Step::Wait
            }
            () = debounce_elapsed(deadline) => {
                deadline = None;
                core.settle()
            }
        };

        match step {
            Step::Wait => {}
            Step::Emit(set) => {
                in_flight = None;
                if events.send(PipelineEvent::Settled(set)).is_err() {
                    break;
                }
            }
            Step::Dispatch { generation, query } => {
                in_flight = None;
                debug!(generation, query = %query.text, surface = ?core.settings.surface, "search_dispatch");
                if events
                    .send(PipelineEvent::Searching {
                        generation,
                        query: query.clone(),
                    })
                    .is_err()
                {
                    break;
                }
                let gateway = Arc::clone(&gateway);
                let settings = core.settings.clone();
                let done_tx = done_tx.clone();
                in_flight = Some(InFlight(tokio::spawn(async move {
                    let outcome = fetch(gateway.as_ref(), &settings, &query).await;
                    let _ = done_tx.send(Completion {
                        generation,
                        query,
                        outcome,
                    });
                })));
            }
        }
    }
    drop(in_flight);
}

async fn debounce_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn fetch<G: SearchGateway>(
    gateway: &G,
    settings: &PipelineSettings,
    query: &Query,
) -> Result<Fetched, GatewayError> {
    let call = async {
        match settings.surface {
            Surface::Instant => gateway
                .quick_search(query.text.trim(), settings.limit)
                .await
                .map(Fetched::Items),
            Surface::Full => gateway.search(query).await.map(Fetched::Response),
        }
    };
    match settings.request_timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(GatewayError::Timeout(limit))),
        None => call.await,
    }
}
