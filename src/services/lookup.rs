use super::pokeapi::PokemonSource;
use crate::metrics::Metrics;
use crate::models::{DEFAULT_INITIAL_QUERY, Pokemon, Query};
use crate::state::{Resolution, StateManager};
use std::sync::Arc;
use std::time::Instant;

/// Result of one fetch cycle as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The record is now displayed
    Loaded { id: u32 },

    /// The error message is now displayed and the record cleared
    Failed { message: String },

    /// A newer lookup was issued before this one resolved; nothing changed
    Superseded { seq: u64 },
}

/// Drives the fetch / search / navigate cycle
///
/// Every operation funnels into [`fetch`](Self::fetch), which tags the request
/// with a sequence number through the [`StateManager`] and applies the
/// response only if no newer request was issued meanwhile. Controls are never
/// locked while a lookup is outstanding; overlapping requests simply race and
/// the newest one wins.
///
/// # Example
/// ```ignore
/// let client = Arc::new(PokeApiClient::new(DEFAULT_API_BASE_URL, None)?);
/// let controller = LookupController::new(client, state_manager, metrics);
///
/// controller.initialize().await;          // shows "ditto"
/// controller.navigate(1).await;           // shows #133
/// controller.search("Pikachu").await;     // GET .../pikachu
/// ```
pub struct LookupController<S> {
    source: Arc<S>,
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
    initial_query: String,
}

impl<S: PokemonSource> LookupController<S> {
    pub fn new(source: Arc<S>, state: Arc<StateManager>, metrics: Arc<Metrics>) -> Self {
        Self {
            source,
            state,
            metrics,
            initial_query: DEFAULT_INITIAL_QUERY.to_string(),
        }
    }

    /// Override the query issued by [`initialize`](Self::initialize)
    pub fn with_initial_query(mut self, query: impl Into<String>) -> Self {
        self.initial_query = query.into();
        self
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    /// Load the initial record shown when the window opens
    pub async fn initialize(&self) -> FetchOutcome {
        tracing::info!("Loading initial record '{}'", self.initial_query);
        self.fetch(Query::name(self.initial_query.clone())).await
    }

    /// Fetch a record and display either it or the error
    pub async fn fetch(&self, query: Query) -> FetchOutcome {
        let seq = self.state.begin_lookup(&query);
        self.metrics.record_lookup_started();
        tracing::info!("Lookup #{} for '{}'", seq, query);

        let started = Instant::now();
        let result = self.source.fetch_pokemon(&query).await;
        self.metrics.record_lookup_time(started.elapsed());

        let (display, outcome) = match result {
            Ok(pokemon) => {
                let id = pokemon.id;
                (Ok(pokemon), FetchOutcome::Loaded { id })
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!("Lookup #{} for '{}' failed: {}", seq, query, message);
                (Err(message.clone()), FetchOutcome::Failed { message })
            }
        };

        match self.state.finish_lookup(seq, display) {
            Resolution::Applied => {
                match &outcome {
                    FetchOutcome::Loaded { id } => {
                        tracing::info!("Lookup #{} loaded record {}", seq, id);
                        self.metrics.record_lookup_succeeded();
                    }
                    _ => self.metrics.record_lookup_failed(),
                }
                outcome
            }
            Resolution::Stale => {
                self.metrics.record_stale_response();
                FetchOutcome::Superseded { seq }
            }
        }
    }

    /// Search by free text.
    ///
    /// Returns `None` without touching state when `term` is blank after trimming.
    /// Otherwise the term is sent as typed, lowercased and with trailing
    /// whitespace dropped (see [`Query::path_segment`]).
    pub async fn search(&self, term: &str) -> Option<FetchOutcome> {
        if term.trim().is_empty() {
            tracing::debug!("Ignoring blank search");
            self.metrics.record_blank_search();
            return None;
        }

        self.state.set_search_text(term);
        Some(self.fetch(Query::name(term)).await)
    }

    /// Step `step` records away from the displayed one.
    ///
    /// Returns `None` when no record is displayed.
    pub async fn navigate(&self, step: i64) -> Option<FetchOutcome> {
        let current = self.state.read(|s| s.record().cloned());
        self.navigate_from(current.as_ref(), step).await
    }

    /// Step `step` records away from `current`, clamping the identifier at 1
    pub async fn navigate_from(&self, current: Option<&Pokemon>, step: i64) -> Option<FetchOutcome> {
        let Some(query) = Query::neighbor_of(current, step) else {
            tracing::debug!("Ignoring navigation by {}: no record loaded", step);
            return None;
        };

        Some(self.fetch(query).await)
    }
}
