// State management module
//
// This module provides the StateManager which wraps ViewState with thread-safe access
// using Arc<RwLock<T>>, tags lookups with sequence numbers, and emits change events
// for GUI updates.

use crate::models::{Display, PendingLookup, Pokemon, Query, ViewState};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Search box contents changed
    SearchTextChanged { text: String },

    /// A new lookup was issued and is now the one whose response counts
    LookupStarted { seq: u64, query: String },

    /// No lookup is pending anymore
    LoadingFinished,

    /// A record replaced whatever was displayed
    RecordLoaded { id: u32, name: String },

    /// An error message replaced whatever was displayed
    LookupFailed { message: String },

    /// Neither a record nor an error is displayed
    DisplayCleared,

    /// A response arrived after a newer lookup had been issued and was dropped
    StaleResponseDiscarded { seq: u64, latest: u64 },
}

/// How a finished lookup was handled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The response belonged to the newest lookup and is now displayed
    Applied,

    /// A newer lookup was issued meanwhile; the response was dropped
    Stale,
}

/// Thread-safe view state manager with event emission
///
/// - Provides thread-safe access to [`ViewState`] via `Arc<RwLock<T>>`
/// - Assigns a monotonically increasing sequence number to each lookup and
///   applies only the newest lookup's response
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Related Types
///
/// - [`crate::models::ViewState`]: The underlying state structure
/// - [`crate::services::LookupController`]: Drives lookups through this manager
/// - [`crate::ui::controller::GuiController`]: Primary consumer of state events
pub struct StateManager {
    /// The view state protected by RwLock for thread-safe access
    state: Arc<RwLock<ViewState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> ViewState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let loading = state_manager.read(|state| state.is_loading());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ViewState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut ViewState),
    {
        self.update_with(update_fn).1
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Record the search box contents
    pub fn set_search_text(&self, text: impl Into<String>) -> Vec<StateChange> {
        let text = text.into();
        self.update(|state| state.search_text = text)
    }

    /// Issue a new lookup and return its sequence number.
    ///
    /// Any displayed error is cleared immediately. A displayed record stays
    /// visible until the response arrives.
    pub fn begin_lookup(&self, query: &Query) -> u64 {
        let (seq, _) = self.update_with(|state| {
            state.latest_seq += 1;
            state.pending = Some(PendingLookup {
                seq: state.latest_seq,
                query: query.path_segment(),
            });
            if matches!(state.display, Display::Error(_)) {
                state.display = Display::Empty;
            }
            state.latest_seq
        });

        seq
    }

    /// Apply the outcome of lookup `seq` unless a newer lookup was issued.
    ///
    /// `Ok` displays the record; `Err` displays the message and clears the record.
    pub fn finish_lookup(&self, seq: u64, outcome: Result<Pokemon, String>) -> Resolution {
        let ((resolution, latest), _) = self.update_with(|state| {
            if !state.is_current(seq) {
                return (Resolution::Stale, state.latest_seq);
            }

            state.pending = None;
            state.display = match outcome {
                Ok(pokemon) => Display::Record(pokemon),
                Err(message) => Display::Error(message),
            };
            (Resolution::Applied, state.latest_seq)
        });

        if resolution == Resolution::Stale {
            tracing::debug!("Discarding response for lookup #{} (latest #{})", seq, latest);
            let _ = self
                .state_tx
                .send(StateChange::StaleResponseDiscarded { seq, latest });
        }

        resolution
    }

    /// Apply `update_fn` under the write lock, then emit events for what changed.
    fn update_with<F, R>(&self, update_fn: F) -> (R, Vec<StateChange>)
    where
        F: FnOnce(&mut ViewState) -> R,
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        let output = update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        (output, changes)
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(old: &ViewState, new: &ViewState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.search_text != new.search_text {
            changes.push(StateChange::SearchTextChanged {
                text: new.search_text.clone(),
            });
        }

        if old.pending != new.pending {
            match &new.pending {
                Some(pending) => changes.push(StateChange::LookupStarted {
                    seq: pending.seq,
                    query: pending.query.clone(),
                }),
                None => changes.push(StateChange::LoadingFinished),
            }
        }

        if old.display != new.display {
            changes.push(match &new.display {
                Display::Record(pokemon) => StateChange::RecordLoaded {
                    id: pokemon.id,
                    name: pokemon.name.clone(),
                },
                Display::Error(message) => StateChange::LookupFailed {
                    message: message.clone(),
                },
                Display::Empty => StateChange::DisplayCleared,
            });
        }

        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
