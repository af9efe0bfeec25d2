use super::Pokemon;

/// What the record area of the window shows.
///
/// A record and an error can never be displayed together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Empty,
    Record(Pokemon),
    Error(String),
}

/// Coarse lookup phase derived from [`ViewState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// The newest lookup that has been issued but not yet resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingLookup {
    pub seq: u64,
    pub query: String,
}

/// Single source of truth for everything the window renders.
///
/// The whole value lives behind one lock in
/// [`StateManager`](crate::state::StateManager), so readers always observe a
/// consistent combination of search text, record, error, and loading flag.
///
/// # Related Types
///
/// - [`crate::state::StateManager`]: Thread-safe wrapper with event emission
/// - [`crate::state::StateChange`]: Events emitted on mutations
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Last submitted or edited search box contents
    pub search_text: String,

    /// Record card or error message
    pub display: Display,

    /// Lookup whose response will be applied when it arrives
    pub pending: Option<PendingLookup>,

    /// Sequence number of the most recently issued lookup (0 = none yet)
    pub latest_seq: u64,
}

impl ViewState {
    pub fn phase(&self) -> LookupPhase {
        if self.pending.is_some() {
            return LookupPhase::Loading;
        }

        match self.display {
            Display::Empty => LookupPhase::Idle,
            Display::Record(_) => LookupPhase::Loaded,
            Display::Error(_) => LookupPhase::Failed,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Currently displayed record, if any
    pub fn record(&self) -> Option<&Pokemon> {
        match &self.display {
            Display::Record(pokemon) => Some(pokemon),
            _ => None,
        }
    }

    /// Currently displayed error message, if any
    pub fn error(&self) -> Option<&str> {
        match &self.display {
            Display::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a response tagged with `seq` should still be applied
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }
}
