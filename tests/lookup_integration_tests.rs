//! Integration tests for LookupController
//!
//! These tests drive the fetch / search / navigate cycle against a scripted
//! record source and verify:
//! - Which queries reach the source (and how often)
//! - What the view state shows afterwards
//! - That overlapping lookups resolve in favor of the newest one

use pokeinfo::models::{LookupPhase, Pokemon, Query};
use pokeinfo::services::{
    FetchOutcome, LookupController, LookupError, NOT_FOUND_MESSAGE, PokemonSource, parse_pokemon,
};
use pokeinfo::{Metrics, StateManager};
use proptest::prelude::*;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Clone)]
enum Reply {
    Record(Pokemon),
    Malformed(&'static str),
}

/// Record source answering from a script keyed by path segment.
///
/// Unknown keys answer like a 404. Gated keys wait for their release signal
/// before answering, which lets tests control resolution order.
#[derive(Default)]
struct ScriptedSource {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    fn with_record(self, key: &str, pokemon: Pokemon) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), Reply::Record(pokemon));
        self
    }

    fn with_malformed(self, key: &str, body: &'static str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), Reply::Malformed(body));
        self
    }

    fn gate(&self, key: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PokemonSource for ScriptedSource {
    async fn fetch_pokemon(&self, query: &Query) -> Result<Pokemon, LookupError> {
        let key = query.path_segment();
        self.calls.lock().unwrap().push(key.clone());

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let reply = self.replies.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Record(pokemon)) => Ok(pokemon),
            Some(Reply::Malformed(body)) => parse_pokemon(body.as_bytes()),
            None => Err(LookupError::NotFound {
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

struct Harness {
    controller: Arc<LookupController<ScriptedSource>>,
    source: Arc<ScriptedSource>,
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
}

fn harness(source: ScriptedSource) -> Harness {
    let source = Arc::new(source);
    let state = Arc::new(StateManager::new());
    let metrics = Arc::new(Metrics::new());
    let controller = Arc::new(LookupController::new(
        Arc::clone(&source),
        Arc::clone(&state),
        Arc::clone(&metrics),
    ));

    Harness {
        controller,
        source,
        state,
        metrics,
    }
}

fn pokemon(id: u32, name: &str, types: &[&str]) -> Pokemon {
    Pokemon {
        id,
        name: name.to_string(),
        sprite_url: Some(format!("https://sprites.example/{}.png", id)),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

fn ditto() -> Pokemon {
    pokemon(132, "ditto", &["normal"])
}

async fn wait_for_calls(source: &ScriptedSource, count: usize) {
    for _ in 0..1000 {
        if source.calls().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("source saw {:?}, expected {} calls", source.calls(), count);
}

#[tokio::test]
async fn test_initialize_fetches_ditto_once() {
    let h = harness(ScriptedSource::default().with_record("ditto", ditto()));

    let outcome = h.controller.initialize().await;

    assert_eq!(outcome, FetchOutcome::Loaded { id: 132 });
    assert_eq!(h.source.calls(), vec!["ditto".to_string()]);

    let view = h.state.snapshot();
    assert_eq!(view.phase(), LookupPhase::Loaded);
    assert_eq!(view.record(), Some(&ditto()));
    assert!(view.error().is_none());
}

#[tokio::test]
async fn test_initial_query_override() {
    let source = ScriptedSource::default().with_record("mew", pokemon(151, "mew", &["psychic"]));
    let h = harness(source);
    let controller = LookupController::new(
        Arc::clone(&h.source),
        Arc::clone(&h.state),
        Arc::clone(&h.metrics),
    )
    .with_initial_query("Mew");

    assert_eq!(controller.initialize().await, FetchOutcome::Loaded { id: 151 });
    assert_eq!(h.source.calls(), vec!["mew".to_string()]);
}

#[tokio::test]
async fn test_search_sends_lowercase_term() {
    let source = ScriptedSource::default().with_record("pikachu", pokemon(25, "pikachu", &["electric"]));
    let h = harness(source);

    let outcome = h.controller.search("PiKaChU").await;

    assert_eq!(outcome, Some(FetchOutcome::Loaded { id: 25 }));
    assert_eq!(h.source.calls(), vec!["pikachu".to_string()]);
    assert_eq!(h.state.read(|s| s.search_text.clone()), "PiKaChU");
}

#[tokio::test]
async fn test_search_ignores_trailing_whitespace() {
    let source = ScriptedSource::default().with_record("bulbasaur", pokemon(1, "bulbasaur", &["grass"]));
    let h = harness(source);

    let outcome = h.controller.search("Bulbasaur \n").await;

    assert_eq!(outcome, Some(FetchOutcome::Loaded { id: 1 }));
    assert_eq!(h.source.calls(), vec!["bulbasaur".to_string()]);
    assert_eq!(h.state.read(|s| s.search_text.clone()), "Bulbasaur \n");
    assert_eq!(h.state.read(|s| s.error().map(str::to_string)), None);
}

#[tokio::test]
async fn test_search_passes_numeric_text_through() {
    let source = ScriptedSource::default().with_record("25", pokemon(25, "pikachu", &["electric"]));
    let h = harness(source);

    h.controller.search("25").await;

    assert_eq!(h.source.calls(), vec!["25".to_string()]);
}

#[tokio::test]
async fn test_blank_search_is_ignored() {
    let h = harness(ScriptedSource::default().with_record("ditto", ditto()));
    h.controller.initialize().await;
    let before = h.state.snapshot();

    for term in ["", "   ", "\t\n "] {
        assert_eq!(h.controller.search(term).await, None);
    }

    assert_eq!(h.source.calls(), vec!["ditto".to_string()]);
    assert_eq!(h.state.snapshot(), before);
    assert_eq!(h.metrics.blank_searches.load(Ordering::Relaxed), 3);
}

#[tokio::test]
async fn test_navigate_without_record_is_noop() {
    let h = harness(ScriptedSource::default());

    assert_eq!(h.controller.navigate(1).await, None);
    assert_eq!(h.controller.navigate(-1).await, None);

    assert!(h.source.calls().is_empty());
    assert_eq!(h.state.read(|s| s.phase()), LookupPhase::Idle);
}

#[tokio::test]
async fn test_navigate_steps_from_current_record() {
    let source = ScriptedSource::default()
        .with_record("ditto", ditto())
        .with_record("133", pokemon(133, "eevee", &["normal"]))
        .with_record("132", ditto());
    let h = harness(source);
    h.controller.initialize().await;

    assert_eq!(h.controller.navigate(1).await, Some(FetchOutcome::Loaded { id: 133 }));
    assert_eq!(h.controller.navigate(-1).await, Some(FetchOutcome::Loaded { id: 132 }));

    assert_eq!(
        h.source.calls(),
        vec!["ditto".to_string(), "133".to_string(), "132".to_string()]
    );
}

#[tokio::test]
async fn test_navigate_back_from_first_record_is_clamped() {
    let bulbasaur = pokemon(1, "bulbasaur", &["grass", "poison"]);
    let h = harness(ScriptedSource::default().with_record("1", bulbasaur.clone()));

    let outcome = h.controller.navigate_from(Some(&bulbasaur), -1).await;

    assert_eq!(outcome, Some(FetchOutcome::Loaded { id: 1 }));
    assert_eq!(h.source.calls(), vec!["1".to_string()]);
}

#[tokio::test]
async fn test_not_found_clears_record() {
    let h = harness(ScriptedSource::default().with_record("ditto", ditto()));
    h.controller.initialize().await;

    let outcome = h.controller.search("agumon").await;

    assert_eq!(
        outcome,
        Some(FetchOutcome::Failed {
            message: NOT_FOUND_MESSAGE.to_string()
        })
    );
    let view = h.state.snapshot();
    assert_eq!(view.error(), Some("Pokémon not found"));
    assert!(view.record().is_none());
    assert_eq!(view.phase(), LookupPhase::Failed);
}

#[tokio::test]
async fn test_success_body_is_rendered_from_record() {
    let body = br#"{"id":1,"name":"bulbasaur","types":[{"type":{"name":"grass"}}],"sprites":{"front_default":"x.png"}}"#;
    let parsed = parse_pokemon(body).unwrap();
    let h = harness(ScriptedSource::default().with_record("bulbasaur", parsed));

    h.controller.search("bulbasaur").await;

    let view = h.state.snapshot();
    let record = view.record().expect("record displayed");
    assert_eq!(record.id.to_string(), "1");
    assert_eq!(record.name, "bulbasaur");
    assert_eq!(record.types_label(), "grass");
    assert_eq!(record.sprite_url.as_deref(), Some("x.png"));
    assert!(view.error().is_none());
}

#[tokio::test]
async fn test_malformed_body_surfaces_decoder_message() {
    let source = ScriptedSource::default()
        .with_record("ditto", ditto())
        .with_malformed("glitch", "{\"id\":");
    let h = harness(source);
    h.controller.initialize().await;

    let expected = parse_pokemon(b"{\"id\":").unwrap_err().to_string();
    let outcome = h.controller.search("glitch").await;

    assert_eq!(outcome, Some(FetchOutcome::Failed { message: expected.clone() }));
    let view = h.state.snapshot();
    assert_eq!(view.error(), Some(expected.as_str()));
    assert!(view.record().is_none());
}

#[tokio::test]
async fn test_new_lookup_clears_error_immediately() {
    let source = ScriptedSource::default().with_record("ditto", ditto());
    let release = source.gate("ditto");
    let h = harness(source);

    h.controller.search("missingno").await;
    assert_eq!(h.state.read(|s| s.phase()), LookupPhase::Failed);

    let controller = Arc::clone(&h.controller);
    let pending = tokio::spawn(async move { controller.search("ditto").await });
    wait_for_calls(&h.source, 2).await;

    let view = h.state.snapshot();
    assert!(view.error().is_none());
    assert_eq!(view.phase(), LookupPhase::Loading);

    release.send(()).unwrap();
    assert_eq!(pending.await.unwrap(), Some(FetchOutcome::Loaded { id: 132 }));
    assert_eq!(h.state.read(|s| s.phase()), LookupPhase::Loaded);
}

#[tokio::test]
async fn test_out_of_order_responses_keep_newest() {
    let source = ScriptedSource::default()
        .with_record("1", pokemon(1, "bulbasaur", &["grass"]))
        .with_record("2", pokemon(2, "ivysaur", &["grass"]));
    let release_first = source.gate("1");
    let release_second = source.gate("2");
    let h = harness(source);

    let controller = Arc::clone(&h.controller);
    let first = tokio::spawn(async move { controller.fetch(Query::Id(1)).await });
    wait_for_calls(&h.source, 1).await;

    let controller = Arc::clone(&h.controller);
    let second = tokio::spawn(async move { controller.fetch(Query::Id(2)).await });
    wait_for_calls(&h.source, 2).await;

    release_second.send(()).unwrap();
    assert_eq!(second.await.unwrap(), FetchOutcome::Loaded { id: 2 });

    release_first.send(()).unwrap();
    assert_eq!(first.await.unwrap(), FetchOutcome::Superseded { seq: 1 });

    let view = h.state.snapshot();
    assert_eq!(view.record().map(|p| p.id), Some(2));
    assert_eq!(view.phase(), LookupPhase::Loaded);
    assert_eq!(h.metrics.stale_responses.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_stale_failure_does_not_clear_newer_record() {
    let source = ScriptedSource::default().with_record("ditto", ditto());
    let release_missing = source.gate("missingno");
    let h = harness(source);

    let controller = Arc::clone(&h.controller);
    let stale = tokio::spawn(async move { controller.search("missingno").await });
    wait_for_calls(&h.source, 1).await;

    assert_eq!(
        h.controller.search("ditto").await,
        Some(FetchOutcome::Loaded { id: 132 })
    );

    release_missing.send(()).unwrap();
    assert_eq!(stale.await.unwrap(), Some(FetchOutcome::Superseded { seq: 1 }));

    let view = h.state.snapshot();
    assert_eq!(view.record(), Some(&ditto()));
    assert!(view.error().is_none());
}

#[tokio::test]
async fn test_metrics_track_outcomes() {
    let h = harness(ScriptedSource::default().with_record("ditto", ditto()));

    h.controller.initialize().await;
    h.controller.search("nobody").await;
    h.controller.search("  ").await;

    assert_eq!(h.metrics.lookups_started.load(Ordering::Relaxed), 2);
    assert_eq!(h.metrics.lookups_succeeded.load(Ordering::Relaxed), 1);
    assert_eq!(h.metrics.lookups_failed.load(Ordering::Relaxed), 1);
    assert_eq!(h.metrics.blank_searches.load(Ordering::Relaxed), 1);
}

proptest! {
    #[test]
    fn prop_search_issues_one_lowercase_fetch(term in "[A-Za-z0-9 .-]{0,16}") {
        let h = harness(ScriptedSource::default());
        let outcome = tokio_test::block_on(h.controller.search(&term));

        if term.trim().is_empty() {
            prop_assert_eq!(outcome, None);
            prop_assert!(h.source.calls().is_empty());
        } else {
            prop_assert!(outcome.is_some());
            prop_assert_eq!(h.source.calls(), vec![term.to_lowercase().trim_end().to_string()]);
        }
    }

    #[test]
    fn prop_navigate_fetches_clamped_identifier(id in 1u32..2_000, step in -3_000i64..3_000) {
        let current = pokemon(id, "current", &[]);
        let h = harness(ScriptedSource::default());

        tokio_test::block_on(h.controller.navigate_from(Some(&current), step));

        let expected = (i64::from(id) + step).max(1).to_string();
        prop_assert_eq!(h.source.calls(), vec![expected]);
    }
}
