// GUI Controller - Bridges the Slint window with the lookup controller
//
// This module contains the GuiController which coordinates between:
// - Slint UI (MainWindow)
// - StateManager (view state and change events)
// - LookupController (fetch / search / navigate)
// - SpriteLoader (record artwork)
// - EventLoopBridge (async/GUI coordination)

use crate::metrics::Metrics;
use crate::models::ViewState;
use crate::services::{LookupController, PokeApiClient, SpriteData, SpriteLoader};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use slint::{Image, Rgba8Pixel, SharedPixelBuffer};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

type Lookup = LookupController<PokeApiClient>;

/// GUI Controller that wires up the Slint window with lookups and view state
///
/// - Slint callbacks (search, prev, next) spawn lookups on the tokio runtime
/// - A subscription thread turns [`StateChange`] events into window updates
/// - Sprites are downloaded after their record is displayed and applied only
///   if that record is still the one on screen
///
/// # Example
/// ```ignore
/// let controller = GuiController::new(lookup, sprites, metrics, runtime.handle().clone())?;
/// controller.run()?; // Blocks until the window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Event loop bridge for coordinating between tokio and Slint
    bridge: EventLoopBridge<MainWindow>,

    /// Lookup cycle shared with every callback
    lookup: Arc<Lookup>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `lookup` - Lookup controller; its state manager drives the window
    /// * `sprites` - Sprite downloader
    /// * `metrics` - Session counters
    /// * `tokio_handle` - Handle to the tokio runtime for spawning async tasks
    pub fn new(
        lookup: Arc<Lookup>,
        sprites: Arc<SpriteLoader>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let bridge = EventLoopBridge::new(&ui, tokio_handle, Arc::clone(&metrics));
        let state_manager = Arc::clone(lookup.state());

        Self::sync_ui_with_state(&ui, &state_manager.snapshot());
        Self::setup_callbacks(&ui, &bridge, &lookup, &state_manager);
        Self::setup_state_subscription(&bridge, &state_manager, &sprites, &metrics);

        tracing::info!("GUI controller initialized");

        Ok(Self { ui, bridge, lookup })
    }

    /// Run the GUI (blocks until window is closed)
    ///
    /// The initial record is requested just before the event loop starts.
    pub fn run(self) -> Result<(), slint::PlatformError> {
        let lookup = Arc::clone(&self.lookup);
        self.bridge.spawn_async(move || async move {
            lookup.initialize().await;
        });

        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    /// Synchronize the whole window with a state snapshot, including the search box
    fn sync_ui_with_state(ui: &MainWindow, view: &ViewState) {
        ui.set_search_text(view.search_text.clone().into());
        ui.set_has_sprite(false);
        Self::apply_view(ui, view);

        tracing::debug!("UI synchronized with initial state");
    }

    /// Write the loading flag, error text, and record card from `view`.
    ///
    /// The search box is left alone so typing is never overwritten.
    fn apply_view(ui: &MainWindow, view: &ViewState) {
        ui.set_is_loading(view.is_loading());
        ui.set_error_message(view.error().unwrap_or_default().into());

        match view.record() {
            Some(pokemon) => {
                ui.set_has_record(true);
                ui.set_record_name(pokemon.display_name().into());
                ui.set_record_id(pokemon.id.to_string().into());
                ui.set_record_types(pokemon.types_label().into());
                ui.set_prev_enabled(pokemon.has_previous());
            }
            None => {
                ui.set_has_record(false);
                ui.set_prev_enabled(false);
            }
        }
    }

    /// Set up Slint UI callbacks
    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        lookup: &Arc<Lookup>,
        state_manager: &Arc<StateManager>,
    ) {
        let state = Arc::clone(state_manager);

        // Keep the view state's copy of the search box current
        ui.on_search_edited(move |text| {
            state.set_search_text(text.as_str());
        });

        let bridge_handle = bridge.clone_handle();
        let lookup_clone = Arc::clone(lookup);

        // Search button or Enter in the search box
        ui.on_search_submitted(move |text| {
            tracing::debug!("Search submitted: '{}'", text);

            let lookup = Arc::clone(&lookup_clone);
            let term = text.to_string();
            bridge_handle.spawn_async(move || async move {
                lookup.search(&term).await;
            });
        });

        let bridge_handle = bridge.clone_handle();
        let lookup_clone = Arc::clone(lookup);

        ui.on_previous_clicked(move || {
            tracing::debug!("Prev clicked");
            Self::spawn_navigation(&bridge_handle, &lookup_clone, -1);
        });

        let bridge_handle = bridge.clone_handle();
        let lookup_clone = Arc::clone(lookup);

        ui.on_next_clicked(move || {
            tracing::debug!("Next clicked");
            Self::spawn_navigation(&bridge_handle, &lookup_clone, 1);
        });

        tracing::debug!("UI callbacks configured");
    }

    fn spawn_navigation(bridge: &EventLoopBridgeHandle<MainWindow>, lookup: &Arc<Lookup>, step: i64) {
        let lookup = Arc::clone(lookup);
        bridge.spawn_async(move || async move {
            lookup.navigate(step).await;
        });
    }

    /// Subscribe to state changes and update the window accordingly
    ///
    /// Every event re-renders from a fresh snapshot, so a burst of events
    /// always converges on the latest state.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
        sprites: &Arc<SpriteLoader>,
        metrics: &Arc<Metrics>,
    ) {
        let bridge_handle = bridge.clone_handle();
        let weak_state = Arc::downgrade(state_manager);
        let sprites = Arc::clone(sprites);
        let metrics = Arc::clone(metrics);
        let mut rx = state_manager.subscribe();

        // Holds only a weak reference so the channel closes once the lookup
        // controller and its state manager are dropped
        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                let change = match rx.blocking_recv() {
                    Ok(change) => Some(change),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped, re-rendering",
                            skipped
                        );
                        None
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                };

                let Some(state) = weak_state.upgrade() else {
                    break;
                };

                let Some(change) = change else {
                    Self::refresh_view(&bridge_handle, &state);
                    continue;
                };

                tracing::trace!("State change received: {:?}", change);

                match change {
                    // The search box owns its text while the user types
                    StateChange::SearchTextChanged { .. } => {}

                    StateChange::StaleResponseDiscarded { seq, latest } => {
                        tracing::debug!(
                            "Response for lookup #{} ignored, #{} is newer",
                            seq,
                            latest
                        );
                    }

                    StateChange::RecordLoaded { id, name } => {
                        tracing::debug!("Displaying record {} ({})", id, name);
                        bridge_handle.update_ui(|ui| ui.set_has_sprite(false));
                        Self::refresh_view(&bridge_handle, &state);

                        let sprite_url = state.read(|s| {
                            s.record()
                                .filter(|p| p.id == id)
                                .and_then(|p| p.sprite_url.clone())
                        });
                        if let Some(url) = sprite_url {
                            Self::spawn_sprite_load(
                                &bridge_handle,
                                &state,
                                &sprites,
                                &metrics,
                                id,
                                url,
                            );
                        }
                    }

                    StateChange::LookupFailed { .. } | StateChange::DisplayCleared => {
                        bridge_handle.update_ui(|ui| ui.set_has_sprite(false));
                        Self::refresh_view(&bridge_handle, &state);
                    }

                    StateChange::LookupStarted { .. } | StateChange::LoadingFinished => {
                        Self::refresh_view(&bridge_handle, &state);
                    }
                }
            }

            tracing::debug!("State subscription thread terminated");
        });
    }

    fn refresh_view(bridge: &EventLoopBridgeHandle<MainWindow>, state: &StateManager) {
        let view = state.snapshot();
        bridge.update_ui(move |ui| Self::apply_view(ui, &view));
    }

    /// Download and show the sprite for record `id`
    fn spawn_sprite_load(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state: &Arc<StateManager>,
        sprites: &Arc<SpriteLoader>,
        metrics: &Arc<Metrics>,
        id: u32,
        url: String,
    ) {
        let bridge_for_task = bridge.clone();
        let state = Arc::clone(state);
        let sprites = Arc::clone(sprites);
        let metrics = Arc::clone(metrics);

        bridge.spawn_async(move || async move {
            let sprite = match sprites.load(&url).await {
                Ok(sprite) => sprite,
                Err(e) => {
                    metrics.record_sprite_failure();
                    tracing::warn!("Sprite for record {} unavailable: {}", id, e);
                    return;
                }
            };

            metrics.record_sprite_loaded();
            bridge_for_task.update_ui(move |ui| {
                // The record may have changed while the sprite was downloading
                if state.read(|s| s.record().map(|p| p.id)) == Some(id) {
                    ui.set_sprite(Self::sprite_image(&sprite));
                    ui.set_has_sprite(true);
                }
            });
        });
    }

    fn sprite_image(sprite: &SpriteData) -> Image {
        let buffer = SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
            &sprite.rgba,
            sprite.width,
            sprite.height,
        );
        Image::from_rgba8(buffer)
    }
}
