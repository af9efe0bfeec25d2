// EventLoopBridge - Coordinates between the tokio runtime and the Slint event loop
//
// Lookups and sprite downloads run on tokio worker threads, while every
// property write on the window must happen on Slint's event loop thread.
// The bridge forwards update closures from the former to the latter through
// a bounded channel and a small relay thread.

use crate::metrics::Metrics;
use slint::ComponentHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the UI update channel
pub const UI_UPDATE_CAPACITY: usize = 100;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Coordinates between the tokio runtime and the Slint event loop
///
/// # Example
/// ```ignore
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone(), metrics);
/// let handle = bridge.clone_handle();
///
/// handle.spawn_async(move || async move {
///     let outcome = lookup.navigate(1).await;
///     handle.update_ui(move |ui| ui.set_is_loading(false));
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    handle: EventLoopBridgeHandle<T>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create the bridge and start its relay thread.
    ///
    /// The relay thread exits when every handle is dropped or when the event
    /// loop stops accepting work.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle, metrics: Arc<Metrics>) -> Self {
        let relay_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UI_UPDATE_CAPACITY);

        std::thread::Builder::new()
            .name("pokeinfo-ui-relay".to_string())
            .spawn(move || {
                tracing::debug!("EventLoopBridge relay thread started");

                while let Some(update_fn) = ui_update_rx.blocking_recv() {
                    let result = relay_weak.upgrade_in_event_loop(move |ui| {
                        update_fn(&ui);
                    });

                    if let Err(e) = result {
                        tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                        break;
                    }
                }

                tracing::debug!("EventLoopBridge relay thread terminated");
            })
            .map_err(|e| tracing::error!("Failed to spawn UI relay thread: {}", e))
            .ok();

        Self {
            handle: EventLoopBridgeHandle {
                tokio_handle,
                ui_update_tx,
                metrics,
            },
        }
    }

    /// Spawn an async task on the tokio runtime from a Slint callback
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn_async(future_factory);
    }

    /// Cloneable handle for capture in Slint callbacks and tokio tasks
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        self.handle.clone()
    }
}

/// Lightweight handle that can be cloned and passed to callbacks
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread.
    ///
    /// Updates are dropped with a warning when the channel is full.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        match self.ui_update_tx.try_send(Box::new(update)) {
            Ok(_) => self.metrics.record_ui_update(),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_ui_channel_full();
                tracing::warn!("UI update channel full - skipping update to prevent backpressure");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send UI update - relay thread has stopped");
            }
        }
    }

    /// Spawn an async task on the tokio runtime
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }
}
