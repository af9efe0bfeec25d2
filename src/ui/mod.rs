// UI module - Slint window and event loop bridge
//
// This module contains:
// - EventLoopBridge: Coordinates between the tokio runtime and the Slint event loop
// - GuiController: Wires the window to the lookup controller and view state

pub mod bridge;
pub mod controller;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use controller::GuiController;
