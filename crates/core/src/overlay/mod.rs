//! Overlay components for selection translation.
//!
//! The overlay is the icon, loading indicator or result tooltip drawn next
//! to the user's selection. Exactly one of them is visible at a time.
//!
//! # Architecture
//!
//! The overlay is split into focused submodules:
//! - [`state`]: State machine types
//! - [`content`]: Tooltip content and sanitization
//! - [`surface`]: The host document abstraction
//! - [`controller`]: Event handling and orchestration
//!
//! # Usage
//!
//! ```ignore
//! use transit_core::overlay::{HeadlessSurface, OverlayController};
//! use transit_core::provider::Task;
//!
//! let mut controller = OverlayController::new(HeadlessSurface::new(viewport));
//! controller.on_selection(tracker_event);
//! controller.translate_with(&transit, Task::Translate).await;
//! ```

pub mod content;
pub mod controller;
pub mod state;
pub mod surface;

// Public API exports
pub use content::OverlayContent;
pub use controller::{OverlayController, TranslationTicket};
pub use state::{OverlayKind, OverlayState};
pub use surface::{HeadlessElement, HeadlessSurface, OverlaySurface};
