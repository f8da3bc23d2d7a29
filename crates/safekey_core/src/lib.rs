//! SafeKey Core
//!
//! An in-app secure keyboard overlay. Bound text fields take their input from
//! an on-screen keyboard drawn by the host instead of the platform keyboard,
//! so keystrokes never pass through a third-party input method.
//!
//! # Features
//!
//! - **Debounced visibility**: focus bursts collapse into one show or hide
//!   animation, with forced completion if the host never reports it
//! - **Three faces**: letters with shift / caps-lock, symbols, and a numeric
//!   pad whose digits can be shuffled on every entry
//! - **Selection-aware editing**: insert replaces the selection, delete
//!   removes it or the character before the caret
//! - **Scroll compensation**: the enclosing content shifts so the active
//!   field is never covered, and shifts back exactly on hide
//!
//! # Example
//!
//! ```ignore
//! use safekey_core::prelude::*;
//!
//! let mut overlay = OverlayController::new(OverlayConfig::default(), collaborators);
//! overlay.bind(password_field);
//!
//! // On the host's event loop
//! overlay.pump();
//! overlay.advance(frame_time);
//! overlay.key_pressed(code);
//! ```

pub mod case;
pub mod config;
pub mod controller;
pub mod editing;
pub mod error;
pub mod focus;
pub mod key;
pub mod randomizer;
pub mod render;
pub mod scroll;
pub mod timer;
pub mod visibility;

pub use case::{CaseState, CaseTransformer};
pub use config::{OverlayConfig, OverlayOption};
pub use controller::{Collaborators, OverlayController};
pub use editing::{EditBuffer, EditResult, EditingEngine};
pub use error::{ConfigError, OverlayError, Result};
pub use focus::{FocusDecision, FocusRouter, FocusTarget};
pub use key::{codes, Key, KeyAction, KeyLayout, LayoutKind};
pub use randomizer::{DigitPermutation, DigitRandomizer};
pub use render::{AnimationKind, AnimationToken, RecordingRenderer, RenderCall, Renderer};
pub use scroll::{ScrollAdjustment, ScrollCompensator};
pub use timer::{DeferredQueue, TaskId};
pub use visibility::{Effect, OverlayVisibility, VisibilityScheduler};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OverlayConfig, OverlayOption};
    pub use crate::controller::{Collaborators, OverlayController};
    pub use crate::key::{codes, KeyAction, KeyLayout, LayoutKind};
    pub use crate::render::{AnimationKind, AnimationToken, Renderer};
    pub use crate::visibility::OverlayVisibility;
    pub use crate::CaseState;
    pub use safekey_platform::prelude::*;
}
