//! MQT Core - Equalizer Graph Controller
//!
//! This crate provides the page-side half of the equalizer:
//! - The fixed filter chain and the controller that owns it
//! - Command decoding and routing from the control surface
//! - Settings persistence and restore on initialization
//! - The session that decides when to initialize and follows element swaps
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Control Surface                         │
//! │   sliders / presets ──JSON──▶ Session ──Ack──▶ sliders      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ dispatch::route
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  EqualizerController                        │
//! │  source ─▶ 10 × peaking ─▶ bass shelf ─▶ gain ─▶ destination│
//! │                  (mqt_platform ProcessingContext)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod controller;
pub mod dispatch;
mod error;
mod graph;
mod lenient;
mod message;
mod session;
mod settings;

pub use config::ChainConfig;
pub use controller::{ControllerState, EqualizerController, GraphSnapshot};
pub use error::{EqError, EqResult};
pub use message::{Ack, Command};
pub use session::{PageEvent, Session};
pub use settings::{ensure_defaults, JsonFileStore, MemoryStore, SettingsRecord, SettingsStore};

// Re-export DSP types for convenience
pub use mqt_dsp::{presets, EQ_BANDS, NUM_BANDS};
