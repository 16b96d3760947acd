//! MQT Platform - Audio-Processing Backends
//!
//! This crate provides the boundary between the equalizer and whatever
//! actually renders audio:
//! - Processing contexts that own nodes and their connections
//! - Media elements that may be consumed by exactly one source, ever
//! - A notifier for the page swapping its media element
//!
//! # Backends
//!
//! | Backend  | Renders        | Contexts start |
//! |----------|----------------|----------------|
//! | Software | In-process DSP | Suspended      |
//!
//! # Architecture
//!
//! The core drives every backend through the `AudioBackend` and
//! `ProcessingContext` traits, so it can be exercised without an audio
//! subsystem.

mod element;
mod error;
mod software;
mod traits;

pub use element::{MediaElement, PageElements};
pub use error::PlatformError;
pub use software::{SoftwareBackend, SoftwareContext};
pub use traits::{
    AudioBackend, AudioParam, ContextState, ElementCallback, MediaElementSource, NodeId,
    ProcessingContext,
};

/// Get the default backend for this build
///
/// Returns a boxed trait object that can be used to create processing contexts.
pub fn get_backend(sample_rate: f32) -> Box<dyn AudioBackend> {
    Box::new(SoftwareBackend::new(sample_rate))
}
