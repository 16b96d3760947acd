//! Platform Backend Traits
//!
//! Defines the interface every audio-processing backend must provide.
//! The shape follows a browser-style audio graph: a processing context owns
//! nodes, nodes are linked output-to-input, and each node exposes a small set
//! of automatable parameters.

use std::fmt;

use mqt_dsp::FilterParams;
use serde::{Deserialize, Serialize};

use crate::element::MediaElement;
use crate::error::PlatformError;

/// Handle to a node inside one processing context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Run state of a processing context
///
/// Contexts may start suspended; nothing is rendered until resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextState {
    Suspended,
    Running,
}

/// Automatable node parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioParam {
    /// Decibels on filter nodes, linear multiplier on gain nodes
    Gain,
}

/// Live audio-processing session owning all nodes and their connections
///
/// Dropping a context abandons every node it created.
pub trait ProcessingContext: Send {
    fn state(&self) -> ContextState;

    /// Start rendering if suspended
    fn resume(&mut self) -> Result<(), PlatformError>;

    fn sample_rate(&self) -> f32;

    /// The node that reaches the speakers
    fn destination(&self) -> NodeId;

    /// Wrap a media element's output as a source node.
    ///
    /// Fails with [`PlatformError::SourceAlreadyAttached`] if any context
    /// has already done this for the same element.
    fn create_media_element_source(&mut self, element: &MediaElement) -> Result<NodeId, PlatformError>;

    fn create_filter(&mut self, params: FilterParams) -> Result<NodeId, PlatformError>;

    /// Gain node at unity
    fn create_gain(&mut self) -> Result<NodeId, PlatformError>;

    /// Feed `from`'s output into `to`'s input
    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), PlatformError>;

    /// Immediate parameter write, no ramping
    fn set_param(&mut self, node: NodeId, param: AudioParam, value: f32) -> Result<(), PlatformError>;

    fn param(&self, node: NodeId, param: AudioParam) -> Result<f32, PlatformError>;

    /// Pull one interleaved stereo block from the media source through the
    /// graph. `buffer` holds the source samples on entry and the destination
    /// samples on return. Renders silence while suspended.
    fn render(&mut self, buffer: &mut [f32]);
}

/// Factory for processing contexts
pub trait AudioBackend: Send + Sync {
    /// Get the name of this backend (e.g., "Software")
    fn name(&self) -> &'static str;

    fn create_context(&self) -> Result<Box<dyn ProcessingContext>, PlatformError>;
}

/// Callback fired with the new element whenever the page swaps its media element
///
/// Returns whether it wants further notifications; `false` unregisters it.
pub type ElementCallback = Box<dyn FnMut(MediaElement) -> bool + Send>;

/// Source of media elements on the host page
pub trait MediaElementSource {
    /// The element currently on the page, if any
    fn current(&self) -> Option<MediaElement>;

    /// Register `callback` for every future element replacement
    fn on_media_element_changed(&self, callback: ElementCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(12).to_string(), "#12");
    }

    #[test]
    fn test_context_state_serialization() {
        let json = serde_json::to_string(&ContextState::Suspended).unwrap();
        assert_eq!(json, "\"Suspended\"");

        let state: ContextState = serde_json::from_str("\"Running\"").unwrap();
        assert_eq!(state, ContextState::Running);
    }
}
