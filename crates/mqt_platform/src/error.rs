//! Platform Error Types

use thiserror::Error;

use crate::traits::{AudioParam, NodeId};

/// Errors from processing-context operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// The media element already feeds another processing source.
    /// An element can only ever be consumed once.
    #[error("Media element {0} has already been connected to a processing source")]
    SourceAlreadyAttached(u64),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid connection: {from} -> {to}")]
    InvalidConnection { from: NodeId, to: NodeId },

    #[error("Node {node} has no {param:?} parameter")]
    UnsupportedParam { node: NodeId, param: AudioParam },

    #[error("Failed to resume processing context: {0}")]
    ResumeFailed(String),

    #[error("Backend initialization failed: {0}")]
    InitializationFailed(String),

    #[error("DSP error: {0}")]
    Dsp(#[from] mqt_dsp::DspError),
}
