//! Software Backend
//!
//! Renders the processing graph in-process with the `mqt_dsp` stages.
//! Used by the host driver and by tests that need a real signal path
//! without an audio subsystem.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mqt_dsp::{AudioProcessor, BiquadFilter, DspError, FilterParams, GainStage};
use tracing::{debug, info};

use crate::element::MediaElement;
use crate::error::PlatformError;
use crate::traits::{AudioBackend, AudioParam, ContextState, NodeId, ProcessingContext};

/// Creates [`SoftwareContext`]s at a fixed sample rate
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
    sample_rate: f32,
    start_suspended: bool,
    contexts_created: Arc<AtomicUsize>,
}

impl SoftwareBackend {
    /// Contexts start suspended, like a page context created without a user gesture
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            start_suspended: true,
            contexts_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_start_suspended(mut self, suspended: bool) -> Self {
        self.start_suspended = suspended;
        self
    }

    /// Number of contexts handed out so far (shared between clones)
    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::SeqCst)
    }
}

impl AudioBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "Software"
    }

    fn create_context(&self) -> Result<Box<dyn ProcessingContext>, PlatformError> {
        if !(self.sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(self.sample_rate).into());
        }
        let count = self.contexts_created.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Created software processing context #{} at {}Hz", count, self.sample_rate);

        let state = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(Box::new(SoftwareContext::new(self.sample_rate, state)))
    }
}

enum SoftNode {
    Destination,
    MediaSource { element_id: u64 },
    Filter(BiquadFilter),
    Gain(GainStage),
}

impl SoftNode {
    fn processor_mut(&mut self) -> Option<&mut dyn AudioProcessor> {
        match self {
            SoftNode::Filter(filter) => Some(filter as &mut dyn AudioProcessor),
            SoftNode::Gain(gain) => Some(gain as &mut dyn AudioProcessor),
            SoftNode::Destination | SoftNode::MediaSource { .. } => None,
        }
    }
}

/// Node arena plus link list
pub struct SoftwareContext {
    sample_rate: f32,
    state: ContextState,
    nodes: Vec<SoftNode>,
    links: Vec<(NodeId, NodeId)>,
}

impl SoftwareContext {
    pub fn new(sample_rate: f32, state: ContextState) -> Self {
        Self {
            sample_rate,
            state,
            nodes: vec![SoftNode::Destination],
            links: Vec::new(),
        }
    }

    /// Every connection made so far, in creation order
    pub fn links(&self) -> &[(NodeId, NodeId)] {
        &self.links
    }

    /// Id of the element this context consumed, if any
    pub fn source_element(&self) -> Option<u64> {
        self.nodes.iter().find_map(|n| match n {
            SoftNode::MediaSource { element_id } => Some(*element_id),
            _ => None,
        })
    }

    fn add_node(&mut self, node: SoftNode) -> NodeId {
        self.nodes.push(node);
        NodeId((self.nodes.len() - 1) as u32)
    }

    fn node(&self, id: NodeId) -> Result<&SoftNode, PlatformError> {
        self.nodes.get(id.0 as usize).ok_or(PlatformError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SoftNode, PlatformError> {
        self.nodes.get_mut(id.0 as usize).ok_or(PlatformError::NodeNotFound(id))
    }

    fn source(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| matches!(n, SoftNode::MediaSource { .. }))
            .map(|i| NodeId(i as u32))
    }

    fn next(&self, from: NodeId) -> Option<NodeId> {
        self.links.iter().find(|(f, _)| *f == from).map(|(_, to)| *to)
    }
}

impl ProcessingContext for SoftwareContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), PlatformError> {
        if self.state == ContextState::Suspended {
            debug!("Resuming software context");
            self.state = ContextState::Running;
        }
        Ok(())
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn destination(&self) -> NodeId {
        NodeId(0)
    }

    fn create_media_element_source(&mut self, element: &MediaElement) -> Result<NodeId, PlatformError> {
        if !element.claim_source() {
            return Err(PlatformError::SourceAlreadyAttached(element.id()));
        }
        Ok(self.add_node(SoftNode::MediaSource {
            element_id: element.id(),
        }))
    }

    fn create_filter(&mut self, params: FilterParams) -> Result<NodeId, PlatformError> {
        let filter = BiquadFilter::new(params, self.sample_rate)?;
        Ok(self.add_node(SoftNode::Filter(filter)))
    }

    fn create_gain(&mut self) -> Result<NodeId, PlatformError> {
        Ok(self.add_node(SoftNode::Gain(GainStage::default())))
    }

    fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), PlatformError> {
        let valid = from != to
            && !matches!(self.node(from)?, SoftNode::Destination)
            && !matches!(self.node(to)?, SoftNode::MediaSource { .. });
        if !valid {
            return Err(PlatformError::InvalidConnection { from, to });
        }
        self.links.push((from, to));
        Ok(())
    }

    fn set_param(&mut self, node: NodeId, param: AudioParam, value: f32) -> Result<(), PlatformError> {
        match (self.node_mut(node)?, param) {
            (SoftNode::Filter(filter), AudioParam::Gain) => Ok(filter.set_gain_db(value)?),
            (SoftNode::Gain(gain), AudioParam::Gain) => Ok(gain.set_level(value)?),
            _ => Err(PlatformError::UnsupportedParam { node, param }),
        }
    }

    fn param(&self, node: NodeId, param: AudioParam) -> Result<f32, PlatformError> {
        match (self.node(node)?, param) {
            (SoftNode::Filter(filter), AudioParam::Gain) => Ok(filter.gain_db()),
            (SoftNode::Gain(gain), AudioParam::Gain) => Ok(gain.level()),
            _ => Err(PlatformError::UnsupportedParam { node, param }),
        }
    }

    fn render(&mut self, buffer: &mut [f32]) {
        let Some(mut current) = self.source() else {
            buffer.fill(0.0);
            return;
        };
        if self.state == ContextState::Suspended {
            buffer.fill(0.0);
            return;
        }

        // A chain visits each node at most once; anything longer is a cycle
        for _ in 0..self.nodes.len() {
            let Some(next) = self.next(current) else {
                // Dangling chain never reaches the speakers
                buffer.fill(0.0);
                return;
            };
            if next == self.destination() {
                return;
            }
            if let Some(stage) = self.nodes[next.0 as usize].processor_mut() {
                stage.process(buffer);
            }
            current = next;
        }
        buffer.fill(0.0);
    }
}
