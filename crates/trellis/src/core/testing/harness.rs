use std::time::Instant;

use super::{backend::RecordingBackend, probe::{Journal, Probe}};
use crate::{
    NodeConfig, NodeId, Placement, Registry, Scene,
    core::scene::FrameStats,
    error::Result,
    geom::Size,
};

/// A scene with a recording backend and a shared journal. Tests build a
/// tree of probes, drive frames and then inspect the journal and backend.
pub struct Harness {
    /// The driven scene.
    pub scene: Scene,
    /// Backend every frame renders to.
    pub backend: RecordingBackend,
    /// Journal shared by every probe the harness creates.
    pub journal: Journal,
}

impl Harness {
    /// A harness with a 100x100 viewport.
    pub fn new() -> Self {
        Self::with_size(Size::new(100.0, 100.0))
    }

    /// A harness with a given viewport.
    pub fn with_size(size: Size) -> Self {
        super::init_logging();
        Self {
            scene: Scene::new(),
            backend: RecordingBackend::new(size),
            journal: Journal::new(),
        }
    }

    /// The registry.
    pub fn registry(&mut self) -> &mut Registry {
        &mut self.scene.registry
    }

    /// The stage.
    pub fn stage(&self) -> NodeId {
        self.scene.registry.stage()
    }

    /// Create a detached probe node named and tagged `name`.
    pub fn probe(&mut self, name: &str, config: NodeConfig) -> Result<NodeId> {
        self.probe_with(Probe::new(name, &self.journal), name, config)
    }

    /// Create a detached node with a customised probe.
    pub fn probe_with(&mut self, probe: Probe, name: &str, config: NodeConfig) -> Result<NodeId> {
        let config = NodeConfig {
            name: Some(name.to_string()),
            ..config
        };
        let id = self.scene.registry.create_with("probe", &config, probe)?;
        Ok(id.into())
    }

    /// Create a probe and attach it under `parent`.
    pub fn child(&mut self, name: &str, parent: NodeId, config: NodeConfig) -> Result<NodeId> {
        let id = self.probe(name, config)?;
        self.scene.registry.add_child(id, parent, Placement::Local)?;
        Ok(id)
    }

    /// Run one frame.
    pub fn frame(&mut self) -> Result<FrameStats> {
        self.scene.frame(&mut self.backend)
    }

    /// Run one frame with garbage collection judged at `now`.
    pub fn frame_at(&mut self, now: Instant) -> Result<FrameStats> {
        self.scene.frame_at(&mut self.backend, now)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
