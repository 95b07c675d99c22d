use std::time::{Duration, Instant};

use tracing::debug;

use crate::{
    core::{registry::Registry, tree::Maintenance},
    error::Result,
    render::RenderBackend,
};

/// Counts from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frame number the work ran in.
    pub frame: u64,
    /// Queued events delivered.
    pub events: usize,
    /// Structural maintenance performed after the passes.
    pub maintenance: Maintenance,
    /// Wall time spent in the frame.
    pub elapsed: Duration,
}

/// The per-frame driver owned by the host loop.
#[derive(Default)]
pub struct Scene {
    /// The node registry.
    pub registry: Registry,
    /// Stats from the most recent frame.
    last: Option<FrameStats>,
}

impl Scene {
    /// A scene with a fresh registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            last: None,
        }
    }

    /// Stats from the most recent frame.
    pub fn last_frame(&self) -> Option<FrameStats> {
        self.last
    }

    /// Run one frame: size the stage to the viewport, flush queued events,
    /// update, render, run maintenance and advance the frame counter.
    pub fn frame(&mut self, backend: &mut dyn RenderBackend) -> Result<FrameStats> {
        self.frame_at(backend, Instant::now())
    }

    /// Run one frame with garbage collection judged at `now`.
    pub fn frame_at(&mut self, backend: &mut dyn RenderBackend, now: Instant) -> Result<FrameStats> {
        let start = Instant::now();
        let frame = self.registry.frame();
        self.registry.resize_stage(backend.viewport())?;
        let events = self.registry.flush_events()?;
        self.registry.update()?;
        self.registry.render(backend)?;
        let maintenance = self.registry.maintain_at(now)?;
        self.registry.advance_frame();
        let stats = FrameStats {
            frame,
            events,
            maintenance,
            elapsed: start.elapsed(),
        };
        debug!(
            frame,
            events,
            collected = maintenance.collected,
            nodes = self.registry.len(),
            "frame complete"
        );
        self.last = Some(stats);
        Ok(stats)
    }
}
