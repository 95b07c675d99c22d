use crate::{
    NodeId,
    error::Result,
    geom::{Bounds, Size},
};

/// The windowing and drawing layer. The core never draws; it tells the
/// backend which node is about to render and where.
pub trait RenderBackend {
    /// Current viewport size. The stage is resized to this each frame.
    fn viewport(&self) -> Size;

    /// Called once before the render pass.
    fn begin_frame(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called before each node's `on_render`, with its absolute bounds.
    fn select_target(&mut self, node: NodeId, bounds: Bounds) -> Result<()>;

    /// Called once after the render pass.
    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A backend that draws nothing and reports a fixed viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend {
    /// Reported viewport.
    viewport: Size,
}

impl NullBackend {
    /// A null backend with a fixed viewport.
    pub fn new(viewport: Size) -> Self {
        Self { viewport }
    }
}

impl RenderBackend for NullBackend {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn select_target(&mut self, _node: NodeId, _bounds: Bounds) -> Result<()> {
        Ok(())
    }
}
