use crate::{
    NodeId,
    error::{Error, Result},
    geom::{Bounds, Size},
    render::RenderBackend,
};

/// Records each frame's render targets.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    /// Reported viewport.
    pub viewport: Size,
    /// Frames begun.
    pub frames: usize,
    /// Targets selected in the current frame, in order.
    pub targets: Vec<(NodeId, Bounds)>,
    /// Fail `select_target` for this node.
    pub fail_on: Option<NodeId>,
    /// True between `begin_frame` and `end_frame`.
    in_frame: bool,
}

impl RecordingBackend {
    /// A backend with a fixed viewport.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Nodes rendered in the last frame, in order.
    pub fn rendered(&self) -> Vec<NodeId> {
        self.targets.iter().map(|(id, _)| *id).collect()
    }

    /// Bounds a node was rendered with in the last frame.
    pub fn bounds_of(&self, node: NodeId) -> Option<Bounds> {
        self.targets
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, b)| *b)
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> Size {
        self.viewport
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.in_frame {
            return Err(Error::Render("frame already begun".into()));
        }
        self.in_frame = true;
        self.frames += 1;
        self.targets.clear();
        Ok(())
    }

    fn select_target(&mut self, node: NodeId, bounds: Bounds) -> Result<()> {
        if !self.in_frame {
            return Err(Error::Render("select_target outside a frame".into()));
        }
        if self.fail_on == Some(node) {
            return Err(Error::Render(format!("refusing to render {node:?}")));
        }
        self.targets.push((node, bounds));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.in_frame = false;
        Ok(())
    }
}
