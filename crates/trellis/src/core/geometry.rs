//! Anchor-relative geometry.
//!
//! Each edge is stored as an offset from an anchor point on the parent's
//! resolved bounds. Getters resolve the chain from the root down; setters
//! convert absolute values back into offsets.

use std::collections::HashSet;

use tracing::error;

use crate::{
    NodeId,
    core::{node::Node, registry::Registry},
    error::{Error, Result},
    geom::{Anchor, Bounds, Edge, Point},
};

/// Resolve a node's absolute bounds given its parent's.
pub(crate) fn resolve(node: &Node, parent: Option<Bounds>) -> Bounds {
    let Some(parent) = parent else {
        return node.offsets;
    };
    let mut out = Bounds::default();
    for edge in Edge::ALL {
        let reference = node.anchors.get(edge).reference(edge, parent);
        out.set_edge(edge, node.offsets.edge(edge) + reference);
    }
    out
}

impl Registry {
    /// The node followed by its ancestors. A repeated node is a fatal cycle.
    pub(crate) fn parent_chain(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(n) = current {
            if !seen.insert(n) {
                error!(node = ?id, at = ?n, "cycle detected in parent chain");
                return Err(Error::Cycle(id));
            }
            current = self.require(n)?.parent;
            chain.push(n);
        }
        Ok(chain)
    }

    /// Absolute bounds of a node.
    pub fn bounds(&self, id: impl Into<NodeId>) -> Result<Bounds> {
        let id = id.into();
        let mut resolved = None;
        for n in self.parent_chain(id)?.into_iter().rev() {
            resolved = Some(resolve(&self.nodes[n], resolved));
        }
        resolved.ok_or(Error::NodeNotFound(id))
    }

    /// Absolute bounds of a node's parent, or `None` for a parentless node.
    pub fn parent_bounds(&self, id: impl Into<NodeId>) -> Result<Option<Bounds>> {
        let id = id.into();
        match self.require(id)?.parent {
            Some(p) if p == id => {
                error!(node = ?id, "node is its own parent");
                Err(Error::Cycle(id))
            }
            Some(p) => Ok(Some(self.bounds(p)?)),
            None => Ok(None),
        }
    }

    /// Raw offsets of a node.
    pub fn offsets(&self, id: impl Into<NodeId>) -> Result<Bounds> {
        Ok(self.require(id.into())?.offsets)
    }

    /// Absolute position of one edge.
    pub fn edge(&self, id: impl Into<NodeId>, edge: Edge) -> Result<f32> {
        Ok(self.bounds(id)?.edge(edge))
    }

    /// Absolute left edge.
    pub fn left(&self, id: impl Into<NodeId>) -> Result<f32> {
        self.edge(id, Edge::Left)
    }

    /// Absolute top edge.
    pub fn top(&self, id: impl Into<NodeId>) -> Result<f32> {
        self.edge(id, Edge::Top)
    }

    /// Absolute right edge.
    pub fn right(&self, id: impl Into<NodeId>) -> Result<f32> {
        self.edge(id, Edge::Right)
    }

    /// Absolute bottom edge.
    pub fn bottom(&self, id: impl Into<NodeId>) -> Result<f32> {
        self.edge(id, Edge::Bottom)
    }

    /// Width, `|right - left|`.
    pub fn width(&self, id: impl Into<NodeId>) -> Result<f32> {
        Ok(self.bounds(id)?.width())
    }

    /// Height, `|bottom - top|`.
    pub fn height(&self, id: impl Into<NodeId>) -> Result<f32> {
        Ok(self.bounds(id)?.height())
    }

    /// Move one edge to an absolute position.
    pub fn set_edge(&mut self, id: impl Into<NodeId>, edge: Edge, value: f32) -> Result<()> {
        let id = id.into();
        let parent = self.parent_bounds(id)?;
        let node = self.require_mut(id)?;
        let offset = match parent {
            Some(p) => value - node.anchors.get(edge).reference(edge, p),
            None => value,
        };
        node.offsets.set_edge(edge, offset);
        node.flags.dirty = true;
        Ok(())
    }

    /// Move the left edge to an absolute position.
    pub fn set_left(&mut self, id: impl Into<NodeId>, value: f32) -> Result<()> {
        self.set_edge(id, Edge::Left, value)
    }

    /// Move the top edge to an absolute position.
    pub fn set_top(&mut self, id: impl Into<NodeId>, value: f32) -> Result<()> {
        self.set_edge(id, Edge::Top, value)
    }

    /// Move the right edge to an absolute position.
    pub fn set_right(&mut self, id: impl Into<NodeId>, value: f32) -> Result<()> {
        self.set_edge(id, Edge::Right, value)
    }

    /// Move the bottom edge to an absolute position.
    pub fn set_bottom(&mut self, id: impl Into<NodeId>, value: f32) -> Result<()> {
        self.set_edge(id, Edge::Bottom, value)
    }

    /// Set the width by moving the right edge.
    pub fn set_width(&mut self, id: impl Into<NodeId>, width: f32) -> Result<()> {
        let id = id.into();
        let left = self.left(id)?;
        self.set_right(id, left + width)
    }

    /// Set the height by moving the bottom edge.
    pub fn set_height(&mut self, id: impl Into<NodeId>, height: f32) -> Result<()> {
        let id = id.into();
        let top = self.top(id)?;
        self.set_bottom(id, top + height)
    }

    /// Set all four absolute edges.
    pub fn set_bounds(&mut self, id: impl Into<NodeId>, bounds: Bounds) -> Result<()> {
        let id = id.into();
        let parent = self.parent_bounds(id)?;
        let node = self.require_mut(id)?;
        for edge in Edge::ALL {
            let offset = match parent {
                Some(p) => bounds.edge(edge) - node.anchors.get(edge).reference(edge, p),
                None => bounds.edge(edge),
            };
            node.offsets.set_edge(edge, offset);
        }
        node.flags.dirty = true;
        Ok(())
    }

    /// Move the left/top corner to an absolute point, keeping the size.
    pub fn move_to(&mut self, id: impl Into<NodeId>, p: Point) -> Result<()> {
        let id = id.into();
        let bounds = self.bounds(id)?.at(p);
        self.set_bounds(id, bounds)
    }

    /// Translate a node by a delta.
    pub fn move_by(&mut self, id: impl Into<NodeId>, dx: f32, dy: f32) -> Result<()> {
        let id = id.into();
        let bounds = self.bounds(id)?.translate(dx, dy);
        self.set_bounds(id, bounds)
    }

    /// Anchor of one edge.
    pub fn anchor(&self, id: impl Into<NodeId>, edge: Edge) -> Result<Anchor> {
        Ok(self.require(id.into())?.anchors.get(edge))
    }

    /// Reassign one edge's anchor. The absolute edge does not move; the
    /// offset is recomputed against the new reference point.
    pub fn set_anchor(&mut self, id: impl Into<NodeId>, edge: Edge, anchor: Anchor) -> Result<()> {
        let id = id.into();
        let current = self.edge(id, edge)?;
        self.require_mut(id)?.anchors.set(edge, anchor);
        self.set_edge(id, edge, current)
    }

    /// Reassign the left anchor, preserving the absolute edge.
    pub fn set_anchor_left(&mut self, id: impl Into<NodeId>, anchor: Anchor) -> Result<()> {
        self.set_anchor(id, Edge::Left, anchor)
    }

    /// Reassign the top anchor, preserving the absolute edge.
    pub fn set_anchor_top(&mut self, id: impl Into<NodeId>, anchor: Anchor) -> Result<()> {
        self.set_anchor(id, Edge::Top, anchor)
    }

    /// Reassign the right anchor, preserving the absolute edge.
    pub fn set_anchor_right(&mut self, id: impl Into<NodeId>, anchor: Anchor) -> Result<()> {
        self.set_anchor(id, Edge::Right, anchor)
    }

    /// Reassign the bottom anchor, preserving the absolute edge.
    pub fn set_anchor_bottom(&mut self, id: impl Into<NodeId>, anchor: Anchor) -> Result<()> {
        self.set_anchor(id, Edge::Bottom, anchor)
    }

    /// Reassign all four anchors, preserving the absolute bounds.
    pub fn set_anchors(&mut self, id: impl Into<NodeId>, anchor: Anchor) -> Result<()> {
        let id = id.into();
        let bounds = self.bounds(id)?;
        for edge in Edge::ALL {
            self.require_mut(id)?.anchors.set(edge, anchor);
        }
        self.set_bounds(id, bounds)
    }

    /// The deepest visible, enabled, clickable node under a point, searching
    /// the stage front to back.
    pub fn node_at(&self, p: Point) -> Result<Option<NodeId>> {
        self.locate(self.stage(), None, p)
    }

    /// Depth-first search for a hit below `id`.
    fn locate(&self, id: NodeId, parent: Option<Bounds>, p: Point) -> Result<Option<NodeId>> {
        let node = self.require(id)?;
        if node.flags.hidden || !node.flags.enabled {
            return Ok(None);
        }
        let bounds = resolve(node, parent);
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.locate(child, Some(bounds), p)? {
                return Ok(Some(hit));
            }
        }
        if node.flags.clickable && bounds.contains(p) {
            return Ok(Some(id));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeConfig, Placement};

    fn setup() -> Result<(Registry, NodeId, NodeId)> {
        let mut r = Registry::new();
        let stage = r.stage();
        let parent = r.create(
            "node",
            &NodeConfig::named("parent").with_xywh(100.0, 100.0, 200.0, 100.0),
        )?;
        let child = r.create(
            "node",
            &NodeConfig::named("child").with_xywh(10.0, 10.0, 20.0, 20.0),
        )?;
        r.add_child(parent, stage, Placement::Local)?;
        r.add_child(child, parent, Placement::Local)?;
        Ok((r, parent, child))
    }

    #[test]
    fn top_left_resolution() -> Result<()> {
        let (r, _, child) = setup()?;
        assert_eq!(r.bounds(child)?, Bounds::new(110.0, 110.0, 130.0, 130.0));
        assert_eq!(r.width(child)?, 20.0);
        Ok(())
    }

    #[test]
    fn center_and_far_anchors() -> Result<()> {
        let (mut r, parent, child) = setup()?;
        r.require_mut(child)?.anchors.left = Anchor::MiddleCenter;
        r.require_mut(child)?.anchors.bottom = Anchor::BottomRight;
        // parent spans (100,100)-(300,200): center x = 200, bottom y = 200.
        assert_eq!(r.left(child)?, 210.0);
        assert_eq!(r.bottom(child)?, 230.0);
        r.set_width(parent, 100.0)?;
        assert_eq!(r.left(child)?, 160.0);
        Ok(())
    }

    #[test]
    fn setters_round_trip() -> Result<()> {
        let (mut r, _, child) = setup()?;
        r.set_anchors(child, Anchor::BottomRight)?;
        assert_eq!(r.bounds(child)?, Bounds::new(110.0, 110.0, 130.0, 130.0));
        r.set_left(child, 50.0)?;
        assert_eq!(r.left(child)?, 50.0);
        assert_eq!(r.offsets(child)?.left, -250.0);
        Ok(())
    }

    #[test]
    fn width_moves_only_right_edge() -> Result<()> {
        let (mut r, _, child) = setup()?;
        r.set_width(child, 50.0)?;
        r.set_height(child, 5.0)?;
        assert_eq!(r.bounds(child)?, Bounds::new(110.0, 110.0, 160.0, 115.0));
        Ok(())
    }

    #[test]
    fn move_keeps_size() -> Result<()> {
        let (mut r, _, child) = setup()?;
        r.move_to(child, Point::new(0.0, 0.0))?;
        assert_eq!(r.bounds(child)?, Bounds::new(0.0, 0.0, 20.0, 20.0));
        r.move_by(child, 5.0, -5.0)?;
        assert_eq!(r.bounds(child)?, Bounds::new(5.0, -5.0, 25.0, 15.0));
        Ok(())
    }

    #[test]
    fn cycle_is_fatal() -> Result<()> {
        let (mut r, parent, child) = setup()?;
        // Corrupt the tree directly; public operations refuse to do this.
        r.require_mut(parent)?.parent = Some(child);
        let err = r.bounds(child).err();
        assert!(matches!(err, Some(Error::Cycle(_))));
        assert!(err.is_some_and(|e| e.is_fatal()));

        r.require_mut(parent)?.parent = Some(parent);
        assert!(matches!(r.parent_bounds(parent), Err(Error::Cycle(_))));
        Ok(())
    }

    #[test]
    fn hit_testing() -> Result<()> {
        let (mut r, parent, child) = setup()?;
        assert_eq!(r.node_at(Point::new(115.0, 115.0))?, None);
        r.set_clickable(parent, true)?;
        r.set_clickable(child, true)?;
        assert_eq!(r.node_at(Point::new(115.0, 115.0))?, Some(child));
        assert_eq!(r.node_at(Point::new(250.0, 150.0))?, Some(parent));
        assert_eq!(r.node_at(Point::new(5.0, 5.0))?, None);
        r.set_hidden(child, true)?;
        assert_eq!(r.node_at(Point::new(115.0, 115.0))?, Some(parent));
        r.set_enabled(parent, false)?;
        assert_eq!(r.node_at(Point::new(115.0, 115.0))?, None);
        Ok(())
    }
}
