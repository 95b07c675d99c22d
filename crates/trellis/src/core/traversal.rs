//! The traversal token and the deferred-mutation records it guards.
//!
//! While any traversal is active, structural requests are recorded here
//! instead of touching live child vectors. The registry drains them once the
//! outermost traversal has finished.

use scopeguard::guard;

use crate::{
    NodeId,
    core::registry::Registry,
    error::{Error, Result},
    geom::{Bounds, Point},
};

/// What kind of traversal is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalKind {
    /// Per-frame update pass.
    Update,
    /// Render pass.
    Render,
    /// Event dispatch.
    Dispatch,
    /// Lifecycle hooks and events fired by structural changes.
    Lifecycle,
    /// Behavior self tests.
    SelfTest,
}

/// Registry-scoped traversal state. Entered and exited only through
/// [`Registry::traverse`], which restores it even on unwind.
#[derive(Debug, Default)]
pub struct Traversal {
    /// Active traversals, innermost last.
    stack: Vec<TraversalKind>,
}

impl Traversal {
    /// Is any traversal active?
    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    /// The innermost active traversal.
    pub fn current(&self) -> Option<TraversalKind> {
        self.stack.last().copied()
    }

    /// Nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Push a traversal.
    fn enter(&mut self, kind: TraversalKind) {
        self.stack.push(kind);
    }

    /// Pop the innermost traversal.
    fn exit(&mut self) {
        self.stack.pop();
    }
}

/// How a child's geometry is treated when it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    /// Keep the child's offsets; its absolute position follows the new parent.
    #[default]
    Local,
    /// Keep the child's absolute bounds, as resolved when the request is made.
    World,
    /// Keep the child's absolute size, with its left/top corner at a point.
    WorldAt(Point),
}

/// A placement with world bounds captured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Resolved {
    /// Keep offsets.
    Local,
    /// Apply these absolute bounds after linking.
    World(Bounds),
}

/// A queued attach or reparent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FutureChild {
    /// Node to attach.
    pub child: NodeId,
    /// New parent.
    pub parent: NodeId,
    /// Captured placement.
    pub(crate) placement: Resolved,
}

impl FutureChild {
    /// Absolute bounds captured at request time, if the request preserves
    /// world geometry.
    pub fn world_bounds(&self) -> Option<Bounds> {
        match self.placement {
            Resolved::Local => None,
            Resolved::World(b) => Some(b),
        }
    }
}

/// A queued removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanRequest {
    /// Node to detach.
    pub node: NodeId,
    /// Destroy instead of orphaning.
    pub destroy: bool,
}

impl Registry {
    /// The innermost active traversal, if any.
    pub fn traversal(&self) -> Option<TraversalKind> {
        self.traversal.current()
    }

    /// Is a traversal active? Structural operations are deferred while it is.
    pub fn is_traversing(&self) -> bool {
        self.traversal.is_active()
    }

    /// Run `f` inside a traversal scope. The scope is exited when `f`
    /// returns or unwinds.
    pub(crate) fn traverse<R>(&mut self, kind: TraversalKind, f: impl FnOnce(&mut Self) -> R) -> R {
        self.traversal.enter(kind);
        let mut this = guard(self, |r| r.traversal.exit());
        f(&mut this)
    }

    /// Fail if a traversal is active.
    pub(crate) fn ensure_idle(&self, op: &str) -> Result<()> {
        match self.traversal() {
            Some(kind) => Err(Error::Invalid(format!(
                "{op} called during {kind:?} traversal"
            ))),
            None => Ok(()),
        }
    }

    /// Queued attach and reparent requests.
    pub fn pending_children(&self) -> &[FutureChild] {
        &self.future_children
    }

    /// Queued removal and destroy requests.
    pub fn pending_orphans(&self) -> &[OrphanRequest] {
        &self.orphan_queue
    }

    /// Is any deferred structural work outstanding?
    pub fn has_pending_work(&self) -> bool {
        !self.future_children.is_empty()
            || !self.orphan_queue.is_empty()
            || !self.pending_resort.is_empty()
    }
}
