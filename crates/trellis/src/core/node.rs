use std::any::{Any, TypeId};

use crate::{
    behavior::Behavior,
    core::{
        event::listener::Listeners,
        id::NodeId,
        orphan::Retention,
        state::{NodeKind, NodeName},
    },
    geom::{Anchor, Bounds, Edge},
};

/// One anchor per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchors {
    /// Anchor for the left edge.
    pub left: Anchor,
    /// Anchor for the top edge.
    pub top: Anchor,
    /// Anchor for the right edge.
    pub right: Anchor,
    /// Anchor for the bottom edge.
    pub bottom: Anchor,
}

impl Anchors {
    /// The same anchor on all four edges.
    pub fn all(anchor: Anchor) -> Self {
        Self {
            left: anchor,
            top: anchor,
            right: anchor,
            bottom: anchor,
        }
    }

    /// Anchor for an edge.
    pub fn get(&self, edge: Edge) -> Anchor {
        match edge {
            Edge::Left => self.left,
            Edge::Top => self.top,
            Edge::Right => self.right,
            Edge::Bottom => self.bottom,
        }
    }

    /// Replace the anchor for an edge.
    pub fn set(&mut self, edge: Edge, anchor: Anchor) {
        match edge {
            Edge::Left => self.left = anchor,
            Edge::Top => self.top = anchor,
            Edge::Right => self.right = anchor,
            Edge::Bottom => self.bottom = anchor,
        }
    }
}

/// Per-node boolean state and tab settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Disabled nodes and their subtrees skip updates and hit-testing.
    pub enabled: bool,
    /// Hidden nodes and their subtrees skip rendering.
    pub hidden: bool,
    /// Whether the node can be returned by hit-testing.
    pub clickable: bool,
    /// Whether the node participates in tab navigation.
    pub tab_enabled: bool,
    /// Tab ordering key; lower values come first.
    pub tab_priority: i32,
    /// Set by any geometry or flag change, cleared when the node renders.
    pub dirty: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            enabled: true,
            hidden: false,
            clickable: false,
            tab_enabled: false,
            tab_priority: 0,
            dirty: true,
        }
    }
}

/// Core node data stored in the arena.
pub struct Node {
    /// Behavior and state. `None` while the behavior is executing.
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    /// Concrete type of the behavior, for typed access.
    pub(crate) behavior_type: TypeId,

    /// Unique node name.
    pub(crate) name: NodeName,
    /// Category tag the node was created with.
    pub(crate) kind: NodeKind,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, ascending priority.
    pub(crate) children: Vec<NodeId>,

    /// Edge offsets relative to the anchored reference points on the parent.
    pub(crate) offsets: Bounds,
    /// Anchor per edge.
    pub(crate) anchors: Anchors,

    /// User-assigned stacking priority.
    pub(crate) priority: i32,
    /// Dense rank among siblings, derived from priority.
    pub(crate) z_order: usize,

    /// Boolean state.
    pub(crate) flags: Flags,
    /// Event listeners.
    pub(crate) listeners: Listeners,
    /// What happens to the node after it has been detached.
    pub(crate) retention: Retention,
    /// Whether `on_init` has run.
    pub(crate) initialized: bool,
}

impl Node {
    /// Build a detached node.
    pub(crate) fn new(
        name: NodeName,
        kind: NodeKind,
        behavior: Box<dyn Behavior>,
        retention: Retention,
    ) -> Self {
        let behavior_type = Any::type_id(behavior.as_ref());
        Self {
            behavior: Some(behavior),
            behavior_type,
            name,
            kind,
            parent: None,
            children: Vec::new(),
            offsets: Bounds::default(),
            anchors: Anchors::default(),
            priority: 0,
            z_order: 0,
            flags: Flags::default(),
            listeners: Listeners::default(),
            retention,
            initialized: false,
        }
    }

    /// Return the node's name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// Return the node's kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children, back to front.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the raw edge offsets.
    pub fn offsets(&self) -> Bounds {
        self.offsets
    }

    /// Return the per-edge anchors.
    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Return the stacking priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Return the derived sibling rank.
    pub fn z_order(&self) -> usize {
        self.z_order
    }

    /// Return the node's flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Return the retention policy.
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Has `on_init` run?
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Is the behavior currently executing?
    pub fn is_busy(&self) -> bool {
        self.behavior.is_none()
    }

    /// Return the event listeners.
    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }
}
