use crate::{
    NodeId,
    core::{
        config::NodeConfig,
        registry::Registry,
        traversal::{Placement, TraversalKind},
        tree::Mutation,
    },
    error::Result,
    event::{
        Event, EventType,
        listener::{Callback, ListenerId, ListenerPhase},
    },
    geom::{Bounds, Point},
};

/// Context handed to behaviors and listeners. It is bound to one node and
/// gives access to the whole registry. Structural operations made through it
/// while a traversal is active are queued.
pub trait Context {
    /// The node this context is bound to.
    fn node_id(&self) -> NodeId;

    /// The registry.
    fn registry(&self) -> &Registry;

    /// The registry, mutably.
    fn registry_mut(&mut self) -> &mut Registry;

    /// The active root.
    fn stage(&self) -> NodeId {
        self.registry().stage()
    }

    /// Current frame number.
    fn frame(&self) -> u64 {
        self.registry().frame()
    }

    /// The innermost active traversal.
    fn traversal(&self) -> Option<TraversalKind> {
        self.registry().traversal()
    }

    /// Parent of the bound node.
    fn parent(&self) -> Option<NodeId> {
        self.registry().parent(self.node_id())
    }

    /// Children of the bound node, back to front.
    fn children(&self) -> Vec<NodeId> {
        self.registry().children(self.node_id())
    }

    /// Absolute bounds of the bound node.
    fn bounds(&self) -> Result<Bounds> {
        self.registry().bounds(self.node_id())
    }

    /// Look up a node by name.
    fn get_by_name(&self, name: &str) -> Option<NodeId> {
        self.registry().get_by_name(name)
    }

    /// Mark the bound node dirty.
    fn taint(&mut self) {
        let id = self.node_id();
        self.registry_mut().taint(id);
    }

    /// Create a detached node.
    fn create(&mut self, kind: &str, config: &NodeConfig) -> Result<NodeId> {
        self.registry_mut().create(kind, config)
    }

    /// Attach `child` under `parent`.
    fn add_child(&mut self, child: NodeId, parent: NodeId, placement: Placement) -> Result<Mutation> {
        self.registry_mut().add_child(child, parent, placement)
    }

    /// Attach `child` under the bound node.
    fn add_own_child(&mut self, child: NodeId) -> Result<Mutation> {
        let id = self.node_id();
        self.registry_mut().add_child(child, id, Placement::Local)
    }

    /// Detach `child` from its parent.
    fn remove_child(&mut self, child: NodeId) -> Result<Mutation> {
        self.registry_mut().remove_child(child)
    }

    /// Detach the bound node from its parent.
    fn remove_self(&mut self) -> Result<Mutation> {
        let id = self.node_id();
        self.registry_mut().remove_child(id)
    }

    /// Move `child` under `parent`.
    fn set_parent(&mut self, child: NodeId, parent: NodeId, placement: Placement) -> Result<Mutation> {
        self.registry_mut().set_parent(child, parent, placement)
    }

    /// Destroy a node and its subtree.
    fn destroy(&mut self, node: NodeId) -> Result<Mutation> {
        self.registry_mut().destroy(node)
    }

    /// Set a node's stacking priority.
    fn set_priority(&mut self, node: NodeId, priority: i32) -> Result<()> {
        self.registry_mut().set_priority(node, priority)
    }

    /// Move the bound node's absolute left/top corner.
    fn move_to(&mut self, p: Point) -> Result<()> {
        let id = self.node_id();
        self.registry_mut().move_to(id, p)
    }

    /// Register a listener on any node.
    fn listen(
        &mut self,
        node: NodeId,
        kind: EventType,
        callback: Callback,
        phase: ListenerPhase,
        priority: i32,
    ) -> Result<ListenerId> {
        self.registry_mut()
            .add_event_listener(node, kind, callback, phase, priority)
    }

    /// Dispatch an event immediately.
    fn dispatch(&mut self, target: NodeId, event: Event) -> Result<Event> {
        self.registry_mut().dispatch(target, event)
    }

    /// Queue an event for the next flush.
    fn post(&mut self, target: NodeId, event: Event) -> Result<()> {
        self.registry_mut().post(target, event)
    }
}

/// Context implementation bound to a node in the registry.
pub struct NodeContext<'a> {
    /// Registry being accessed.
    registry: &'a mut Registry,
    /// Node bound to this context.
    node: NodeId,
}

impl<'a> NodeContext<'a> {
    /// Bind a context to a node.
    pub fn new(registry: &'a mut Registry, node: NodeId) -> Self {
        Self { registry, node }
    }
}

impl Context for NodeContext<'_> {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn registry(&self) -> &Registry {
        self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry {
        self.registry
    }
}
