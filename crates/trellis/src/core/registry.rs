use std::{
    any::{Any, TypeId},
    collections::{HashMap, HashSet, VecDeque},
};

use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::{
    behavior::{Behavior, Container},
    core::{
        config::{NodeConfig, Settings},
        context::{Context, NodeContext},
        factory::Factory,
        id::{NodeId, TypedId},
        node::Node,
        orphan::{Orphan, Retention},
        state::{NodeKind, NodeName},
        traversal::{FutureChild, OrphanRequest, Traversal, TraversalKind},
        tree::{Detach, Mutation},
    },
    error::{Error, Result},
    event::{Event, EventType},
    geom::{Bounds, Size},
};

/// Owner of every node. Creates, looks up and destroys nodes, and holds the
/// queues that defer structural changes made during traversals.
pub struct Registry {
    /// Node arena.
    pub(crate) nodes: SlotMap<NodeId, Node>,
    /// Name index.
    names: HashMap<NodeName, NodeId>,
    /// Active root.
    stage: NodeId,
    /// Behavior constructors by kind.
    factory: Factory,
    /// Registry-wide settings.
    settings: Settings,

    /// Active traversal state.
    pub(crate) traversal: Traversal,
    /// Deferred attaches and reparents.
    pub(crate) future_children: Vec<FutureChild>,
    /// Deferred removals and destroys.
    pub(crate) orphan_queue: Vec<OrphanRequest>,
    /// Parents whose children need resorting.
    pub(crate) pending_resort: Vec<NodeId>,
    /// Detached nodes awaiting garbage collection.
    pub(crate) orphans: Vec<Orphan>,
    /// Posted events awaiting a flush.
    pub(crate) events: VecDeque<(NodeId, Event)>,

    /// Frame counter.
    frame: u64,
    /// Counter for generated names.
    generated: u64,
    /// Counter for listener ids.
    pub(crate) next_listener: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with default settings and an empty stage.
    pub fn new() -> Self {
        let settings = Settings::default();
        let stage_name = NodeName::convert(&settings.stage_name);
        Self::build(settings, stage_name)
    }

    /// Create a registry with explicit settings.
    pub fn with_settings(settings: Settings) -> Result<Self> {
        let stage_name = NodeName::try_from(settings.stage_name.as_str())?;
        Ok(Self::build(settings, stage_name))
    }

    /// Construct the registry and its stage node.
    fn build(settings: Settings, stage_name: NodeName) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut stage_node = Node::new(
            stage_name.clone(),
            NodeKind::new("stage"),
            Box::new(Container),
            Retention::RetainUntilManual,
        );
        stage_node.initialized = true;
        let stage = nodes.insert(stage_node);
        let mut names = HashMap::new();
        names.insert(stage_name, stage);
        Self {
            nodes,
            names,
            stage,
            factory: Factory::new(),
            settings,
            traversal: Traversal::default(),
            future_children: Vec::new(),
            orphan_queue: Vec::new(),
            pending_resort: Vec::new(),
            orphans: Vec::new(),
            events: VecDeque::new(),
            frame: 0,
            generated: 0,
            next_listener: 0,
        }
    }

    /// The active root.
    pub fn stage(&self) -> NodeId {
        self.stage
    }

    /// Registry settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The behavior factory.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// The behavior factory, mutably.
    pub fn factory_mut(&mut self) -> &mut Factory {
        &mut self.factory
    }

    /// Register a constructor for a kind.
    pub fn register_kind<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn(&NodeConfig) -> Result<Box<dyn Behavior>> + 'static,
    {
        self.factory.register(kind, constructor);
    }

    /// Current frame number.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance the frame counter, returning the new frame number.
    pub fn advance_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Number of live nodes, including the stage.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the arena empty? Never true while the stage exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does the handle resolve?
    pub fn contains(&self, id: impl Into<NodeId>) -> bool {
        self.nodes.contains_key(id.into())
    }

    /// Borrow a node.
    pub fn node(&self, id: impl Into<NodeId>) -> Option<&Node> {
        self.nodes.get(id.into())
    }

    /// Borrow a node, or fail with `NodeNotFound`.
    pub(crate) fn require(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    /// Mutably borrow a node, or fail with `NodeNotFound`.
    pub(crate) fn require_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// All live node handles, in arena order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    /// Look up a node by name.
    pub fn get_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Look up a node by name, or fail with `NameNotFound`.
    pub fn require_name(&self, name: &str) -> Result<NodeId> {
        self.get_by_name(name)
            .ok_or_else(|| Error::NameNotFound(name.to_string()))
    }

    /// A node's name.
    pub fn name(&self, id: impl Into<NodeId>) -> Option<&NodeName> {
        self.node(id).map(Node::name)
    }

    /// A node's parent.
    pub fn parent(&self, id: impl Into<NodeId>) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// A node's children, back to front.
    pub fn children(&self, id: impl Into<NodeId>) -> Vec<NodeId> {
        self.node(id).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Create a node of a registered kind.
    pub fn create(&mut self, kind: &str, config: &NodeConfig) -> Result<NodeId> {
        let kind = NodeKind::new(kind);
        let behavior = self.factory.build(&kind, config)?;
        self.insert(kind, config, behavior)
    }

    /// Create a node from a JSON object. The `type` key selects the kind and
    /// defaults to `node`.
    pub fn create_from_value(&mut self, value: serde_json::Value) -> Result<NodeId> {
        let config = NodeConfig::from_value(value)?;
        let kind = config.kind.clone().unwrap_or_else(|| "node".into());
        self.create(&kind, &config)
    }

    /// Create a node with an explicit behavior, bypassing the factory.
    pub fn create_with<B>(&mut self, kind: &str, config: &NodeConfig, behavior: B) -> Result<TypedId<B>>
    where
        B: Behavior,
    {
        let id = self.insert(NodeKind::new(kind), config, Box::new(behavior))?;
        Ok(TypedId::new(id))
    }

    /// Insert a node built from a config.
    fn insert(
        &mut self,
        kind: NodeKind,
        config: &NodeConfig,
        behavior: Box<dyn Behavior>,
    ) -> Result<NodeId> {
        let name = match &config.name {
            Some(n) => NodeName::try_from(n.as_str())?,
            None => self.generate_name(&kind),
        };
        if self.names.contains_key(name.as_str()) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        let retention = config
            .retention
            .unwrap_or(self.settings.default_retention);
        let mut node = Node::new(name.clone(), kind, behavior, retention);
        node.offsets = config.offsets();
        node.anchors = config.anchors();
        node.priority = config.priority();
        node.flags = config.flags();
        let id = self.nodes.insert(node);
        debug!(?id, name = %name, kind = %self.nodes[id].kind, "created node");
        self.names.insert(name, id);
        Ok(id)
    }

    /// Pick an unused generated name for a kind.
    fn generate_name(&mut self, kind: &NodeKind) -> NodeName {
        loop {
            let name = NodeName::generated(kind, self.generated);
            self.generated += 1;
            if !self.names.contains_key(name.as_str()) {
                return name;
            }
        }
    }

    /// Typed access to a node's behavior. `None` if the node is missing, the
    /// behavior is currently executing, or it is not a `B`.
    pub fn behavior<B: Behavior>(&self, id: impl Into<NodeId>) -> Option<&B> {
        let b = self.nodes.get(id.into())?.behavior.as_deref()?;
        (b as &dyn Any).downcast_ref::<B>()
    }

    /// Typed mutable access to a node's behavior.
    pub fn behavior_mut<B: Behavior>(&mut self, id: impl Into<NodeId>) -> Option<&mut B> {
        let b = self.nodes.get_mut(id.into())?.behavior.as_deref_mut()?;
        (b as &mut dyn Any).downcast_mut::<B>()
    }

    /// Typed access through a typed handle.
    pub fn get<B: Behavior>(&self, id: TypedId<B>) -> Option<&B> {
        self.behavior::<B>(id)
    }

    /// Typed mutable access through a typed handle.
    pub fn get_mut<B: Behavior>(&mut self, id: TypedId<B>) -> Option<&mut B> {
        self.behavior_mut::<B>(id)
    }

    /// Is the node's behavior a `B`? Works while the behavior is executing.
    pub fn is_a<B: Behavior>(&self, id: impl Into<NodeId>) -> bool {
        self.nodes
            .get(id.into())
            .is_some_and(|n| n.behavior_type == TypeId::of::<B>())
    }

    /// Take a node's behavior out of its slot for a single call.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn Behavior, &mut dyn Context) -> R,
    ) -> Result<R> {
        let node = self.require_mut(id)?;
        let mut behavior = node.behavior.take().ok_or(Error::ReentrantBehavior(id))?;
        let out = {
            let mut ctx = NodeContext::new(self, id);
            f(behavior.as_mut(), &mut ctx)
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
        Ok(out)
    }

    /// Run `on_init` once for a node.
    pub(crate) fn init_node(&mut self, id: NodeId) -> Result<()> {
        match self.nodes.get_mut(id) {
            Some(node) if !node.initialized => node.initialized = true,
            _ => return Ok(()),
        }
        trace!(?id, "init");
        self.with_behavior(id, |b, ctx| b.on_init(ctx))?
    }

    /// Mark a node dirty.
    pub fn taint(&mut self, id: impl Into<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id.into()) {
            node.flags.dirty = true;
        }
    }

    /// Enable or disable a node. Disabled subtrees skip updates and
    /// hit-testing.
    pub fn set_enabled(&mut self, id: impl Into<NodeId>, enabled: bool) -> Result<()> {
        let node = self.require_mut(id.into())?;
        node.flags.enabled = enabled;
        node.flags.dirty = true;
        Ok(())
    }

    /// Show or hide a node. Hidden subtrees skip rendering.
    pub fn set_hidden(&mut self, id: impl Into<NodeId>, hidden: bool) -> Result<()> {
        let node = self.require_mut(id.into())?;
        node.flags.hidden = hidden;
        node.flags.dirty = true;
        Ok(())
    }

    /// Make a node hit-testable or not.
    pub fn set_clickable(&mut self, id: impl Into<NodeId>, clickable: bool) -> Result<()> {
        self.require_mut(id.into())?.flags.clickable = clickable;
        Ok(())
    }

    /// Configure tab navigation for a node.
    pub fn set_tab(&mut self, id: impl Into<NodeId>, enabled: bool, priority: i32) -> Result<()> {
        let node = self.require_mut(id.into())?;
        node.flags.tab_enabled = enabled;
        node.flags.tab_priority = priority;
        Ok(())
    }

    /// Change a node's retention policy.
    pub fn set_retention(&mut self, id: impl Into<NodeId>, retention: Retention) -> Result<()> {
        self.require_mut(id.into())?.retention = retention;
        Ok(())
    }

    /// Return true if `ancestor` appears in the parent chain of `node`,
    /// including `node` itself. A looping chain yields false; attaches check
    /// the chain strictly and fail with `Error::Cycle` instead.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Is the node reachable from the stage?
    pub fn is_on_stage(&self, id: impl Into<NodeId>) -> bool {
        self.is_ancestor(self.stage, id.into())
    }

    /// A subtree in pre-order, including the root.
    pub fn descendants(&self, root: impl Into<NodeId>) -> Vec<NodeId> {
        self.subtree_pre_order(root.into())
    }

    /// Collect a subtree in pre-order, including the root.
    pub(crate) fn subtree_pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            out.push(node_id);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Collect a subtree in post-order, including the root.
    pub(crate) fn subtree_post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((node_id, visited)) = stack.pop() {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            if visited {
                out.push(node_id);
                continue;
            }
            stack.push((node_id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        out
    }

    /// Destroy a node and its subtree. Deferred during traversals. The stage
    /// cannot be destroyed.
    pub fn destroy(&mut self, id: impl Into<NodeId>) -> Result<Mutation> {
        let id = id.into();
        self.require(id)?;
        if id == self.stage {
            return Err(Error::Invalid("the stage cannot be destroyed".into()));
        }
        if self.is_traversing() {
            trace!(?id, "deferred destroy");
            self.orphan_queue.push(OrphanRequest {
                node: id,
                destroy: true,
            });
            return Ok(Mutation::Deferred);
        }
        let result = self.destroy_now(id);
        self.settle()?;
        result.map(|_| Mutation::Applied)
    }

    /// Destroy a node by name.
    pub fn destroy_by_name(&mut self, name: &str) -> Result<Mutation> {
        let id = self.require_name(name)?;
        self.destroy(id)
    }

    /// Detach without orphaning, then destroy. Returns the number of nodes
    /// destroyed.
    pub(crate) fn destroy_now(&mut self, id: NodeId) -> Result<usize> {
        let detached = self.detach_now(id, Detach::Destroy);
        let destroyed = self.destroy_detached(id)?;
        detached?;
        Ok(destroyed)
    }

    /// Destroy a parentless subtree: `on_quit` in post-order, then removal
    /// from the name index, the orphan list and the arena.
    pub(crate) fn destroy_detached(&mut self, id: NodeId) -> Result<usize> {
        let order = self.subtree_post_order(id);
        let quit = self.traverse(TraversalKind::Lifecycle, |reg| -> Result<()> {
            for &n in &order {
                reg.with_behavior(n, |b, ctx| b.on_quit(ctx))?;
            }
            Ok(())
        });
        for &n in &order {
            if let Some(node) = self.nodes.remove(n) {
                self.names.remove(node.name.as_str());
            }
            self.forget_orphan(n);
        }
        debug!(?id, count = order.len(), "destroyed subtree");
        self.debug_assert_tree_invariants();
        quit?;
        Ok(order.len())
    }

    /// Make a parentless node the active root. The old stage and its
    /// descendants receive `RemovedFromStage` in pre-order; the new stage's
    /// subtree is initialised and receives `AddedToStage`. The old stage
    /// stays alive, detached.
    pub fn set_stage(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        self.ensure_idle("set_stage")?;
        if self.require(id)?.parent.is_some() {
            return Err(Error::Invalid("the stage must not have a parent".into()));
        }
        if id == self.stage {
            return Ok(());
        }
        let old = self.stage;
        let leaving = self.subtree_pre_order(old);
        let arriving = self.subtree_pre_order(id);
        self.forget_orphan(id);
        let fired = self.traverse(TraversalKind::Lifecycle, |reg| -> Result<()> {
            for &n in &leaving {
                reg.dispatch_inner(n, Event::new(EventType::RemovedFromStage))?;
            }
            reg.stage = id;
            for &n in &arriving {
                reg.init_node(n)?;
                reg.dispatch_inner(n, Event::new(EventType::AddedToStage))?;
            }
            Ok(())
        });
        self.stage = id;
        debug!(old = ?old, new = ?id, "stage changed");
        self.settle()?;
        fired
    }

    /// Resize the stage to a viewport.
    pub fn resize_stage(&mut self, size: Size) -> Result<()> {
        let stage = self.stage;
        let node = self.require_mut(stage)?;
        let bounds = Bounds::from_size(size);
        if node.offsets != bounds {
            node.offsets = bounds;
            node.flags.dirty = true;
        }
        Ok(())
    }

    /// Assert structural invariants on the node tree in debug builds.
    #[cfg(debug_assertions)]
    pub(crate) fn debug_assert_tree_invariants(&self) {
        debug_assert!(self.nodes.contains_key(self.stage), "stage missing");
        debug_assert!(
            self.nodes.get(self.stage).is_some_and(|n| n.parent.is_none()),
            "stage has parent"
        );
        for (id, node) in &self.nodes {
            let mut seen = HashSet::with_capacity(node.children.len());
            for child in &node.children {
                debug_assert!(seen.insert(*child), "duplicate child {child:?} under {id:?}");
                debug_assert!(
                    self.nodes.get(*child).is_some_and(|c| c.parent == Some(id)),
                    "child {child:?} parent mismatch under {id:?}"
                );
            }
            if let Some(parent) = node.parent {
                debug_assert!(
                    self.nodes
                        .get(parent)
                        .is_some_and(|p| p.children.contains(&id)),
                    "parent {parent:?} missing child {id:?}"
                );
            }
            debug_assert_eq!(
                self.names.get(node.name.as_str()),
                Some(&id),
                "name index out of sync for {id:?}"
            );
        }
        debug_assert_eq!(self.names.len(), self.nodes.len(), "stale name index");
    }

    #[cfg(not(debug_assertions))]
    pub(crate) fn debug_assert_tree_invariants(&self) {}
}
