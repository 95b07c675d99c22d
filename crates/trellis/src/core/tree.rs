//! Structural mutation: attach, detach, reparent, and the drains that apply
//! work deferred during traversals.

use std::{mem, time::Instant};

use tracing::{debug, error, trace, warn};

use crate::{
    NodeId,
    core::{
        registry::Registry,
        traversal::{FutureChild, OrphanRequest, Placement, Resolved, TraversalKind},
    },
    error::{Error, Result},
    event::{Event, EventType},
};

/// Outcome of a structural request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The change was made.
    Applied,
    /// A traversal is active; the change is queued.
    Deferred,
    /// Nothing to do.
    Ignored,
}

/// Why a node is being detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Detach {
    /// Plain removal; the node joins the orphan list.
    Orphan,
    /// Moving to another parent.
    Reparent,
    /// About to be destroyed.
    Destroy,
}

/// Counts from one maintenance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Maintenance {
    /// Removal requests processed.
    pub detached: usize,
    /// Attach requests processed.
    pub attached: usize,
    /// Parents resorted.
    pub resorted: usize,
    /// Nodes destroyed by garbage collection.
    pub collected: usize,
}

impl Registry {
    /// Attach `child` under `parent`. A child attached elsewhere is moved.
    /// Deferred during traversals.
    pub fn add_child(
        &mut self,
        child: impl Into<NodeId>,
        parent: impl Into<NodeId>,
        placement: Placement,
    ) -> Result<Mutation> {
        let child = child.into();
        let parent = parent.into();
        self.check_attach(child, parent)?;
        if child == self.stage() {
            debug!("ignoring attach of the stage");
            return Ok(Mutation::Ignored);
        }
        let placement = self.resolve_placement(child, placement)?;
        if self.is_traversing() {
            trace!(?child, ?parent, "deferred attach");
            self.future_children.push(FutureChild {
                child,
                parent,
                placement,
            });
            return Ok(Mutation::Deferred);
        }
        let result = self.attach_now(child, parent, placement);
        self.settle()?;
        result
    }

    /// Move `child` under `parent`. Equivalent to removal followed by
    /// attachment, except that the child is never orphaned.
    pub fn set_parent(
        &mut self,
        child: impl Into<NodeId>,
        parent: impl Into<NodeId>,
        placement: Placement,
    ) -> Result<Mutation> {
        self.add_child(child, parent, placement)
    }

    /// Detach `child` from its parent. The child joins the orphan list.
    /// Deferred during traversals. Removing the stage is ignored.
    pub fn remove_child(&mut self, child: impl Into<NodeId>) -> Result<Mutation> {
        let child = child.into();
        self.require(child)?;
        if child == self.stage() {
            debug!("ignoring removal of the stage");
            return Ok(Mutation::Ignored);
        }
        if self.is_traversing() {
            trace!(?child, "deferred removal");
            self.orphan_queue.push(OrphanRequest {
                node: child,
                destroy: false,
            });
            return Ok(Mutation::Deferred);
        }
        let result = self.detach_now(child, Detach::Orphan);
        self.settle()?;
        result
    }

    /// Detach `child`, which must currently be a child of `parent`.
    pub fn remove_child_of(
        &mut self,
        parent: impl Into<NodeId>,
        child: impl Into<NodeId>,
    ) -> Result<Mutation> {
        let parent = parent.into();
        let child = child.into();
        self.require(parent)?;
        if self.require(child)?.parent != Some(parent) {
            return Err(Error::NotAChild { parent, child });
        }
        self.remove_child(child)
    }

    /// Both nodes exist and linking them would not create a cycle.
    fn check_attach(&self, child: NodeId, parent: NodeId) -> Result<()> {
        self.require(child)?;
        // A corrupt chain above `parent` surfaces here as a fatal `Cycle`.
        if parent == child || self.parent_chain(parent)?.contains(&child) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        Ok(())
    }

    /// Capture world bounds for a placement.
    fn resolve_placement(&self, child: NodeId, placement: Placement) -> Result<Resolved> {
        Ok(match placement {
            Placement::Local => Resolved::Local,
            Placement::World => Resolved::World(self.bounds(child)?),
            Placement::WorldAt(p) => Resolved::World(self.bounds(child)?.at(p)),
        })
    }

    /// Link a child now. Lifecycle hooks and events run inside a traversal
    /// scope; the link is kept even if one of them fails.
    pub(crate) fn attach_now(
        &mut self,
        child: NodeId,
        parent: NodeId,
        placement: Resolved,
    ) -> Result<Mutation> {
        self.check_attach(child, parent)?;
        let current = self.require(child)?.parent;
        if current == Some(parent) || child == self.stage() {
            return Ok(Mutation::Ignored);
        }
        let detached = match current {
            Some(_) => self.detach_now(child, Detach::Reparent),
            None => Ok(Mutation::Ignored),
        };

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.forget_orphan(child);
        self.resort_now(parent);
        if let Resolved::World(bounds) = placement {
            self.set_bounds(child, bounds)?;
        }
        self.taint(child);
        debug!(?child, ?parent, "attached");
        self.debug_assert_tree_invariants();

        let on_stage = self.is_on_stage(parent);
        let fired = self.traverse(TraversalKind::Lifecycle, |reg| -> Result<()> {
            reg.dispatch_inner(child, Event::new(EventType::Added).with_related(parent))?;
            if on_stage {
                for id in reg.subtree_pre_order(child) {
                    reg.init_node(id)?;
                    reg.dispatch_inner(
                        id,
                        Event::new(EventType::AddedToStage).with_related(parent),
                    )?;
                }
            }
            Ok(())
        });
        detached?;
        fired?;
        Ok(Mutation::Applied)
    }

    /// Unlink a child now. Removal events fire while the node is still
    /// linked; the unlink happens even if a listener fails.
    pub(crate) fn detach_now(&mut self, child: NodeId, mode: Detach) -> Result<Mutation> {
        let Some(parent) = self.require(child)?.parent else {
            return Ok(Mutation::Ignored);
        };
        let on_stage = self.is_on_stage(child);
        let fired = self.traverse(TraversalKind::Lifecycle, |reg| -> Result<()> {
            reg.dispatch_inner(child, Event::new(EventType::Removed).with_related(parent))?;
            if on_stage {
                for id in reg.subtree_pre_order(child) {
                    reg.dispatch_inner(
                        id,
                        Event::new(EventType::RemovedFromStage).with_related(parent),
                    )?;
                }
            }
            Ok(())
        });

        // Listeners cannot mutate structure mid-traversal, so the link is intact.
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|id| *id != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        self.resort_now(parent);
        if mode == Detach::Orphan {
            self.push_orphan(child);
        }
        debug!(?child, ?parent, ?mode, "detached");
        self.debug_assert_tree_invariants();
        fired?;
        Ok(Mutation::Applied)
    }

    /// Process queued removals and destroys. Requests queued by lifecycle
    /// listeners while draining are processed too, up to the pass limit.
    /// Returns the number of requests processed.
    pub fn detach_orphans(&mut self) -> Result<usize> {
        self.ensure_idle("detach_orphans")?;
        let mut processed = 0;
        for _ in 0..self.settings().max_drain_passes {
            if self.orphan_queue.is_empty() {
                break;
            }
            for request in mem::take(&mut self.orphan_queue) {
                processed += 1;
                self.apply_orphan_request(request)?;
            }
        }
        if !self.orphan_queue.is_empty() {
            warn!(
                remaining = self.orphan_queue.len(),
                "orphan queue not drained within pass limit"
            );
        }
        Ok(processed)
    }

    /// Apply one queued removal. Stale requests are skipped.
    fn apply_orphan_request(&mut self, request: OrphanRequest) -> Result<()> {
        let OrphanRequest { node, destroy } = request;
        if !self.contains(node) {
            trace!(?node, "skipping removal of a destroyed node");
            return Ok(());
        }
        if node == self.stage() {
            return Ok(());
        }
        if destroy {
            self.destroy_now(node)?;
        } else {
            self.detach_now(node, Detach::Orphan)?;
        }
        Ok(())
    }

    /// Process queued attaches and reparents, converting captured world
    /// bounds into offsets under the new parent. Requests that have become
    /// invalid since they were queued are logged and skipped. Returns the
    /// number of requests processed.
    pub fn attach_future_children(&mut self) -> Result<usize> {
        self.ensure_idle("attach_future_children")?;
        let mut processed = 0;
        for _ in 0..self.settings().max_drain_passes {
            if self.future_children.is_empty() {
                break;
            }
            for request in mem::take(&mut self.future_children) {
                processed += 1;
                self.apply_future_child(request)?;
            }
        }
        if !self.future_children.is_empty() {
            warn!(
                remaining = self.future_children.len(),
                "future children not drained within pass limit"
            );
        }
        Ok(processed)
    }

    /// Apply one queued attach.
    fn apply_future_child(&mut self, request: FutureChild) -> Result<()> {
        let FutureChild {
            child,
            parent,
            placement,
        } = request;
        match self.check_attach(child, parent) {
            Ok(()) => {
                self.attach_now(child, parent, placement)?;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(Error::WouldCreateCycle { .. }) => {
                error!(?child, ?parent, "dropping queued attach that would create a cycle");
            }
            Err(e) => {
                warn!(?child, ?parent, error = %e, "dropping stale queued attach");
            }
        }
        Ok(())
    }

    /// Run every maintenance step: removals, attaches and resorts until the
    /// queues are empty or the pass limit is hit, then garbage collection.
    pub fn maintain(&mut self) -> Result<Maintenance> {
        self.maintain_at(Instant::now())
    }

    /// Run maintenance with garbage collection judged at `now`.
    pub fn maintain_at(&mut self, now: Instant) -> Result<Maintenance> {
        let mut stats = self.drain()?;
        stats.collected = self.collect_garbage_at(now)?;
        Ok(stats)
    }

    /// Drain the structural queues, removals before attaches.
    fn drain(&mut self) -> Result<Maintenance> {
        self.ensure_idle("maintain")?;
        let mut stats = Maintenance::default();
        for _ in 0..self.settings().max_drain_passes {
            if !self.has_pending_work() {
                break;
            }
            stats.detached += self.detach_orphans()?;
            stats.attached += self.attach_future_children()?;
            stats.resorted += self.apply_resorts()?;
        }
        if self.has_pending_work() {
            warn!(
                orphans = self.orphan_queue.len(),
                children = self.future_children.len(),
                resorts = self.pending_resort.len(),
                "structural work left after drain"
            );
        }
        Ok(stats)
    }

    /// Drain work queued by hooks of an immediate operation. A no-op while
    /// traversing, since the outermost traversal's owner drains instead.
    pub(crate) fn settle(&mut self) -> Result<()> {
        if self.is_traversing() || !self.has_pending_work() {
            return Ok(());
        }
        self.drain().map(|_| ())
    }
}
