use std::mem;

use tracing::{trace, warn};

use crate::{
    NodeId,
    core::{context::NodeContext, registry::Registry, traversal::TraversalKind},
    error::Result,
    event::{
        Event, EventType, Phase,
        listener::{Callback, Listener, ListenerId, ListenerPhase},
    },
    geom::Point,
};

impl Registry {
    /// Register a listener. Returns an id usable with
    /// [`remove_listener`](Self::remove_listener).
    pub fn add_event_listener(
        &mut self,
        node: impl Into<NodeId>,
        kind: EventType,
        callback: impl Into<Callback>,
        phase: ListenerPhase,
        priority: i32,
    ) -> Result<ListenerId> {
        let node = node.into();
        let id = ListenerId(self.next_listener);
        let listener = Listener {
            id,
            callback: callback.into(),
            priority,
        };
        self.require_mut(node)?
            .listeners
            .table_mut(phase)
            .insert(kind, listener);
        self.next_listener += 1;
        Ok(id)
    }

    /// Remove a listener by callback. See [`ListenerTable`] for the matching
    /// rules. Returns the number of listeners removed.
    ///
    /// [`ListenerTable`]: crate::event::listener::ListenerTable
    pub fn remove_event_listener(
        &mut self,
        node: impl Into<NodeId>,
        kind: &EventType,
        callback: &Callback,
        phase: ListenerPhase,
    ) -> Result<usize> {
        Ok(self
            .require_mut(node.into())?
            .listeners
            .table_mut(phase)
            .remove_callback(kind, callback))
    }

    /// Remove a listener by id. Returns false if it was not registered on
    /// the node.
    pub fn remove_listener(&mut self, node: impl Into<NodeId>, id: ListenerId) -> Result<bool> {
        let listeners = &mut self.require_mut(node.into())?.listeners;
        Ok(listeners.table_mut(ListenerPhase::Capture).remove_id(id)
            || listeners.table_mut(ListenerPhase::Bubble).remove_id(id))
    }

    /// Does the node have any listener for the type?
    pub fn has_listener(&self, node: impl Into<NodeId>, kind: &EventType) -> bool {
        self.node(node).is_some_and(|n| n.listeners.has(kind))
    }

    /// Dispatch an event to a target through capture, target and bubble
    /// phases. Returns the event after delivery, so callers can inspect its
    /// final propagation state. The first listener error aborts delivery and
    /// is returned.
    pub fn dispatch(&mut self, target: impl Into<NodeId>, event: Event) -> Result<Event> {
        let target = target.into();
        self.require(target)?;
        let out = self.traverse(TraversalKind::Dispatch, |reg| reg.dispatch_inner(target, event));
        self.settle()?;
        out
    }

    /// Dispatch to the deepest clickable node under a point, or the stage if
    /// there is none.
    pub fn dispatch_at(&mut self, point: Point, event: Event) -> Result<Event> {
        let target = self.node_at(point)?.unwrap_or(self.stage());
        self.dispatch(target, event)
    }

    /// Queue an event for the next [`flush_events`](Self::flush_events).
    pub fn post(&mut self, target: impl Into<NodeId>, event: Event) -> Result<()> {
        let target = target.into();
        self.require(target)?;
        self.events.push_back((target, event));
        Ok(())
    }

    /// Number of queued events.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Deliver every event queued before the call, in order. Events posted
    /// during the flush wait for the next one. Events whose target has been
    /// destroyed are dropped. On error, undelivered events stay queued.
    pub fn flush_events(&mut self) -> Result<usize> {
        let mut batch = mem::take(&mut self.events);
        let mut delivered = 0;
        while let Some((target, event)) = batch.pop_front() {
            if !self.contains(target) {
                warn!(?target, kind = %event.kind(), "dropping event for a destroyed node");
                continue;
            }
            if let Err(e) = self.dispatch(target, event) {
                batch.append(&mut self.events);
                self.events = batch;
                return Err(e);
            }
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Deliver an event along its path. Must run inside a traversal scope.
    pub(crate) fn dispatch_inner(&mut self, target: NodeId, mut event: Event) -> Result<Event> {
        event.begin(target, self.frame());
        let mut ancestors = self.parent_chain(target)?;
        ancestors.remove(0);
        ancestors.reverse();
        trace!(?target, kind = %event.kind(), depth = ancestors.len(), "dispatch");

        for &node in &ancestors {
            self.run_listeners(node, ListenerPhase::Capture, Phase::Capture, &mut event)?;
            if event.is_stopped() {
                event.finish();
                return Ok(event);
            }
        }

        self.run_listeners(target, ListenerPhase::Capture, Phase::AtTarget, &mut event)?;
        if !event.is_stopped_immediately() {
            self.run_behavior(target, &mut event)?;
        }
        self.run_listeners(target, ListenerPhase::Bubble, Phase::AtTarget, &mut event)?;

        if !event.is_stopped() {
            for &node in ancestors.iter().rev() {
                self.run_listeners(node, ListenerPhase::Bubble, Phase::Bubble, &mut event)?;
                if event.is_stopped() {
                    break;
                }
            }
        }
        event.finish();
        Ok(event)
    }

    /// Invoke a snapshot of one node's listeners for one phase.
    fn run_listeners(
        &mut self,
        node: NodeId,
        table: ListenerPhase,
        phase: Phase,
        event: &mut Event,
    ) -> Result<()> {
        let snapshot: Vec<Listener> = match self.nodes.get(node) {
            Some(n) => n.listeners.table(table).get(event.kind()).to_vec(),
            None => return Ok(()),
        };
        if snapshot.is_empty() {
            return Ok(());
        }
        event.enter(node, phase);
        for listener in snapshot {
            if event.is_stopped_immediately() {
                break;
            }
            event.count_delivery();
            let mut ctx = NodeContext::new(self, node);
            listener.callback.call(event, &mut ctx)?;
        }
        Ok(())
    }

    /// Invoke the target behavior's `on_event`. A behavior that is already
    /// executing further up the stack is skipped.
    fn run_behavior(&mut self, target: NodeId, event: &mut Event) -> Result<()> {
        if self.nodes.get(target).is_none_or(|n| n.behavior.is_none()) {
            trace!(?target, "behavior busy, skipping on_event");
            return Ok(());
        }
        event.enter(target, Phase::AtTarget);
        event.count_delivery();
        self.with_behavior(target, |b, ctx| b.on_event(event, ctx))?
    }
}
