//! Orphan tracking and garbage collection.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    NodeId,
    core::registry::Registry,
    error::{Error, Result},
};

/// How long a detached node survives before garbage collection destroys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grace {
    /// Eligible once this many frames have elapsed since detachment.
    Frames(u64),
    /// Eligible once this much wall time has elapsed since detachment.
    Duration(Duration),
}

/// What happens to a node after it is detached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Destroyed at the next garbage collection.
    #[default]
    AutoDestroy,
    /// Destroyed by the first garbage collection after the grace period.
    GracePeriod(Grace),
    /// Kept until destroyed explicitly.
    RetainUntilManual,
}

impl Retention {
    /// Grace period measured in frames.
    pub fn frames(n: u64) -> Self {
        Self::GracePeriod(Grace::Frames(n))
    }

    /// Grace period measured in wall time.
    pub fn duration(d: Duration) -> Self {
        Self::GracePeriod(Grace::Duration(d))
    }
}

/// An entry in the orphan list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orphan {
    /// The detached node.
    node: NodeId,
    /// Frame counter at detachment.
    since_frame: u64,
    /// Wall time at detachment.
    since: Instant,
}

impl Orphan {
    /// Record a detachment.
    pub(crate) fn new(node: NodeId, since_frame: u64, since: Instant) -> Self {
        Self {
            node,
            since_frame,
            since,
        }
    }

    /// The detached node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Frame counter at detachment.
    pub fn since_frame(&self) -> u64 {
        self.since_frame
    }

    /// Wall time at detachment.
    pub fn since(&self) -> Instant {
        self.since
    }

    /// Does the retention policy allow destruction at `frame` and `now`?
    pub fn is_due(&self, retention: Retention, frame: u64, now: Instant) -> bool {
        match retention {
            Retention::AutoDestroy => true,
            Retention::GracePeriod(Grace::Frames(n)) => {
                frame.saturating_sub(self.since_frame) >= n
            }
            Retention::GracePeriod(Grace::Duration(d)) => {
                now.saturating_duration_since(self.since) >= d
            }
            Retention::RetainUntilManual => false,
        }
    }
}

impl Registry {
    /// The current orphan list, in detachment order.
    pub fn orphans(&self) -> &[Orphan] {
        &self.orphans
    }

    /// Is the node in the orphan list?
    pub fn is_orphan(&self, node: impl Into<NodeId>) -> bool {
        let node = node.into();
        self.orphans.iter().any(|o| o.node == node)
    }

    /// Record a detached node in the orphan list.
    pub(crate) fn push_orphan(&mut self, node: NodeId) {
        if self.is_orphan(node) {
            return;
        }
        self.orphans
            .push(Orphan::new(node, self.frame(), Instant::now()));
    }

    /// Drop a node from the orphan list.
    pub(crate) fn forget_orphan(&mut self, node: NodeId) {
        self.orphans.retain(|o| o.node != node);
    }

    /// Run garbage collection against the current wall clock.
    pub fn collect_garbage(&mut self) -> Result<usize> {
        self.collect_garbage_at(Instant::now())
    }

    /// Run garbage collection, treating `now` as the current time. Entries
    /// whose node has been re-parented are dropped; eligible nodes are
    /// destroyed. Structural requests made by their `on_quit` hooks are
    /// applied before returning. Returns the number of nodes destroyed.
    pub fn collect_garbage_at(&mut self, now: Instant) -> Result<usize> {
        self.ensure_idle("collect_garbage")?;

        if let Some(missing) = self
            .orphans
            .iter()
            .find(|o| !self.nodes.contains_key(o.node))
        {
            error!(node = ?missing.node, "orphan list references a missing node");
            return Err(Error::OrphanList(format!(
                "entry for {:?} has no node",
                missing.node
            )));
        }

        let nodes = &self.nodes;
        self.orphans
            .retain(|o| nodes.get(o.node).is_some_and(|n| n.parent.is_none()));

        let frame = self.frame();
        let due: Vec<NodeId> = self
            .orphans
            .iter()
            .filter(|o| o.is_due(self.nodes[o.node].retention, frame, now))
            .map(|o| o.node)
            .collect();

        let mut destroyed = 0;
        for node in due {
            destroyed += self.destroy_detached(node)?;
        }
        if destroyed > 0 {
            debug!(destroyed, frame, "garbage collected orphans");
            // Apply whatever the on_quit hooks queued.
            self.settle()?;
        }
        Ok(destroyed)
    }
}
