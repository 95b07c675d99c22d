//! Sibling ordering: priorities, derived z-order and stacking operations.

use std::{collections::HashSet, mem};

use tracing::trace;

use crate::{
    NodeId,
    core::registry::Registry,
    error::{Error, Result},
};

impl Registry {
    /// Set a node's priority and resort its siblings. During a traversal the
    /// value is stored at once and the resort is queued.
    pub fn set_priority(&mut self, id: impl Into<NodeId>, priority: i32) -> Result<()> {
        let id = id.into();
        let node = self.require_mut(id)?;
        node.priority = priority;
        node.flags.dirty = true;
        if let Some(parent) = node.parent {
            self.request_resort(parent);
        }
        Ok(())
    }

    /// A node's priority.
    pub fn priority(&self, id: impl Into<NodeId>) -> Result<i32> {
        Ok(self.require(id.into())?.priority)
    }

    /// A node's rank among its siblings, 0 at the back.
    pub fn z_order(&self, id: impl Into<NodeId>) -> Result<usize> {
        Ok(self.require(id.into())?.z_order)
    }

    /// Resort now, or queue the resort if a traversal is active.
    fn request_resort(&mut self, parent: NodeId) {
        if self.is_traversing() {
            if !self.pending_resort.contains(&parent) {
                self.pending_resort.push(parent);
            }
        } else {
            self.resort_now(parent);
        }
    }

    /// Stable-sort a parent's children by ascending priority and rewrite
    /// their z-order. Duplicates keep their last occurrence; dead handles
    /// and children that no longer point back at the parent are dropped.
    pub(crate) fn resort_now(&mut self, parent: NodeId) {
        let Some(node) = self.nodes.get_mut(parent) else {
            return;
        };
        let children = mem::take(&mut node.children);
        let mut seen = HashSet::with_capacity(children.len());
        let mut kept: Vec<NodeId> = children
            .into_iter()
            .rev()
            .filter(|c| {
                self.nodes.get(*c).is_some_and(|n| n.parent == Some(parent)) && seen.insert(*c)
            })
            .collect();
        kept.reverse();
        kept.sort_by_key(|c| self.nodes[*c].priority);
        for (z, c) in kept.iter().enumerate() {
            self.nodes[*c].z_order = z;
        }
        trace!(?parent, children = kept.len(), "resorted");
        self.nodes[parent].children = kept;
    }

    /// Apply queued resorts. Returns the number of parents resorted.
    pub fn apply_resorts(&mut self) -> Result<usize> {
        self.ensure_idle("apply_resorts")?;
        let pending = mem::take(&mut self.pending_resort);
        let n = pending.len();
        for parent in pending {
            self.resort_now(parent);
        }
        Ok(n)
    }

    /// Siblings of a node, excluding the node itself.
    fn siblings(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let Some(parent) = self.require(id)?.parent else {
            return Ok(Vec::new());
        };
        Ok(self
            .require(parent)?
            .children
            .iter()
            .copied()
            .filter(|c| *c != id)
            .collect())
    }

    /// Raise a node above all its siblings. Single level. If no priority is
    /// left above the highest sibling, the group is renumbered densely first.
    pub fn move_to_top(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        let own = self.priority(id)?;
        let mut order = self.siblings_by_priority(id)?;
        let Some(max) = order.last().map(|s| self.nodes[*s].priority) else {
            return Ok(());
        };
        if max < own {
            return Ok(());
        }
        match max.checked_add(1) {
            Some(p) => self.set_priority(id, p),
            None => {
                order.push(id);
                self.renumber(&order)
            }
        }
    }

    /// Lower a node beneath all its siblings. Single level. If no priority
    /// is left below the lowest sibling, the group is renumbered densely
    /// first.
    pub fn move_to_bottom(&mut self, id: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        let own = self.priority(id)?;
        let mut order = self.siblings_by_priority(id)?;
        let Some(min) = order.first().map(|s| self.nodes[*s].priority) else {
            return Ok(());
        };
        if min > own {
            return Ok(());
        }
        match min.checked_sub(1) {
            Some(p) => self.set_priority(id, p),
            None => {
                order.insert(0, id);
                self.renumber(&order)
            }
        }
    }

    /// Siblings of a node in ascending priority, ties in child order.
    fn siblings_by_priority(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut siblings = self.siblings(id)?;
        siblings.retain(|s| self.nodes.contains_key(*s));
        siblings.sort_by_key(|s| self.nodes[*s].priority);
        Ok(siblings)
    }

    /// Give a sibling group priorities `0..n` in the given order.
    fn renumber(&mut self, order: &[NodeId]) -> Result<()> {
        for (p, c) in order.iter().enumerate() {
            let priority = i32::try_from(p).map_err(|_| Error::Internal("too many siblings".into()))?;
            self.set_priority(*c, priority)?;
        }
        Ok(())
    }

    /// The node and its ancestors below the stage, nearest first.
    fn stacking_chain(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.require(id)?;
        let stage = self.stage();
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(n) = current {
            if n == stage || chain.contains(&n) {
                break;
            }
            chain.push(n);
            current = self.nodes.get(n).and_then(|node| node.parent);
        }
        Ok(chain)
    }

    /// Raise a node to the front of its siblings, and every ancestor to the
    /// front of theirs.
    pub fn bring_to_front(&mut self, id: impl Into<NodeId>) -> Result<()> {
        for n in self.stacking_chain(id.into())? {
            self.move_to_top(n)?;
        }
        Ok(())
    }

    /// Lower a node to the back of its siblings, and every ancestor to the
    /// back of theirs.
    pub fn send_to_back(&mut self, id: impl Into<NodeId>) -> Result<()> {
        for n in self.stacking_chain(id.into())? {
            self.move_to_bottom(n)?;
        }
        Ok(())
    }

    /// Reinsert `id` directly after sibling `limit` and renumber the group's
    /// priorities densely in that order.
    pub fn send_to_back_after(&mut self, id: impl Into<NodeId>, limit: impl Into<NodeId>) -> Result<()> {
        let id = id.into();
        let limit = limit.into();
        let parent = self.require(id)?.parent;
        if id == limit || parent.is_none() || self.require(limit)?.parent != parent {
            return Err(Error::NotASibling {
                node: id,
                sibling: limit,
            });
        }
        let mut order = self.siblings(id)?;
        let at = order
            .iter()
            .position(|c| *c == limit)
            .ok_or(Error::NotASibling {
                node: id,
                sibling: limit,
            })?;
        order.insert(at + 1, id);
        self.renumber(&order)
    }
}
