//! Keyboard tab navigation over the active tree.

use crate::{NodeId, core::registry::Registry};

impl Registry {
    /// Tab-enabled nodes in a subtree, in tree order, stably sorted by
    /// ascending tab priority. Hidden and disabled subtrees are skipped.
    pub fn tab_order(&self, root: impl Into<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root.into()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.flags.hidden || !node.flags.enabled {
                continue;
            }
            if node.flags.tab_enabled {
                out.push(id);
            }
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out.sort_by_key(|id| self.nodes[*id].flags.tab_priority);
        out
    }

    /// The tab stop after `from` on the stage, wrapping around. If `from`
    /// is not a tab stop, the first stop.
    pub fn next_tab(&self, from: Option<NodeId>) -> Option<NodeId> {
        let order = self.tab_order(self.stage());
        let pos = from.and_then(|f| order.iter().position(|id| *id == f));
        match pos {
            Some(i) => order.get((i + 1) % order.len()).copied(),
            None => order.first().copied(),
        }
    }

    /// The tab stop before `from` on the stage, wrapping around. If `from`
    /// is not a tab stop, the last stop.
    pub fn prev_tab(&self, from: Option<NodeId>) -> Option<NodeId> {
        let order = self.tab_order(self.stage());
        let pos = from.and_then(|f| order.iter().position(|id| *id == f));
        match pos {
            Some(i) => order.get((i + order.len() - 1) % order.len()).copied(),
            None => order.last().copied(),
        }
    }
}
