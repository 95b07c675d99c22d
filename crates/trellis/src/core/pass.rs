//! Recursive update, render and self-test passes over the active tree.

use tracing::{trace, warn};

use crate::{
    NodeId,
    core::{geometry::resolve, registry::Registry, traversal::TraversalKind},
    error::{Error, Result},
    geom::Bounds,
    render::RenderBackend,
};

impl Registry {
    /// Run `on_update` over the stage, parents before children. Disabled
    /// subtrees are skipped. Structural requests made by behaviors are
    /// applied once the pass has finished.
    pub fn update(&mut self) -> Result<()> {
        let stage = self.stage();
        let out = self.traverse(TraversalKind::Update, |reg| reg.update_node(stage));
        self.settle()?;
        out
    }

    /// Update one node and then its children.
    fn update_node(&mut self, id: NodeId) -> Result<()> {
        match self.nodes.get(id) {
            Some(node) if node.flags.enabled => {}
            _ => return Ok(()),
        }
        self.with_behavior(id, |b, ctx| b.on_update(ctx))??;
        // Child vectors are frozen while the traversal is active.
        for child in self.children(id) {
            self.update_node(child)?;
        }
        Ok(())
    }

    /// Render the stage through a backend: parent before children, children
    /// back to front. Hidden subtrees are skipped and rendered nodes are
    /// marked clean.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        let stage = self.stage();
        backend.begin_frame()?;
        let out = self.traverse(TraversalKind::Render, |reg| {
            reg.render_node(backend, stage, None)
        });
        let end = backend.end_frame();
        self.settle()?;
        out?;
        end
    }

    /// Render one node, then its children within its resolved bounds.
    fn render_node(
        &mut self,
        backend: &mut dyn RenderBackend,
        id: NodeId,
        parent: Option<Bounds>,
    ) -> Result<()> {
        let bounds = match self.nodes.get(id) {
            Some(node) if !node.flags.hidden => resolve(node, parent),
            _ => return Ok(()),
        };
        backend.select_target(id, bounds)?;
        self.with_behavior(id, |b, ctx| b.on_render(backend, ctx))??;
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.dirty = false;
        }
        for child in self.children(id) {
            self.render_node(backend, child, Some(bounds))?;
        }
        Ok(())
    }

    /// Run `self_test` for every node in a subtree. All nodes are visited;
    /// failures are reported together.
    pub fn run_self_tests(&mut self, root: impl Into<NodeId>) -> Result<()> {
        let root = root.into();
        self.require(root)?;
        let order = self.subtree_pre_order(root);
        let failures = self.traverse(TraversalKind::SelfTest, |reg| {
            let mut failures = Vec::new();
            for id in order {
                let outcome = reg
                    .with_behavior(id, |b, ctx| b.self_test(ctx))
                    .and_then(|r| r);
                if let Err(e) = outcome {
                    let name = reg.name(id).map(ToString::to_string).unwrap_or_default();
                    warn!(?id, %name, error = %e, "self test failed");
                    failures.push(format!("{name}: {e}"));
                } else {
                    trace!(?id, "self test passed");
                }
            }
            failures
        });
        self.settle()?;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Callback(format!(
                "{} self test(s) failed: {}",
                failures.len(),
                failures.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        Behavior, Context, NodeConfig, Placement,
        geom::Size,
        render::NullBackend,
    };

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracer {
        tag: &'static str,
        log: Log,
    }

    impl Behavior for Tracer {
        fn on_update(&mut self, _ctx: &mut dyn Context) -> Result<()> {
            self.log.borrow_mut().push(format!("update:{}", self.tag));
            Ok(())
        }

        fn on_render(
            &mut self,
            _backend: &mut dyn RenderBackend,
            _ctx: &mut dyn Context,
        ) -> Result<()> {
            self.log.borrow_mut().push(format!("render:{}", self.tag));
            Ok(())
        }

        fn self_test(&mut self, _ctx: &mut dyn Context) -> Result<()> {
            if self.tag == "b" {
                return Err(Error::Callback("bad b".into()));
            }
            Ok(())
        }
    }

    fn tree(log: &Log) -> Result<(Registry, NodeId, NodeId, NodeId)> {
        let mut r = Registry::new();
        let stage = r.stage();
        let mut make = |tag: &'static str, priority: i32| {
            r.create_with(
                "tracer",
                &NodeConfig::named(tag).with_priority(priority),
                Tracer {
                    tag,
                    log: Rc::clone(log),
                },
            )
            .map(NodeId::from)
        };
        let a = make("a", 0)?;
        let b = make("b", 1)?;
        let c = make("c", 0)?;
        r.add_child(b, stage, Placement::Local)?;
        r.add_child(a, stage, Placement::Local)?;
        r.add_child(c, a, Placement::Local)?;
        Ok((r, a, b, c))
    }

    #[test]
    fn update_is_pre_order_in_z() -> Result<()> {
        let log: Log = Rc::default();
        let (mut r, a, _, _) = tree(&log)?;
        r.update()?;
        assert_eq!(*log.borrow(), vec!["update:a", "update:c", "update:b"]);

        log.borrow_mut().clear();
        r.set_enabled(a, false)?;
        r.update()?;
        assert_eq!(*log.borrow(), vec!["update:b"]);
        Ok(())
    }

    #[test]
    fn render_skips_hidden_and_cleans() -> Result<()> {
        let log: Log = Rc::default();
        let (mut r, a, b, c) = tree(&log)?;
        r.set_hidden(b, true)?;
        let mut backend = NullBackend::new(Size::new(100.0, 100.0));
        r.render(&mut backend)?;
        assert_eq!(*log.borrow(), vec!["render:a", "render:c"]);
        assert!(!r.require(a)?.flags().dirty);
        assert!(!r.require(c)?.flags().dirty);
        assert!(r.require(b)?.flags().dirty);
        Ok(())
    }

    #[test]
    fn self_tests_collect_failures() -> Result<()> {
        let log: Log = Rc::default();
        let (mut r, a, _, _) = tree(&log)?;
        assert!(r.run_self_tests(a).is_ok());
        let err = r.run_self_tests(r.stage()).err();
        assert!(matches!(err, Some(Error::Callback(ref m)) if m.contains("bad b")));
        assert!(!r.is_traversing());
        Ok(())
    }
}
