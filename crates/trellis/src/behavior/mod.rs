//! The behavior contract plugged into every display node.

use std::any::Any;

use crate::{Context, error::Result, event::Event, render::RenderBackend};

/// Behaviors are the per-kind logic attached to nodes in the registry arena.
///
/// Every hook receives a [`Context`] bound to the node. Structural changes
/// made through the context while a traversal is active are queued and
/// applied after the traversal completes.
pub trait Behavior: Any {
    /// Called exactly once, when the node first becomes reachable from the
    /// stage and before its `AddedToStage` event.
    fn on_init(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        Ok(())
    }

    /// Called exactly once, immediately before the node is destroyed.
    fn on_quit(&mut self, _ctx: &mut dyn Context) {}

    /// Per-frame update. Runs parent-first for enabled nodes.
    fn on_update(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        Ok(())
    }

    /// Draw this node's own content. Children are rendered afterwards by the
    /// traversal; the backend has already selected this node's target.
    fn on_render(
        &mut self,
        _backend: &mut dyn RenderBackend,
        _ctx: &mut dyn Context,
    ) -> Result<()> {
        Ok(())
    }

    /// Handle an event at the target phase, after the target's capture
    /// listeners and before its bubble listeners.
    fn on_event(&mut self, _event: &mut Event, _ctx: &mut dyn Context) -> Result<()> {
        Ok(())
    }

    /// Behavior-specific consistency checks, run on demand by
    /// [`Registry::run_self_tests`](crate::Registry::run_self_tests).
    fn self_test(&mut self, _ctx: &mut dyn Context) -> Result<()> {
        Ok(())
    }
}

/// Convert behaviors into boxed trait objects.
impl<B> From<B> for Box<dyn Behavior>
where
    B: Behavior + 'static,
{
    fn from(behavior: B) -> Self {
        Box::new(behavior)
    }
}

/// A behavior that does nothing. Used for the stage and for plain grouping
/// nodes of kind `node` or `container`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Container;

impl Behavior for Container {}
