//! Tests for structural mutation during traversals.

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use trellis::{
        Context, Mutation, NodeConfig, Placement, TraversalKind,
        error::{Error, Result},
        testing::{Harness, Probe},
    };

    #[test]
    fn mutations_wait_for_the_drain() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let keep = h.child("keep", stage, NodeConfig::default())?;
        let doomed = h.child("doomed", stage, NodeConfig::default())?;
        let fresh = h.probe("fresh", NodeConfig::default())?;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let probe = Probe::new("driver", &h.journal).on_update(move |ctx: &mut dyn Context| {
            let stage = ctx.stage();
            let before = ctx.registry().children(stage).len();
            let removed = ctx.remove_child(doomed)?;
            let added = ctx.add_child(fresh, stage, Placement::Local)?;
            let after = ctx.registry().children(stage).len();
            log.borrow_mut().push((before, after, removed, added, ctx.traversal()));
            Ok(())
        });
        let driver = h.probe_with(probe, "driver", NodeConfig::default())?;
        h.registry().add_child(driver, keep, Placement::Local)?;

        h.frame()?;
        assert_eq!(
            *seen.borrow(),
            vec![(2, 2, Mutation::Deferred, Mutation::Deferred, Some(TraversalKind::Update))]
        );
        let r = h.registry();
        assert_eq!(r.children(stage), vec![keep, fresh]);
        assert_eq!(r.parent(doomed), None);
        assert!(!r.has_pending_work());
        Ok(())
    }

    #[test]
    fn destroy_during_update_is_deferred() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let victim = h.child("victim", stage, NodeConfig::default())?;
        let outcome = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&outcome);
        let probe = Probe::new("killer", &h.journal).on_update(move |ctx: &mut dyn Context| {
            *slot.borrow_mut() = Some(ctx.destroy(victim)?);
            assert!(ctx.registry().contains(victim));
            Ok(())
        });
        let killer = h.probe_with(probe, "killer", NodeConfig::default())?;
        h.registry().add_child(killer, stage, Placement::Local)?;
        h.frame()?;
        assert_eq!(*outcome.borrow(), Some(Mutation::Deferred));
        assert!(!h.registry().contains(victim));
        assert!(h.journal.short().contains(&"victim:quit".to_string()));
        Ok(())
    }

    #[test]
    fn self_and_descendant_parenting_rejected() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let a = h.child("a", stage, NodeConfig::default())?;
        let b = h.child("b", a, NodeConfig::default())?;
        let c = h.child("c", b, NodeConfig::default())?;
        let r = h.registry();

        assert!(matches!(
            r.add_child(a, a, Placement::Local),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            r.add_child(a, c, Placement::Local),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            r.set_parent(stage, c, Placement::World),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert_eq!(r.parent(a), Some(stage));
        assert!(r.children(c).is_empty());
        Ok(())
    }

    #[test]
    fn queued_cycle_is_dropped_at_drain() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let a = h.child("a", stage, NodeConfig::default())?;
        let b = h.probe("b", NodeConfig::default())?;
        // Queue b under a, then a under b: the second becomes a cycle once
        // the first is applied.
        let probe = Probe::new("looper", &h.journal).on_update(move |ctx: &mut dyn Context| {
            ctx.add_child(b, a, Placement::Local)?;
            ctx.add_child(a, b, Placement::Local)?;
            Ok(())
        });
        let looper = h.probe_with(probe, "looper", NodeConfig::default())?;
        h.registry().add_child(looper, stage, Placement::Local)?;
        h.frame()?;
        let r = h.registry();
        assert_eq!(r.parent(b), Some(a));
        assert_eq!(r.parent(a), Some(stage));
        Ok(())
    }

    #[test]
    fn drains_rejected_inside_callbacks() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        let probe = Probe::new("eager", &h.journal).on_update(move |ctx: &mut dyn Context| {
            *slot.borrow_mut() = Some(ctx.registry_mut().maintain().is_err());
            Ok(())
        });
        let eager = h.probe_with(probe, "eager", NodeConfig::default())?;
        h.registry().add_child(eager, stage, Placement::Local)?;
        h.frame()?;
        assert_eq!(*result.borrow(), Some(true));
        Ok(())
    }
}
