//! Tests for lifecycle events and capture/bubble dispatch.

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use trellis::{
        Callback, Context, Event, EventType, ListenerPhase, NodeConfig, NodeId, Payload, Phase,
        Placement,
        error::{Error, Result},
        geom::Point,
        testing::{Harness, Record},
    };

    fn lifecycle(h: &Harness) -> Vec<String> {
        h.journal
            .records()
            .into_iter()
            .filter(|r| match r {
                Record::Event { kind, .. } => kind.is_lifecycle(),
                Record::Init(_) => true,
                _ => false,
            })
            .map(|r| r.short())
            .collect()
    }

    #[test]
    fn lifecycle_order_on_attach() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let a = h.probe("a", NodeConfig::default())?;
        let b = h.probe("b", NodeConfig::default())?;
        h.registry().add_child(b, a, Placement::Local)?;
        // Off stage: only the structural event.
        assert_eq!(lifecycle(&h), vec!["b:added"]);
        h.journal.clear();

        h.registry().add_child(a, stage, Placement::Local)?;
        assert_eq!(
            lifecycle(&h),
            vec!["a:added", "a:init", "a:added_to_stage", "b:init", "b:added_to_stage"]
        );
        let b_on_stage = h.journal.events(&EventType::AddedToStage);
        assert!(matches!(
            &b_on_stage[1],
            Record::Event { tag, related: Some(r), .. } if tag == "b" && *r == stage
        ));
        Ok(())
    }

    #[test]
    fn lifecycle_order_on_remove() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let a = h.child("a", stage, NodeConfig::default())?;
        h.child("b", a, NodeConfig::default())?;
        h.journal.clear();
        h.registry().remove_child(a)?;
        assert_eq!(
            lifecycle(&h),
            vec!["a:removed", "a:removed_from_stage", "b:removed_from_stage"]
        );
        Ok(())
    }

    #[test]
    fn lifecycle_events_bubble_to_ancestors() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let journal = h.journal.clone();
        journal.watch_lifecycle(h.registry(), stage, "stage-listener", ListenerPhase::Bubble)?;
        let a = h.child("a", stage, NodeConfig::default())?;
        let seen: Vec<(Option<NodeId>, Phase)> = h
            .journal
            .records()
            .into_iter()
            .filter_map(|r| match r {
                Record::Event { tag, current, phase, kind, .. }
                    if tag == "stage-listener" && kind == EventType::Added =>
                {
                    Some((current, phase))
                }
                _ => None,
            })
            .collect();
        assert_eq!(seen, vec![(Some(stage), Phase::Bubble)]);
        assert!(h.registry().parent(a).is_some());
        Ok(())
    }

    #[test]
    fn capture_runs_before_bubble() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let mid = h.child("mid", stage, NodeConfig::default())?;
        let leaf = h.child("leaf", mid, NodeConfig::default())?;
        let journal = h.journal.clone();
        let r = h.registry();
        r.add_event_listener(leaf, EventType::Click, journal.listener("leaf-bubble"), ListenerPhase::Bubble, 0)?;
        r.add_event_listener(stage, EventType::Click, journal.listener("stage-capture"), ListenerPhase::Capture, 0)?;
        journal.clear();
        r.dispatch(leaf, Event::new(EventType::Click))?;
        assert_eq!(
            journal.short(),
            vec!["stage-capture:click", "leaf:click", "leaf-bubble:click"]
        );
        Ok(())
    }

    #[test]
    fn stop_propagation_in_capture_skips_target() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let journal = h.journal.clone();
        let r = h.registry();
        r.add_event_listener(
            stage,
            EventType::KeyDown,
            |e: &mut Event, _: &mut dyn Context| -> Result<()> {
                e.stop_propagation();
                Ok(())
            },
            ListenerPhase::Capture,
            0,
        )?;
        r.add_event_listener(stage, EventType::KeyDown, journal.listener("same-node"), ListenerPhase::Capture, -1)?;
        journal.clear();
        let event = Event::new(EventType::KeyDown).with_payload(Payload::Key {
            code: "a".into(),
            repeat: false,
        });
        let out = r.dispatch(leaf, event)?;
        assert!(out.is_stopped());
        // The rest of the stage's capture bucket still runs.
        assert_eq!(journal.short(), vec!["same-node:key_down"]);
        Ok(())
    }

    #[test]
    fn listener_added_during_dispatch_waits() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let late = Callback::new(move |_: &mut Event, _: &mut dyn Context| {
            c.set(c.get() + 1);
            Ok(())
        });
        let r = h.registry();
        r.add_event_listener(
            leaf,
            EventType::named("poke"),
            move |_: &mut Event, ctx: &mut dyn Context| -> Result<()> {
                let me = ctx.node_id();
                ctx.listen(me, EventType::named("poke"), late.clone(), ListenerPhase::Bubble, 0)?;
                Ok(())
            },
            ListenerPhase::Bubble,
            0,
        )?;
        r.dispatch(leaf, Event::new(EventType::named("poke")))?;
        assert_eq!(count.get(), 0);
        r.dispatch(leaf, Event::new(EventType::named("poke")))?;
        assert_eq!(count.get(), 1);
        Ok(())
    }

    #[test]
    fn removal_by_callback_and_id() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let journal = h.journal.clone();
        let cb = journal.listener("x");
        let r = h.registry();
        r.add_event_listener(leaf, EventType::Click, cb.clone(), ListenerPhase::Bubble, 0)?;
        let id = r.add_event_listener(leaf, EventType::Click, journal.listener("y"), ListenerPhase::Capture, 0)?;
        assert!(r.remove_listener(leaf, id)?);
        assert!(!r.remove_listener(leaf, id)?);
        assert_eq!(r.remove_event_listener(leaf, &EventType::Click, &cb, ListenerPhase::Bubble)?, 1);
        assert!(!r.has_listener(leaf, &EventType::Click));
        journal.clear();
        r.dispatch(leaf, Event::new(EventType::Click))?;
        assert_eq!(journal.short(), vec!["leaf:click"]);
        Ok(())
    }

    #[test]
    fn removal_falls_back_to_closure_class() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let journal = h.journal.clone();
        let r = h.registry();
        let other = |_: &mut Event, _: &mut dyn Context| -> Result<()> { Ok(()) };
        r.add_event_listener(leaf, EventType::Click, journal.listener("p"), ListenerPhase::Bubble, 0)?;
        r.add_event_listener(leaf, EventType::Click, other, ListenerPhase::Bubble, 0)?;
        r.add_event_listener(leaf, EventType::Click, journal.listener("q"), ListenerPhase::Bubble, 0)?;
        // A fresh recorder is a different closure instance of the same class.
        let stranger = journal.listener("r");
        assert_eq!(r.remove_event_listener(leaf, &EventType::Click, &stranger, ListenerPhase::Bubble)?, 1);
        journal.clear();
        r.dispatch(leaf, Event::new(EventType::Click))?;
        assert_eq!(journal.short(), vec!["leaf:click", "q:click"]);

        // Once only the class remains, the bucket is cleared.
        r.add_event_listener(leaf, EventType::Click, journal.listener("s"), ListenerPhase::Capture, 0)?;
        r.add_event_listener(leaf, EventType::Click, journal.listener("t"), ListenerPhase::Capture, 0)?;
        assert_eq!(r.remove_event_listener(leaf, &EventType::Click, &stranger, ListenerPhase::Capture)?, 2);
        Ok(())
    }

    #[test]
    fn listener_error_aborts_dispatch() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let journal = h.journal.clone();
        let r = h.registry();
        r.add_event_listener(
            stage,
            EventType::Click,
            |_: &mut Event, _: &mut dyn Context| -> Result<()> { Err(Error::Callback("denied".into())) },
            ListenerPhase::Capture,
            0,
        )?;
        journal.clear();
        let err = r.dispatch(leaf, Event::new(EventType::Click)).err();
        assert_eq!(err, Some(Error::Callback("denied".into())));
        assert!(journal.records().is_empty());
        Ok(())
    }

    #[test]
    fn posted_events_deliver_next_frame() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let leaf = h.child("leaf", stage, NodeConfig::default())?;
        let r = h.registry();
        r.add_event_listener(
            leaf,
            EventType::named("ping"),
            move |_: &mut Event, ctx: &mut dyn Context| -> Result<()> {
                let me = ctx.node_id();
                ctx.post(me, Event::new(EventType::named("pong")))
            },
            ListenerPhase::Bubble,
            0,
        )?;
        r.post(leaf, Event::new(EventType::named("ping")))?;
        h.journal.clear();
        assert_eq!(h.frame()?.events, 1);
        assert_eq!(h.journal.events(&EventType::named("ping")).len(), 1);
        assert!(h.journal.events(&EventType::named("pong")).is_empty());
        assert_eq!(h.frame()?.events, 1);
        assert_eq!(h.journal.events(&EventType::named("pong")).len(), 1);
        Ok(())
    }

    #[test]
    fn pointer_dispatch_hits_front_most() -> Result<()> {
        let mut h = Harness::new();
        let stage = h.stage();
        let back = h.child("back", stage, NodeConfig::default().with_xywh(0.0, 0.0, 50.0, 50.0).clickable())?;
        let front = h.child(
            "front",
            stage,
            NodeConfig::default().with_xywh(10.0, 10.0, 20.0, 20.0).with_priority(1).clickable(),
        )?;
        let r = h.registry();
        let at = |x, y| Event::new(EventType::PointerDown).with_payload(Payload::Pointer {
            position: Point::new(x, y),
            button: 0,
        });
        assert_eq!(r.dispatch_at(Point::new(15.0, 15.0), at(15.0, 15.0))?.target(), Some(front));
        assert_eq!(r.dispatch_at(Point::new(5.0, 5.0), at(5.0, 5.0))?.target(), Some(back));
        assert_eq!(r.dispatch_at(Point::new(90.0, 90.0), at(90.0, 90.0))?.target(), Some(stage));
        r.bring_to_front(back)?;
        assert_eq!(r.dispatch_at(Point::new(15.0, 15.0), at(15.0, 15.0))?.target(), Some(back));
        Ok(())
    }
}
