//! Tests for anchor-resolved geometry.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use trellis::{
        NodeConfig, NodeId, Placement, Registry,
        error::Result,
        geom::{Anchor, Bounds, Edge, Point},
    };

    /// Whole and half units keep the arithmetic exact.
    fn coord() -> impl Strategy<Value = f32> {
        (-400i16..400).prop_map(|v| f32::from(v) / 2.0)
    }

    fn anchor() -> impl Strategy<Value = Anchor> {
        (0usize..9).prop_map(|i| Anchor::ALL[i])
    }

    fn edge() -> impl Strategy<Value = Edge> {
        (0usize..4).prop_map(|i| Edge::ALL[i])
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    /// A parent at `pb` on the stage with a child under it.
    fn pair(pb: Bounds) -> Result<(Registry, NodeId, NodeId)> {
        let mut r = Registry::new();
        let stage = r.stage();
        let parent = r.create("node", &NodeConfig::named("parent"))?;
        let child = r.create("node", &NodeConfig::named("child"))?;
        r.add_child(parent, stage, Placement::Local)?;
        r.add_child(child, parent, Placement::Local)?;
        r.set_bounds(parent, pb)?;
        Ok((r, parent, child))
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(
            a in anchor(),
            e in edge(),
            v in coord(),
            l in coord(), t in coord(), w in 0i16..200, h in 0i16..200,
            dx in coord(), dy in coord(),
        ) {
            let pb = Bounds::from_xywh(l, t, f32::from(w), f32::from(h));
            let (mut r, parent, child) = pair(pb).expect("tree");
            r.set_anchor(child, e, a).expect("anchor");
            r.set_edge(child, e, v).expect("set");
            prop_assert!(close(r.edge(child, e).expect("get"), v));

            // Moving the parent carries the edge with its reference point.
            let offset = r.offsets(child).expect("offsets").edge(e);
            r.move_by(parent, dx, dy).expect("move");
            r.set_width(parent, f32::from(w) + 10.0).expect("width");
            let moved = r.bounds(parent).expect("parent bounds");
            let expected = offset + a.reference(e, moved);
            prop_assert!(close(r.edge(child, e).expect("get"), expected));
        }

        #[test]
        fn reassignment_preserves_edges(
            from in anchor(),
            to in anchor(),
            l in coord(), t in coord(), w in 1i16..200, h in 1i16..200,
            cl in coord(), ct in coord(), cw in 0i16..100, ch in 0i16..100,
        ) {
            let pb = Bounds::from_xywh(l, t, f32::from(w), f32::from(h));
            let (mut r, _, child) = pair(pb).expect("tree");
            r.set_anchors(child, from).expect("anchors");
            let cb = Bounds::from_xywh(cl, ct, f32::from(cw), f32::from(ch));
            r.set_bounds(child, cb).expect("bounds");
            for e in Edge::ALL {
                r.set_anchor(child, e, to).expect("reassign");
                prop_assert_eq!(r.anchor(child, e).expect("anchor"), to);
            }
            let after = r.bounds(child).expect("bounds");
            for e in Edge::ALL {
                prop_assert!(close(after.edge(e), cb.edge(e)));
            }
        }
    }

    #[test]
    fn every_anchor_pair_preserves_edges() -> Result<()> {
        let pb = Bounds::from_xywh(3.0, 7.0, 41.0, 29.0);
        let cb = Bounds::from_xywh(5.0, 9.0, 11.0, 13.0);
        for from in Anchor::ALL {
            for to in Anchor::ALL {
                let (mut r, _, child) = pair(pb)?;
                r.set_anchors(child, from)?;
                r.set_bounds(child, cb)?;
                r.set_anchors(child, to)?;
                let after = r.bounds(child)?;
                for e in Edge::ALL {
                    assert!(close(after.edge(e), cb.edge(e)), "{from} -> {to} moved {e:?}");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn world_reparent_keeps_bounds() -> Result<()> {
        let mut r = Registry::new();
        let stage = r.stage();
        let a = r.create("node", &NodeConfig::named("a").with_xywh(100.0, 100.0, 200.0, 200.0))?;
        let b = r.create("node", &NodeConfig::named("b").with_xywh(5.0, 5.0, 50.0, 50.0))?;
        let c = r.create("node", &NodeConfig::named("c"))?;
        r.add_child(a, stage, Placement::Local)?;
        r.add_child(b, stage, Placement::Local)?;
        r.add_child(c, b, Placement::Local)?;
        r.set_bounds(c, Bounds::new(10.0, 10.0, 50.0, 50.0))?;

        r.set_parent(c, a, Placement::World)?;
        assert_eq!(r.parent(c), Some(a));
        assert_eq!(r.bounds(c)?, Bounds::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(r.offsets(c)?, Bounds::new(-90.0, -90.0, -50.0, -50.0));

        // A local reparent keeps offsets instead.
        r.set_parent(c, b, Placement::Local)?;
        assert_eq!(r.bounds(c)?, Bounds::new(-85.0, -85.0, -45.0, -45.0));

        r.set_parent(c, a, Placement::WorldAt(Point::new(0.0, 0.0)))?;
        assert_eq!(r.bounds(c)?, Bounds::new(0.0, 0.0, 40.0, 40.0));
        Ok(())
    }

    #[test]
    fn centered_child_follows_parent_resize() -> Result<()> {
        let (mut r, parent, child) = pair(Bounds::from_xywh(0.0, 0.0, 100.0, 100.0))?;
        r.set_anchors(child, Anchor::MiddleCenter)?;
        r.set_bounds(child, Bounds::new(40.0, 40.0, 60.0, 60.0))?;
        r.set_width(parent, 200.0)?;
        r.set_height(parent, 50.0)?;
        assert_eq!(r.bounds(child)?, Bounds::new(90.0, 15.0, 110.0, 35.0));
        assert_eq!(r.width(child)?, 20.0);
        Ok(())
    }
}
