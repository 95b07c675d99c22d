//! Frame loop benchmarks.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use trellis::{
    NodeConfig, NodeId, Placement,
    error::Result,
    geom::Size,
    testing::{Harness, Probe},
};

/// Build a tree `fanout` wide and `depth` deep under the stage.
fn build(h: &mut Harness, fanout: usize, depth: usize) -> Result<Vec<NodeId>> {
    let mut level = vec![h.stage()];
    let mut all = Vec::new();
    for d in 0..depth {
        let mut next = Vec::new();
        for (p, parent) in level.iter().enumerate() {
            for i in 0..fanout {
                let name = format!("n{d}_{p}_{i}");
                let config = NodeConfig::default().with_xywh(1.0, 1.0, 10.0, 10.0);
                next.push(h.child(&name, *parent, config)?);
            }
        }
        all.extend(&next);
        level = next;
    }
    Ok(all)
}

fn benchmark_frame(c: &mut Criterion) {
    c.bench_function("frame_static_tree", |b| {
        let mut h = Harness::with_size(Size::new(800.0, 600.0));
        build(&mut h, 4, 4).expect("failed to build tree");
        b.iter(|| {
            let stats = h.frame().expect("frame failed");
            black_box(stats);
            h.journal.clear();
        });
    });

    c.bench_function("frame_churn", |b| {
        b.iter(|| {
            let mut h = Harness::with_size(Size::new(800.0, 600.0));
            let nodes = build(&mut h, 4, 3).expect("failed to build tree");
            let stage = h.stage();
            let target = nodes[0];
            let probe = Probe::new("mover", &h.journal).on_update(move |ctx| {
                ctx.set_parent(target, stage, Placement::World)?;
                Ok(())
            });
            h.probe_with(probe, "mover", NodeConfig::default())
                .and_then(|m| h.registry().add_child(m, stage, Placement::Local))
                .expect("failed to add mover");
            for _ in 0..4 {
                black_box(h.frame().expect("frame failed"));
            }
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_frame
}
criterion_main!(benches);
