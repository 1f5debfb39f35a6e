use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use workflow_layout::config::LayoutConfig;
use workflow_layout::ir::{NodeKind, Workflow};
use workflow_layout::layout::compute_layout;

/// A long trunk of condition diamonds, each reconverging before the next one.
fn condition_ladder(steps: usize) -> Workflow {
    let mut workflow = Workflow::new();
    workflow.node("start", NodeKind::Trigger);
    let mut prev = "start".to_string();
    for i in 0..steps {
        let (cond, yes, no, join) = (
            format!("c{i}"),
            format!("y{i}"),
            format!("n{i}"),
            format!("j{i}"),
        );
        workflow
            .node(&cond, NodeKind::Condition)
            .node(&yes, NodeKind::Step)
            .node(&no, NodeKind::Step)
            .node(&join, NodeKind::Step)
            .connect(&prev, &cond)
            .connect_via(&cond, "accepted", &yes)
            .connect_via(&cond, "rejected", &no)
            .connect(&yes, &join)
            .connect(&no, &join);
        prev = join;
    }
    workflow
}

/// One parallel node fanning out to `width` branches of `depth` steps that all join at the end.
fn parallel_fanout(width: usize, depth: usize) -> Workflow {
    let mut workflow = Workflow::new();
    let labels: Vec<String> = (0..width).map(|b| format!("branch-{b}")).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    workflow
        .node("start", NodeKind::Trigger)
        .branched_node("fan", NodeKind::Parallel, &label_refs)
        .node("join", NodeKind::End)
        .connect("start", "fan");
    for (b, label) in labels.iter().enumerate() {
        let mut prev = "fan".to_string();
        for d in 0..depth {
            let id = format!("b{b}s{d}");
            workflow.node(&id, NodeKind::Step);
            if d == 0 {
                workflow.connect_labeled(&prev, label, &id);
            } else {
                workflow.connect(&prev, &id);
            }
            prev = id;
        }
        workflow.connect(&prev, "join");
    }
    workflow
}

/// Loops nested `levels` deep, each with a body step and an exit.
fn nested_loops(levels: usize) -> Workflow {
    let mut workflow = Workflow::new();
    workflow.node("start", NodeKind::Trigger);
    let mut prev = "start".to_string();
    for level in 0..levels {
        let (head, body, exit) = (
            format!("loop{level}"),
            format!("body{level}"),
            format!("exit{level}"),
        );
        workflow
            .node(&head, NodeKind::Loop)
            .node(&body, NodeKind::Step)
            .node(&exit, NodeKind::Step)
            .connect(&prev, &head)
            .connect_via(&head, "loop-body", &body)
            .connect(&body, &head)
            .connect_via(&head, "loop-bypass", &exit);
        prev = body;
    }
    workflow
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    let cases = [
        ("condition_ladder_50", condition_ladder(50)),
        ("condition_ladder_500", condition_ladder(500)),
        ("parallel_fanout_20x10", parallel_fanout(20, 10)),
        ("parallel_fanout_100x20", parallel_fanout(100, 20)),
        ("nested_loops_8", nested_loops(8)),
        ("nested_loops_64", nested_loops(64)),
    ];
    for (name, workflow) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), workflow, |b, data| {
            b.iter(|| {
                let layout = compute_layout(black_box(data), &config);
                black_box(layout.nodes.len());
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
