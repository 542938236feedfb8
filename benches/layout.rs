use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use orgchart_layout::builder::build;
use orgchart_layout::config::LayoutConfig;
use orgchart_layout::dimensions::DimensionTracker;
use orgchart_layout::filter::FilterSet;
use orgchart_layout::ir::{GraphModel, GroupRecord};
use orgchart_layout::layout::{layout_initial_with_config, reflow_all};
use std::hint::black_box;

/// One MAG locale per campus, each with `areas` areas of `teams` teams, and
/// a sub-team under every other team.
fn org_records(areas: usize, teams: usize) -> Vec<GroupRecord> {
    let mut records = Vec::new();
    let mut next_id = 1i64;
    for campus in ["CT", "NS", "UC"] {
        let locale = next_id;
        records.push(GroupRecord::new(locale, format!("{campus} MAG"), None).with_group_type(39));
        next_id += 1;
        for a in 0..areas {
            let area = next_id;
            records.push(GroupRecord::new(area, format!("{campus} Area {a}"), Some(locale)).with_group_type(40));
            next_id += 1;
            for t in 0..teams {
                let team = next_id;
                records.push(GroupRecord::new(team, format!("{campus} Team {a}.{t}"), Some(area)));
                next_id += 1;
                if t % 2 == 0 {
                    records.push(GroupRecord::new(next_id, format!("{campus} Crew {a}.{t}"), Some(team)));
                    next_id += 1;
                }
            }
        }
    }
    records
}

fn graph_for(areas: usize, teams: usize) -> GraphModel {
    build(&org_records(areas, teams), &FilterSet::new(["CT MAG", "NS MAG", "UC MAG"]))
}

fn measured(graph: &GraphModel) -> DimensionTracker {
    let mut tracker = DimensionTracker::create();
    for (idx, node) in graph.nodes().iter().enumerate() {
        tracker.update(&node.id, 180.0, 80.0 + (idx % 7) as f32 * 20.0);
    }
    tracker
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let filters = FilterSet::new(["CT MAG", "NS MAG", "UC MAG"]);
    for (areas, teams) in [(3usize, 5usize), (6, 12), (12, 30)] {
        let records = org_records(areas, teams);
        group.bench_with_input(
            BenchmarkId::from_parameter(records.len()),
            &records,
            |b, records| {
                b.iter(|| {
                    let graph = build(black_box(records), &filters);
                    black_box(graph.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_initial_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_initial");
    let config = LayoutConfig::default();
    for (areas, teams) in [(3usize, 5usize), (6, 12), (12, 30)] {
        let graph = graph_for(areas, teams);
        group.bench_with_input(BenchmarkId::from_parameter(graph.len()), &graph, |b, graph| {
            b.iter(|| {
                let layout = layout_initial_with_config(black_box(graph), &config);
                black_box(layout.len());
            });
        });
    }
    group.finish();
}

fn bench_reflow_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflow_all");
    let config = LayoutConfig::default();
    for (areas, teams) in [(3usize, 5usize), (6, 12), (12, 30)] {
        let graph = graph_for(areas, teams);
        let tracker = measured(&graph);
        let layout = layout_initial_with_config(&graph, &config);
        group.bench_with_input(BenchmarkId::from_parameter(graph.len()), &graph, |b, graph| {
            b.iter(|| {
                let reflowed = reflow_all(black_box(graph), &layout, &tracker, &config);
                black_box(reflowed.len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_initial_layout, bench_reflow_all);
criterion_main!(benches);
