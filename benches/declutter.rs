use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use timeline_declutter::parser::parse_timeline;
use timeline_declutter::{DeclutterConfig, TickStyle, compute_tick_visibility, compute_visibility};

fn dense_timeline_source(clusters: usize, per_cluster: usize) -> String {
    let mut entries = Vec::with_capacity(clusters * (per_cluster + 1));
    for c in 0..clusters {
        let base = (c as f64) * 100.0;
        for j in 0..per_cluster {
            let time = base + (j as f64) * 2.0;
            let weight = 1 + (c * 7 + j * 31) % 5;
            entries.push(format!(
                r#"{{ "id": "l{c}_{j}", "time": {time:.1}, "width": 40, "weight": {weight} }}"#
            ));
        }
        entries.push(format!(
            r#"{{ "id": "era{c}", "time": [{:.1}, {:.1}], "text": "Era {c}" }}"#,
            base + 30.0,
            base + 60.0
        ));
    }
    let extent = clusters as f64 * 100.0;
    format!(
        r#"{{ "domain": [0, {extent}], "range": [0, {}], "labels": [{}], "ticks": ["100y", "10y", "1y"] }}"#,
        extent * 2.0,
        entries.join(",\n")
    )
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (clusters, per_cluster) in [(10usize, 8usize), (40, 12)] {
        let input = dense_timeline_source(clusters, per_cluster);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("clusters_{clusters}x{per_cluster}")),
            &input,
            |b, data| {
                b.iter(|| {
                    let parsed = parse_timeline(black_box(data)).expect("parse failed");
                    black_box(parsed.labels.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility");
    let config = DeclutterConfig::default().with_fast_text(true);
    for (clusters, per_cluster) in [(10usize, 8usize), (40, 12), (80, 16)] {
        let input = dense_timeline_source(clusters, per_cluster);
        let parsed = parse_timeline(&input).expect("parse failed");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("clusters_{clusters}x{per_cluster}")),
            &parsed,
            |b, parsed| {
                b.iter(|| {
                    let table =
                        compute_visibility(black_box(&parsed.labels), &parsed.scale, &config)
                            .expect("visibility failed");
                    black_box(table.modes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_ticks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ticks");
    let style = TickStyle {
        fast_text: true,
        ..TickStyle::default()
    };
    let input = dense_timeline_source(80, 16);
    let parsed = parse_timeline(&input).expect("parse failed");
    group.bench_function("three_levels", |b| {
        b.iter(|| {
            let ticks =
                compute_tick_visibility(black_box(&parsed.tick_levels), &parsed.scale, &style, 1.0);
            black_box(ticks.len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_visibility, bench_ticks);
criterion_main!(benches);
