//! Performance benchmarks for schedule evaluation.
//!
//! The kiosk evaluates its schedule once per second, so evaluation cost is
//! negligible in practice. These benchmarks exist to catch regressions in the
//! override window search, which scans every override and may look back
//! across several days.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all schedule benchmarks
//! cargo bench --bench schedule_bench
//!
//! # Run a single group
//! cargo bench --bench schedule_bench -- schedule_evaluation
//! ```

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wallboard_schedule::{
    ScheduleConfig, ScheduleInput, TimeSpecificNavigation, create_default_sequence, evaluate,
    is_time_match,
};

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

fn config_with_overrides(count: usize) -> ScheduleConfig {
    let time_specific = (0..count)
        .map(|i| TimeSpecificNavigation {
            id: format!("o{i}"),
            enabled: true,
            screen: format!("screen-{i}"),
            // Spread across the morning so none is active at noon.
            time: format!("{:02}:{:02}", (i / 60) % 10, i % 60),
            duration_minutes: 15,
            days: Some(vec![1, 3, 5]),
        })
        .collect();

    ScheduleConfig {
        sequences: vec![create_default_sequence()],
        time_specific,
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_evaluation");
    group.throughput(Throughput::Elements(1));

    for count in [0usize, 10, 100] {
        let config = config_with_overrides(count);
        let input = ScheduleInput {
            now: noon(),
            rotation_started_at: noon() - TimeDelta::seconds(3_600),
            last_interaction_at: None,
            displayed_screen: None,
        };

        group.bench_with_input(
            BenchmarkId::new("overrides", count),
            &config,
            |b, config| {
                b.iter(|| {
                    let selection = evaluate(black_box(config), black_box(&input));
                    black_box(selection)
                });
            },
        );
    }

    group.finish();
}

fn bench_time_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_match");
    group.throughput(Throughput::Elements(1));

    let now = noon().time();
    for (name, scheduled) in [("hit", "12:01"), ("miss", "18:30"), ("malformed", "noon")] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(is_time_match(black_box(&now), black_box(scheduled))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_time_match);
criterion_main!(benches);
