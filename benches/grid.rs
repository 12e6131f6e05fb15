//! Benchmarks for the grid engines.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use vgrid::layout::{compute_column_widths, CharWidthMeasurer, RowHeights, VirtualWindow, WindowParams};
use vgrid::rows::{DefaultComparators, FilterSpec, RowPipeline, SortKey};
use vgrid::{ColumnCollection, ColumnSpec, DataGrid, GridSettings};

/// Deterministic pseudo-random rows: `{ id, name, score }`.
fn make_rows(count: usize) -> Vec<Value> {
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|id| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            json!({
                "id": id,
                "name": format!("user{:05}", seed % 50_000),
                "score": (seed % 1000) as f64 / 10.0,
            })
        })
        .collect()
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort");
    for size in [10_000usize, 100_000] {
        let rows = make_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("two_keys", size), &rows, |b, rows| {
            b.iter_batched(
                || RowPipeline::with_rows(rows.clone()),
                |mut pipeline| {
                    pipeline.sort(
                        vec![SortKey::new("score", true), SortKey::new("name", false)],
                        &DefaultComparators,
                    );
                    black_box(pipeline.active_len())
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    for size in [10_000usize, 100_000] {
        let mut pipeline = RowPipeline::with_rows(make_rows(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("substring", size), |b| {
            b.iter(|| {
                let view = pipeline.filter(FilterSpec::new("name", black_box("user12"), false));
                black_box(view.map(|v| v.len()))
            });
        });
    }
    group.finish();
}

fn bench_window_sweep(c: &mut Criterion) {
    let rows = 100_000usize;
    let heights = RowHeights::uniform(24.0);
    c.bench_function("window_scroll_sweep", |b| {
        b.iter(|| {
            let mut window = VirtualWindow::new();
            let mut changed = 0usize;
            let mut offset = 0.0;
            while offset < heights.total_height(rows) {
                let update = window.update(&WindowParams {
                    scroll_offset: offset,
                    viewport_height: 600.0,
                    heights,
                    buffer_rows: 3,
                    active_len: rows,
                });
                changed += update.remove_front + update.remove_back;
                offset += 37.0;
            }
            black_box(changed)
        });
    });
}

fn bench_widths(c: &mut Criterion) {
    let settings = GridSettings::default();
    let specs: Vec<ColumnSpec> = (0..40)
        .map(|i| {
            let spec = ColumnSpec::new(format!("column_{i}"));
            match i % 3 {
                0 => spec.with_width(120.0),
                1 => spec.with_width("10%"),
                _ => spec,
            }
        })
        .collect();
    let columns = ColumnCollection::from_specs(&specs, &settings).expect("valid columns");
    let visible = columns.visible_columns();
    let measurer = CharWidthMeasurer::default();

    c.bench_function("width_allocation_40_columns", |b| {
        b.iter(|| {
            compute_column_widths(
                &visible,
                black_box(2400.0),
                &settings,
                &measurer,
                15.0,
            )
        });
    });

    let mut grid: DataGrid<Value> = DataGrid::new(vgrid::GridOptions {
        columns: specs,
        ..Default::default()
    })
    .expect("valid grid");
    c.bench_function("table_width_changed_forced", |b| {
        b.iter(|| grid.table_width_changed(black_box(2400.0), true));
    });
}

criterion_group!(
    benches,
    bench_sort,
    bench_filter,
    bench_window_sweep,
    bench_widths
);
criterion_main!(benches);
