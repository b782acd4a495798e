//! Log view benchmark: render cost over a large buffer.
//!
//! Target: a 200×50 render stays well under one frame at 60 fps, no
//! matter how many lines have been received.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logview::screen::diff::{render_diff, DiffState};
use logview::{Frame, LogBuffer, LogView, Rect};

/// Lines of varying length, some wrapping, some with wide characters.
fn create_log(lines: usize) -> LogBuffer {
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("{i:>8} INFO request served in {}ms", i % 97),
            1 => format!("{i:>8} WARN {}", "slow upstream ".repeat(i % 30)),
            2 => format!("{i:>8} DEBUG 日本語のログ行 {}", i % 13),
            _ => String::new(),
        })
        .collect()
}

fn render_following_tail(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_view_render_tail");
    for lines in [1_000usize, 100_000, 1_000_000] {
        let log = create_log(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &log, |b, log| {
            let mut view = LogView::new(Rect::new(0, 0, 200, 50));
            let mut frame = Frame::new(200, 50);
            b.iter(|| {
                // A change in size puts the tail back on screen every pass.
                view.buffer_changed(0);
                black_box(view.render(&mut frame, black_box(log)))
            });
        });
    }
    group.finish();
}

fn render_after_append(c: &mut Criterion) {
    let mut log = create_log(100_000);
    let mut view = LogView::new(Rect::new(0, 0, 200, 50));
    let mut frame = Frame::new(200, 50);
    view.render(&mut frame, &log);

    c.bench_function("log_view_append_and_diff", |b| {
        b.iter(|| {
            let previous = frame.clone();
            log.push("appended line".to_string());
            view.buffer_changed(log.len());
            view.render(&mut frame, &log);

            let mut output = Vec::with_capacity(16384);
            let mut state = DiffState::new();
            black_box(render_diff(&previous, &frame, &mut output, &mut state))
        });
    });
}

criterion_group!(benches, render_following_tail, render_after_append);
criterion_main!(benches);
