//! Word-wrap and width-measurement benchmarks over representative line
//! shapes: short/long ASCII prose and lines mixing wide (CJK) characters.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tuicore::width::{slice_by_column, visible_width, word_wrap_line};

fn ascii_paragraph(words: usize) -> String {
    (0..words).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

fn wide_paragraph(chars: usize) -> String {
    "你好世界".chars().cycle().take(chars).collect()
}

fn benchmark_word_wrap_short_line(c: &mut Criterion) {
    let line = ascii_paragraph(10);
    c.bench_function("word_wrap_short_line", |b| {
        b.iter(|| black_box(word_wrap_line(&line, 40)))
    });
}

fn benchmark_word_wrap_long_line(c: &mut Criterion) {
    let line = ascii_paragraph(2000);
    c.bench_function("word_wrap_long_line", |b| {
        b.iter(|| black_box(word_wrap_line(&line, 80)))
    });
}

fn benchmark_word_wrap_wide_characters(c: &mut Criterion) {
    let line = wide_paragraph(2000);
    c.bench_function("word_wrap_wide_characters", |b| {
        b.iter(|| black_box(word_wrap_line(&line, 80)))
    });
}

fn benchmark_visible_width_with_ansi(c: &mut Criterion) {
    let line: String = (0..500)
        .map(|i| format!("\x1b[3{}mtext{i}\x1b[0m", i % 8))
        .collect();
    c.bench_function("visible_width_with_ansi", |b| {
        b.iter(|| black_box(visible_width(&line)))
    });
}

fn benchmark_slice_by_column_long_line(c: &mut Criterion) {
    let line = ascii_paragraph(2000);
    c.bench_function("slice_by_column_long_line", |b| {
        b.iter(|| black_box(slice_by_column(&line, 100, 200, true)))
    });
}

criterion_group!(
    benches,
    benchmark_word_wrap_short_line,
    benchmark_word_wrap_long_line,
    benchmark_word_wrap_wide_characters,
    benchmark_visible_width_with_ansi,
    benchmark_slice_by_column_long_line,
);
criterion_main!(benches);
