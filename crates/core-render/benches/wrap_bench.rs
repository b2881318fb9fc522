//! Wrap engine throughput: measuring vs rendering the same paragraph.

use core_render::{OutputMode, Region, Renderer, RendererOptions, Size, measure};
use core_span::Span;
use core_terminal::TestTerminal;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn paragraph() -> Span {
    let words = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
    Span::container((0..40).map(|i| {
        if i % 5 == 0 {
            Span::foreground("cyan")
        } else {
            Span::content(format!("{words} "))
        }
    }))
}

fn bench_measure(c: &mut Criterion) {
    let span = paragraph();
    c.bench_function("measure_paragraph_80x50", |b| {
        b.iter(|| measure(black_box(&span), Size::new(80, 50)));
    });
}

fn bench_render_ansi(c: &mut Criterion) {
    let span = paragraph();
    let term = TestTerminal::new(80, 50);
    let mut renderer = Renderer::new(
        term.clone(),
        RendererOptions {
            mode: OutputMode::Ansi,
            reset_after_render: true,
        },
    );
    c.bench_function("render_paragraph_ansi_80x50", |b| {
        b.iter(|| {
            renderer
                .render_to_region(black_box(&span), Region::new(0, 0, 80, 50))
                .ok();
            term.clear_events();
        });
    });
}

criterion_group!(benches, bench_measure, bench_render_ansi);
criterion_main!(benches);
