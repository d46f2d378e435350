use std::cell::RefCell;
use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion};
use dillo_layout::{Abs, LineBreaker, RunFlags, SpaceGlue, StyleAttrs, StyleInterner};

const PROSE: &str = "the quick brown fox jumps over the lazy dog while the \
    internationalization of hyphenation patterns remains a particularly \
    knotty counterexample for any line-breaking engine to get right";

fn build_paragraph(available_width: i32) -> LineBreaker {
    let interner = Rc::new(RefCell::new(StyleInterner::new()));
    let style = interner.borrow_mut().intern(StyleAttrs::plain(Abs(12), Abs(3), Abs(5)));
    let mut lb = LineBreaker::new(available_width, interner);
    for word in PROSE.split_whitespace() {
        let flags = RunFlags::WORD_START | RunFlags::WORD_END;
        let space = Some((SpaceGlue { width: 5, stretch: 2, shrink: 1 }, style));
        lb.append_text_run(word, style, 0, word.len() as i32 * 7, 12, 3, flags, space);
    }
    lb.show_missing_lines();
    lb
}

fn linebreak_benchmark(c: &mut Criterion) {
    c.bench_function("wrap-one-paragraph-200px", |b| {
        b.iter(|| build_paragraph(200));
    });

    c.bench_function("wrap-one-paragraph-wide", |b| {
        b.iter(|| build_paragraph(2000));
    });

    c.bench_function("rewrap-after-resize", |b| {
        b.iter(|| {
            let mut lb = build_paragraph(200);
            lb.rewrap();
        });
    });
}

criterion_group!(benches, linebreak_benchmark);
criterion_main!(benches);
