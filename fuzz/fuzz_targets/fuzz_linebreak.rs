#![no_main]

use std::cell::RefCell;
use std::rc::Rc;

use dillo_layout::length::Abs;
use dillo_layout::run::RunFlags;
use dillo_layout::style::{StyleAttrs, StyleInterner};
use dillo_layout::LineBreaker;
use libfuzzer_sys::fuzz_target;

// Each word in the corpus becomes one text run, with a width derived
// from its own byte length so long/short/empty words all exercise the
// breaker; `rewrap` must never panic regardless of how narrow the
// available width is.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 2048 {
        return;
    }

    let available_width = (data.first().copied().unwrap_or(40) as i32) * 4 + 1;

    let interner = Rc::new(RefCell::new(StyleInterner::new()));
    let style = interner.borrow_mut().intern(StyleAttrs::plain(Abs(12), Abs(4), Abs(6)));

    let mut breaker = LineBreaker::new(available_width, Rc::clone(&interner));
    for word in text.split_whitespace().take(256) {
        let width = (word.len() as i32) * 6;
        breaker.append_text_run(word, style, 0, width, 12, 4, RunFlags::empty(), None);
    }
    breaker.rewrap();

    for line in breaker.lines() {
        let _ = line;
    }
});
