#![no_main]

use dillo_hyphenate::Hyphenator;
use libfuzzer_sys::fuzz_target;

// The pattern file itself is untrusted whenever a language pack is
// loaded from disk: the first line of the corpus becomes the pattern
// file text, the rest the words to hyphenate against it.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    let mut lines = text.splitn(2, '\n');
    let pattern_text = lines.next().unwrap_or("");
    let word_text = lines.next().unwrap_or("");

    let Ok(hyphenator) = Hyphenator::load_from_text(pattern_text, "", 8) else {
        return;
    };

    for word in word_text.split_whitespace().take(64) {
        let breaks = hyphenator.hyphenate(word);
        for &offset in &breaks {
            assert!(offset > 0 && offset < word.len(), "break offset {offset} outside word {word:?}");
        }
        let mut sorted = breaks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, breaks, "breaks not sorted and distinct for {word:?}");
    }
});
