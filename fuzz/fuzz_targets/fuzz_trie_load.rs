#![no_main]

use dillo_hyphenate::Trie;
use libfuzzer_sys::fuzz_target;

// The binary trie format is untrusted input whenever a packed pattern
// file is loaded from disk; `load` must reject garbage instead of
// panicking or reading out of bounds.
fuzz_target!(|data: &[u8]| {
    if let Ok(trie) = Trie::load(data) {
        // Any loaded trie must answer `step` for arbitrary bytes
        // without panicking, regardless of how the corpus seeded it.
        let mut state = 0i32;
        for &byte in data.iter().take(256) {
            let _ = trie.step(byte, &mut state);
        }
    }
});
