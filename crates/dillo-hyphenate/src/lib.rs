//! Liang-algorithm word hyphenation backed by a packed trie, with
//! per-language pattern loading and memoization.

mod cache;
mod error;
mod liang;
mod trie;

pub use crate::cache::HyphenatorCache;
pub use crate::error::HyphenError;
pub use crate::liang::{is_hyphenation_candidate, parse_exception_file, parse_pattern_file, Hyphenator};
pub use crate::trie::{Trie, TrieBuilder};
