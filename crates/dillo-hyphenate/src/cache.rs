use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::liang::Hyphenator;

/// Per-language memoization for [`Hyphenator`]s.
///
/// Building a hyphenator means parsing a pattern file and packing a trie,
/// which is wasteful to repeat per word or per document. The owning
/// context builds one cache and hands out clones of the `Rc` it keeps
/// internally; single-threaded, hence the `RefCell` rather than a lock.
#[derive(Default)]
pub struct HyphenatorCache {
    entries: RefCell<FxHashMap<String, Rc<Hyphenator>>>,
}

impl HyphenatorCache {
    pub fn new() -> HyphenatorCache {
        HyphenatorCache::default()
    }

    /// Returns the hyphenator for `lang`, building and caching it via
    /// `load` on first use. If `load` fails, an empty hyphenator (which
    /// never finds a break) is cached in its place so later lookups don't
    /// keep retrying a language whose patterns are missing or corrupt.
    pub fn get_or_load<F>(&self, lang: &str, load: F) -> Rc<Hyphenator>
    where
        F: FnOnce() -> Option<Hyphenator>,
    {
        if let Some(existing) = self.entries.borrow().get(lang) {
            return Rc::clone(existing);
        }

        let hyphenator = Rc::new(load().unwrap_or_else(|| {
            warn!(target: "dillo_hyphenate", lang, "no hyphenation patterns loaded; hyphenation disabled for this language");
            Hyphenator::empty()
        }));
        self.entries.borrow_mut().insert(lang.to_owned(), Rc::clone(&hyphenator));
        hyphenator
    }

    pub fn loaded_languages(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}
