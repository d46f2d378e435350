//! Style flyweights: runs refer to styles through a cheap [`StyleId`]
//! rather than an owned struct, deduplicated by a canonical hash of all
//! their attributes.

use std::rc::Rc;

use dillo_utils::hash128;
use rustc_hash::FxHashMap;

use crate::length::Abs;

/// The attributes that make two styles interchangeable for layout
/// purposes: line metrics, the inter-run space width, the language
/// (which selects a hyphenation dictionary), and a couple of flags.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StyleAttrs {
    pub ascent: Abs,
    pub descent: Abs,
    pub space_width: Abs,
    pub language: Option<Box<str>>,
    pub justify: bool,
    pub can_hyphenate: bool,
}

impl StyleAttrs {
    pub fn plain(ascent: Abs, descent: Abs, space_width: Abs) -> StyleAttrs {
        StyleAttrs { ascent, descent, space_width, language: None, justify: false, can_hyphenate: true }
    }
}

/// A cheap, `Copy` handle to an interned [`StyleAttrs`]. Two runs built
/// from equal attributes share one `StyleId`; comparing ids is
/// comparing a 128-bit hash, not walking the struct.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct StyleId(u128);

/// Owns the flyweight table that [`StyleId`]s point into.
#[derive(Default)]
pub struct StyleInterner {
    table: FxHashMap<u128, Rc<StyleAttrs>>,
}

impl StyleInterner {
    pub fn new() -> StyleInterner {
        StyleInterner::default()
    }

    pub fn intern(&mut self, attrs: StyleAttrs) -> StyleId {
        let hash = hash128(&attrs);
        self.table.entry(hash).or_insert_with(|| Rc::new(attrs));
        StyleId(hash)
    }

    /// Looks up the attributes behind `id`. Panics if `id` was not
    /// produced by this interner — a `StyleId` used against a foreign
    /// interner is a caller bug, not a recoverable condition.
    pub fn resolve(&self, id: StyleId) -> &Rc<StyleAttrs> {
        self.table.get(&id.0).expect("StyleId not known to this interner")
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_attrs_share_one_id() {
        let mut interner = StyleInterner::new();
        let a = StyleAttrs::plain(Abs(12), Abs(3), Abs(4));
        let b = StyleAttrs::plain(Abs(12), Abs(3), Abs(4));
        assert_eq!(interner.intern(a), interner.intern(b));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn different_attrs_get_different_ids() {
        let mut interner = StyleInterner::new();
        let a = StyleAttrs::plain(Abs(12), Abs(3), Abs(4));
        let b = StyleAttrs::plain(Abs(13), Abs(3), Abs(4));
        assert_ne!(interner.intern(a), interner.intern(b));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn resolve_returns_the_interned_attrs() {
        let mut interner = StyleInterner::new();
        let attrs = StyleAttrs::plain(Abs(12), Abs(3), Abs(4));
        let id = interner.intern(attrs.clone());
        assert_eq!(**interner.resolve(id), attrs);
    }
}
