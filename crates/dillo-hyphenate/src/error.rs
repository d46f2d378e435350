use thiserror::Error;

/// Failures from the one-shot trie/pattern loaders.
///
/// Hyphenation itself never fails: a word that can't be hyphenated for
/// any reason simply yields zero break positions. This type exists only
/// for the constructors that build a [`crate::Hyphenator`] in the first
/// place, where the caller genuinely needs to know loading failed.
#[derive(Debug, Error)]
pub enum HyphenError {
    #[error("bad trie file magic")]
    BadMagic,

    #[error("truncated trie file")]
    Truncated,

    #[error("trie node count {0} exceeds the maximum representable state")]
    TrieTooLarge(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
