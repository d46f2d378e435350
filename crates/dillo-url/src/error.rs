use thiserror::Error;

/// Failures from the one-shot URL constructors.
///
/// Steady-state navigation treats an unparseable URL as a rejected request
/// at the call site, not as a panic or a poisoned cache entry; this type
/// exists for callers (`Url::parse`) that need to know a single call
/// failed, per the crate's error-handling policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("empty URL string")]
    Empty,

    #[error("relative URL {rel:?} has no scheme and no base URL was given")]
    NoBase { rel: String },

    #[error("malformed authority in {input:?}")]
    MalformedAuthority { input: String },
}
