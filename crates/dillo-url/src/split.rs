use std::sync::LazyLock;

use regex::Regex;

/// The canonical RFC 3986 Appendix B splitting regex:
///
/// ```text
/// ^(([^:/?#]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?
///  12            3  4          5       6  7        8 9
/// ```
///
/// Group 2 is scheme, 4 is authority, 5 is path, 7 is query, 9 is fragment.
static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([^:/?#]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?").unwrap()
});

/// The five components of a URI, each `None` when absent or empty — the
/// empty/absent distinction RFC 3986 draws doesn't affect resolution or
/// re-serialization here, so both collapse to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawParts<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: Option<&'a str>,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

fn non_empty(m: Option<regex::Match>) -> Option<&str> {
    m.map(|m| m.as_str()).filter(|s| !s.is_empty())
}

/// Splits a URI reference into its components without resolving it.
pub fn split(s: &str) -> RawParts<'_> {
    let caps = SPLIT_RE
        .captures(s)
        .expect("the splitting regex matches every input, including the empty string");
    RawParts {
        scheme: non_empty(caps.get(2)),
        authority: non_empty(caps.get(4)),
        path: non_empty(caps.get(5)),
        query: non_empty(caps.get(7)),
        fragment: non_empty(caps.get(9)),
    }
}
