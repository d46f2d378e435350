use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::error::UrlError;
use crate::flags::{default_port, UrlFlags};
use crate::percent::encode_illegal_chars;
use crate::resolve::resolve_relative;
use crate::split::split;

/// A parsed, normalized URL.
///
/// Component fields (`scheme`, `authority`, `path`, `query`, `fragment`)
/// are stored as byte ranges into `buffer` rather than separate owned
/// strings, mirroring the source's pointers-into-one-buffer layout; the
/// accessor methods below slice `buffer` on demand.
#[derive(Clone)]
pub struct Url {
    buffer: Box<str>,
    scheme: Option<(usize, usize)>,
    authority: Option<(usize, usize)>,
    path: Option<(usize, usize)>,
    query: Option<(usize, usize)>,
    fragment: Option<(usize, usize)>,
    hostname: Option<Box<str>>,
    port: Option<u16>,
    flags: UrlFlags,
    data: Vec<u8>,
    alt: Option<Box<str>>,
    ismap_url_len: usize,
    illegal_chars: u32,
    illegal_chars_spc: u32,
}

impl Url {
    /// Parses `url_str`, resolving it against `base` (or, if `base` is
    /// `None`, against an inferred `http:`/absolute-path base the same way
    /// an address bar guesses what the user meant).
    pub fn parse(url_str: &str, base: Option<&Url>) -> Result<Url, UrlError> {
        let trimmed = url_str.trim();
        if trimmed.is_empty() {
            return Err(UrlError::Empty);
        }

        let (encoded, illegal_chars, illegal_chars_spc) = encode_illegal_chars(trimmed);

        let (resolved, base_str_owned);
        match base {
            Some(base_url) => {
                base_str_owned = base_url.as_str().to_owned();
                resolved = resolve_relative(&encoded, &base_str_owned);
            }
            None => {
                let parts = split(&encoded);
                let heuristic = apply_no_base_heuristic(&encoded, &parts);
                resolved = resolve_relative(&heuristic, "http:");
            }
        }

        trace!(target: "dillo_url", %url_str, %resolved, "resolved url");

        let mut url = Url::from_resolved_string(resolved)?;
        url.illegal_chars = illegal_chars;
        url.illegal_chars_spc = illegal_chars_spc;
        Ok(url)
    }

    /// Resolves `rel_str` against this URL, equivalent to `Url::parse`
    /// with `Some(self)` as the base but without re-running the
    /// no-base heuristic.
    pub fn resolve(&self, rel_str: &str) -> Result<Url, UrlError> {
        Url::parse(rel_str, Some(self))
    }

    fn from_resolved_string(resolved: String) -> Result<Url, UrlError> {
        if resolved.is_empty() {
            return Err(UrlError::Empty);
        }
        let parts = split(&resolved);
        let span = |m: Option<&str>| m.map(|s| byte_span(&resolved, s));

        let scheme = span(parts.scheme);
        let authority = span(parts.authority);
        let path = span(parts.path);
        let query = span(parts.query);
        let fragment = span(parts.fragment);

        let (hostname, port) = authority
            .map(|(a, b)| parse_hostname_port(&resolved[a..b]))
            .unwrap_or((None, None));

        Ok(Url {
            buffer: resolved.into_boxed_str(),
            scheme,
            authority,
            path,
            query,
            fragment,
            hostname,
            port,
            flags: UrlFlags::empty(),
            data: Vec::new(),
            alt: None,
            ismap_url_len: 0,
            illegal_chars: 0,
            illegal_chars_spc: 0,
        })
    }

    /// The full URL string, rebuilt from its components.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn scheme(&self) -> Option<&str> {
        self.slice(self.scheme)
    }

    pub fn authority(&self) -> Option<&str> {
        self.slice(self.authority)
    }

    pub fn path(&self) -> Option<&str> {
        self.slice(self.path)
    }

    pub fn query(&self) -> Option<&str> {
        self.slice(self.query)
    }

    pub fn fragment(&self) -> Option<&str> {
        self.slice(self.fragment)
    }

    /// The host portion of the authority, with a bracketed IPv6 literal's
    /// brackets stripped. Falls back to the whole authority when there's
    /// no authority to split (i.e. both are `None`).
    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref().or_else(|| self.authority())
    }

    /// The authority's explicit port, if any — does *not* fall back to
    /// the scheme's conventional port; use [`Url::port_or_default`] for
    /// that.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn port_or_default(&self) -> Option<u16> {
        self.port.or_else(|| self.scheme().and_then(default_port))
    }

    pub fn flags(&self) -> UrlFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: UrlFlags) {
        self.flags = flags;
    }

    /// The POST body, if any.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    pub fn alt(&self) -> Option<&str> {
        self.alt.as_deref()
    }

    pub fn set_alt(&mut self, alt: Option<String>) {
        self.alt = alt.map(String::into_boxed_str);
    }

    /// Appends server-side image-map click coordinates as the query
    /// string, remembering where the "real" URL ended so repeated clicks
    /// on the same map don't accumulate queries.
    pub fn set_ismap_coords(&mut self, coord_str: &str) {
        if self.ismap_url_len == 0 {
            self.ismap_url_len = self.buffer.len();
            self.flags |= UrlFlags::IS_MAP;
        }
        let mut rebuilt = String::with_capacity(self.ismap_url_len + 1 + coord_str.len());
        rebuilt.push_str(&self.buffer[..self.ismap_url_len]);
        rebuilt.push('?');
        rebuilt.push_str(coord_str);
        let query_start = self.ismap_url_len + 1;
        self.query = Some((query_start, rebuilt.len()));
        self.buffer = rebuilt.into_boxed_str();
    }

    fn slice(&self, span: Option<(usize, usize)>) -> Option<&str> {
        span.map(|(a, b)| &self.buffer[a..b])
    }

    /// Identity comparison: scheme, authority, path, query and POST data.
    /// Flags, alt text and ismap state are deliberately excluded — two
    /// requests differing only in those are still "the same URL".
    pub fn cmp_identity(&self, other: &Url) -> Ordering {
        if std::ptr::eq(self, other) {
            return Ordering::Equal;
        }
        cmp_ascii_case_opt(self.authority(), other.authority())
            .then_with(|| cmp_path_ignoring_leading_slash(self.path(), other.path()))
            .then_with(|| cmp_opt(self.query(), other.query()))
            .then_with(|| self.data.cmp(&other.data))
            .then_with(|| cmp_ascii_case_opt(self.scheme(), other.scheme()))
    }
}

impl fmt::Debug for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Url").field("url", &self.as_str()).finish()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_identity(other) == Ordering::Equal
    }
}

impl Eq for Url {}

fn byte_span(haystack: &str, needle: &str) -> (usize, usize) {
    let start = (needle.as_ptr() as usize) - (haystack.as_ptr() as usize);
    (start, start + needle.len())
}

/// Splits an authority into `(hostname, port)`, unwrapping a bracketed
/// IPv6 literal (`[::1]:8080`) the way `a_Url_hostname` does.
fn parse_hostname_port(authority: &str) -> (Option<Box<str>>, Option<u16>) {
    if let Some(rest) = authority.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            let host = &rest[..end];
            let port = rest[end + 1..].strip_prefix(':').and_then(|p| p.parse().ok());
            return (Some(host.into()), port);
        }
    }
    match authority.rfind(':') {
        Some(colon) => {
            let port = authority[colon + 1..].parse().ok();
            (Some(authority[..colon].into()), port)
        }
        None => (None, None),
    }
}

/// Implements the address-bar heuristic `a_Url_new` applies when the
/// caller gives no base: bare `example.com/path`-shaped strings become
/// network-path references (`//example.com/path`), and a single leading
/// slash is doubled so it resolves the same way.
fn apply_no_base_heuristic(encoded: &str, parts: &crate::split::RawParts) -> String {
    if !encoded.starts_with('/') {
        if parts.scheme.is_none() {
            return format!("//{encoded}");
        }
        encoded.to_owned()
    } else if !encoded.starts_with("//") {
        format!("/{encoded}")
    } else {
        encoded.to_owned()
    }
}

fn cmp_opt(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
    }
}

fn cmp_ascii_case_opt(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
    }
}

fn cmp_path_ignoring_leading_slash<'a>(a: Option<&'a str>, b: Option<&'a str>) -> Ordering {
    let strip = |p: Option<&'a str>| p.unwrap_or("").strip_prefix('/').unwrap_or(p.unwrap_or(""));
    strip(a).cmp(strip(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trip() {
        let u = Url::parse("http://dillo.org:8080/index.html?long#part2", None).unwrap();
        assert_eq!(u.scheme(), Some("http"));
        assert_eq!(u.authority(), Some("dillo.org:8080"));
        assert_eq!(u.path(), Some("/index.html"));
        assert_eq!(u.query(), Some("long"));
        assert_eq!(u.fragment(), Some("part2"));
        assert_eq!(u.hostname(), Some("dillo.org"));
        assert_eq!(u.port(), Some(8080));
    }

    #[test]
    fn parse_infers_http_scheme_for_bare_host() {
        let u = Url::parse("dillo.org/about", None).unwrap();
        assert_eq!(u.scheme(), Some("http"));
        assert_eq!(u.hostname(), Some("dillo.org"));
        assert_eq!(u.path(), Some("/about"));
    }

    #[test]
    fn resolve_against_base() {
        let base = Url::parse("http://dillo.org/a/b", None).unwrap();
        let child = base.resolve("../c").unwrap();
        assert_eq!(child.as_str(), "http://dillo.org/c");
    }

    #[test]
    fn cmp_identity_ignores_flags_and_alt() {
        let mut a = Url::parse("http://dillo.org/x", None).unwrap();
        let mut b = Url::parse("http://dillo.org/x", None).unwrap();
        a.set_flags(UrlFlags::RELOAD_PAGE);
        b.set_alt(Some("picture".into()));
        assert_eq!(a.cmp_identity(&b), Ordering::Equal);
        assert_eq!(a, b);
    }

    #[test]
    fn cmp_identity_is_case_insensitive_on_scheme_and_authority() {
        let a = Url::parse("HTTP://Dillo.ORG/x", None).unwrap();
        let b = Url::parse("http://dillo.org/x", None).unwrap();
        assert_eq!(a.cmp_identity(&b), Ordering::Equal);
    }

    #[test]
    fn ipv6_authority_splits_host_and_port() {
        let u = Url::parse("http://[::1]:8080/", None).unwrap();
        assert_eq!(u.hostname(), Some("::1"));
        assert_eq!(u.port(), Some(8080));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(Url::parse("   ", None), Err(UrlError::Empty)));
    }

    #[test]
    fn ismap_coords_append_as_query_and_remember_base_length() {
        let mut u = Url::parse("http://dillo.org/map.cgi", None).unwrap();
        u.set_ismap_coords("10,20");
        assert_eq!(u.as_str(), "http://dillo.org/map.cgi?10,20");
        assert!(u.flags().contains(UrlFlags::IS_MAP));
        u.set_ismap_coords("30,40");
        assert_eq!(u.as_str(), "http://dillo.org/map.cgi?30,40");
    }
}
