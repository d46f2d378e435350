use bitflags::bitflags;

bitflags! {
    /// Per-request intent flags carried alongside a [`Url`](crate::Url).
    ///
    /// These never participate in URL identity — [`Url::cmp_identity`] and
    /// [`PartialEq`] deliberately ignore them, matching the notion that two
    /// requests for the same resource are "the same URL" even if one is a
    /// reload and the other isn't.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct UrlFlags: u32 {
        const GET                = 1 << 0;
        const POST               = 1 << 1;
        const IS_INDEX           = 1 << 2;
        const IS_MAP             = 1 << 3;
        const REALM_ACCESS       = 1 << 4;
        const E2E_QUERY          = 1 << 5;
        const RELOAD_IMAGES      = 1 << 6;
        const RELOAD_PAGE        = 1 << 7;
        const RELOAD_FROM_CACHE  = 1 << 8;
        const IGNORE_SCROLL      = 1 << 9;
        const SPAM_SAFE          = 1 << 10;
        const MULTIPART_ENC      = 1 << 11;
    }
}

/// Returns the conventional default port for a URL scheme, if any.
pub fn default_port(scheme: &str) -> Option<u16> {
    Some(match_ignore_ascii_case(scheme)?)
}

fn match_ignore_ascii_case(scheme: &str) -> Option<u16> {
    // Small, fixed table; a match on a lowercased scheme is cheap and
    // avoids pulling in a hashmap for seven entries.
    let lower = scheme.to_ascii_lowercase();
    Some(match lower.as_str() {
        "http" => 80,
        "https" => 443,
        "ftp" => 21,
        "mailto" => 25,
        "news" => 119,
        "telnet" => 23,
        "gopher" => 70,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_schemes() {
        assert_eq!(default_port("http"), Some(80));
        assert_eq!(default_port("HTTPS"), Some(443));
        assert_eq!(default_port("gopher"), Some(70));
    }

    #[test]
    fn unknown_scheme() {
        assert_eq!(default_port("magnet"), None);
    }
}
