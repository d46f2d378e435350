/// A coarse, imperfect approximation of "administrative boundary": TLDs
/// under which essentially every registration is `*.example.tld` rather
/// than `example.tld` directly, so one extra label belongs to the public
/// suffix. Picked in 2014 by eyeballing the public suffix list for TLDs
/// whose rules were uniformly `*.tld` or `something.tld`; almost
/// certainly stale by now, kept only because replacing it needs a real
/// publicsuffix list, which is out of scope here.
const WIDE_TLDS: &[&str] = &[
    "bd", "bn", "ck", "cy", "er", "fj", "fk", "gu", "il", "jm", "ke", "kh", "kw", "mm", "mz", "ni",
    "np", "pg", "ye", "za", "zm", "zw",
];

fn is_ip_address(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }
    if host.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return true;
    }
    host.contains(':') && host.bytes().all(|b| b.is_ascii_hexdigit() || b == b':' || b == b'.')
}

fn public_internal_dots(host: &str) -> usize {
    let trimmed = host.strip_suffix('.').unwrap_or(host);
    let tld = match trimmed.rfind('.') {
        Some(dot) => &trimmed[dot + 1..],
        None => return 1,
    };
    if WIDE_TLDS.iter().any(|t| t.eq_ignore_ascii_case(tld)) {
        2
    } else {
        1
    }
}

/// Returns the portion of `host` that is "public", e.g. `dillo.org` for
/// `www.dillo.org`. IP addresses are returned unchanged.
fn find_public_suffix(host: &str) -> &str {
    if host.is_empty() || is_ip_address(host) {
        return host;
    }

    let trimmed = host.strip_suffix('.').unwrap_or(host);
    let mut dots = public_internal_dots(trimmed);
    let mut start = trimmed.len();
    for (i, b) in trimmed.bytes().enumerate().rev() {
        if b == b'.' {
            if dots == 0 {
                break;
            }
            dots -= 1;
        }
        start = i;
    }
    &trimmed[start..]
}

/// Whether `host_a` and `host_b` look like they belong to the same
/// organization, by comparing their public suffixes case-insensitively.
pub fn same_organization(host_a: &str, host_b: &str) -> bool {
    find_public_suffix(host_a).eq_ignore_ascii_case(find_public_suffix(host_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomain_shares_organization_with_parent() {
        assert!(same_organization("www.dillo.org", "dillo.org"));
    }

    #[test]
    fn unrelated_hosts_differ() {
        assert!(!same_organization("dillo.org", "example.com"));
    }

    #[test]
    fn wide_tld_keeps_one_extra_label() {
        // Under a wide TLD, "category.bd" isn't itself registrable, so the
        // organizational boundary sits one label deeper than usual.
        assert!(same_organization("x.a.example.bd", "y.a.example.bd"));
        assert!(!same_organization("a.example.bd", "b.example.bd"));
    }

    #[test]
    fn ip_addresses_compare_literally() {
        assert!(same_organization("127.0.0.1", "127.0.0.1"));
        assert!(!same_organization("127.0.0.1", "127.0.0.2"));
    }
}
