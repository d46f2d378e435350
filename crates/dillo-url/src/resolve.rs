use crate::split::split;

/// Resolves `rel_str` against `base_str`, returning the resolved absolute
/// URL string (not yet re-split into components).
///
/// Follows RFC 3986 §5.3, with the dot-segment cleanup folded in as the
/// reference implementation does it rather than as a separate pass.
pub fn resolve_relative(rel_str: &str, base_str: &str) -> String {
    let rel = split(rel_str);

    let mut solved = String::with_capacity(rel_str.len() + base_str.len());

    // Relative reference with no path, scheme or authority: it's just a
    // query/fragment change (or nothing at all) against the base.
    if rel.path.is_none() && rel.scheme.is_none() && rel.authority.is_none() {
        let base = split(base_str);

        solved.push_str(base_str);
        if let Some(hash) = solved.find('#') {
            solved.truncate(hash);
        }
        if base.path.is_none() {
            solved.push('/');
        }

        if let Some(q) = rel.query {
            if let Some(bq) = base.query {
                solved.truncate(offset_of(base_str, bq) - 1);
            }
            solved.push('?');
            solved.push_str(q);
        }
        if let Some(f) = rel.fragment {
            solved.push('#');
            solved.push_str(f);
        }
        return solved;
    }

    if rel.scheme.is_some() {
        solved.push_str(rel_str);
        return solved;
    }

    let base = split(base_str);
    let mut path = String::with_capacity(64);

    if let Some(authority) = rel.authority {
        let _ = authority; // consumed below, in STEP 7
        if let Some(p) = rel.path {
            path.push_str(p);
        }
    } else {
        if matches!(rel.path, Some(p) if p.starts_with('/')) {
            // Absolute path: the base's path contributes nothing.
        } else if let Some(bp) = base.path {
            path.push_str(bp);
            match path.rfind('/') {
                Some(slash) => path.truncate(slash + 1),
                None => path.clear(),
            }
        }
        if let Some(p) = rel.path {
            path.push_str(p);
        }
        remove_dot_segments(&mut path);
    }

    // STEP 7: reassemble scheme / authority / path / query / fragment.
    if let Some(scheme) = base.scheme {
        solved.push_str(scheme);
        solved.push(':');
    }

    if let Some(authority) = rel.authority {
        solved.push_str("//");
        solved.push_str(authority);
    } else if let Some(authority) = base.authority {
        solved.push_str("//");
        solved.push_str(authority);
    }

    if (rel.authority.is_some() || base.authority.is_some())
        && ((path.is_empty() && (rel.query.is_some() || rel.fragment.is_some()))
            || (!path.is_empty() && !path.starts_with('/')))
    {
        solved.push('/');
    }
    solved.push_str(&path);

    if let Some(q) = rel.query {
        solved.push('?');
        solved.push_str(q);
    }
    if let Some(f) = rel.fragment {
        solved.push('#');
        solved.push_str(f);
    }

    solved
}

/// Byte offset of `needle` within `haystack`, where `needle` is known to be
/// a subslice of `haystack` (as produced by [`split`]).
fn offset_of(haystack: &str, needle: &str) -> usize {
    (needle.as_ptr() as usize) - (haystack.as_ptr() as usize)
}

/// Removes `./` and `../` segments from a path in place, following the
/// reference implementation's three linear passes rather than RFC 3986
/// §5.2.4's recursive-buffer formulation — same result for well-formed
/// paths, much less allocation.
fn remove_dot_segments(path: &mut String) {
    // Pass 1: erase "./" runs, but only the chain reachable from the start
    // of the string — a lone "./" preceded by something other than '/'
    // stops the pass, matching the source exactly.
    loop {
        let Some(p) = path.find("./") else { break };
        let qualifies = p == 0 || path.as_bytes()[p - 1] == b'/';
        if !qualifies {
            break;
        }
        path.replace_range(p..p + 2, "");
    }

    // Pass 2: erase a single trailing "."  if it's a whole segment.
    if path.ends_with('.') {
        let len = path.len();
        if len == 1 || path.as_bytes()[len - 2] == b'/' {
            path.truncate(len - 1);
        }
    }

    // Pass 3: erase "<segment>/.." and "<segment>/../" wherever found.
    let mut cursor = 0usize;
    loop {
        let bytes = path.as_bytes();
        let Some(found) = find_bytes_from(bytes, b"/..", cursor) else { break };
        let after = found + 3;
        let terminates = bytes.get(after).is_none_or(|&c| c == b'/');
        if !terminates {
            cursor = after;
            continue;
        }

        let mut seg_start = found;
        while seg_start > 0 && bytes[seg_start - 1] != b'/' {
            seg_start -= 1;
        }
        let has_more_after = bytes.get(after).is_some();
        let erase_end = after + usize::from(seg_start > 0 && has_more_after);
        path.replace_range(seg_start..erase_end, "");
        cursor = seg_start.saturating_sub(if seg_start > 0 { 1 } else { 0 });
    }
}

fn find_bytes_from(bytes: &[u8], pat: &[u8], from: usize) -> Option<usize> {
    if from > bytes.len() || pat.is_empty() {
        return None;
    }
    bytes[from..]
        .windows(pat.len())
        .position(|w| w == pat)
        .map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_path() {
        assert_eq!(
            resolve_relative("b/c", "http://a.com/x/y"),
            "http://a.com/x/b/c"
        );
    }

    #[test]
    fn resolves_absolute_path() {
        assert_eq!(
            resolve_relative("/z", "http://a.com/x/y"),
            "http://a.com/z"
        );
    }

    #[test]
    fn keeps_scheme_from_relative_when_present() {
        assert_eq!(
            resolve_relative("https://other.com/q", "http://a.com/x/y"),
            "https://other.com/q"
        );
    }

    #[test]
    fn resolves_dot_dot_segments() {
        assert_eq!(
            resolve_relative("../c", "http://a.com/x/y/z"),
            "http://a.com/x/c"
        );
    }

    #[test]
    fn resolves_fragment_only() {
        assert_eq!(
            resolve_relative("#frag", "http://a.com/x/y"),
            "http://a.com/x/y#frag"
        );
    }

    #[test]
    fn resolves_query_only_replaces_base_query() {
        assert_eq!(
            resolve_relative("?new", "http://a.com/x/y?old"),
            "http://a.com/x/y?new"
        );
    }

    #[test]
    fn network_path_reference_keeps_base_scheme() {
        assert_eq!(
            resolve_relative("//other.com/path", "http://a.com/x/y"),
            "http://other.com/path"
        );
    }

    #[test]
    fn current_document_reference_resolves_to_base() {
        assert_eq!(resolve_relative("", "http://a.com/x/y"), "http://a.com/x/y");
    }
}
