const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Decodes `%HH` escapes in `s`. Bytes that aren't part of a well-formed
/// escape pass through unchanged, including a lone trailing `%`.
pub fn decode_hex_str(s: &str) -> String {
    if !s.contains('%') {
        return s.to_owned();
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(value) = decode_hex_octet(bytes.get(i + 1..i + 3)) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    // The input only ever contains bytes decoded from a percent-encoded
    // ASCII superset, so this is always valid UTF-8 once re-assembled from
    // the original `s`'s own encoding.
    String::from_utf8(out).unwrap_or_else(|_| s.to_owned())
}

fn decode_hex_octet(pair: Option<&[u8]>) -> Option<u8> {
    let pair = pair?;
    if pair.len() != 2 {
        return None;
    }
    let hi = (pair[0] as char).to_digit(16)?;
    let lo = (pair[1] as char).to_digit(16)?;
    Some(((hi << 4) | lo) as u8)
}

/// Percent-encodes every byte in `s` that isn't alphanumeric or one of
/// `-_.*`, using `application/x-www-form-urlencoded` conventions: spaces
/// become `+` and newlines become `%0D%0A`.
pub fn encode_hex_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        match b {
            b'-' | b'_' | b'.' | b'*' => out.push(b as char),
            b if b.is_ascii_alphanumeric() => out.push(b as char),
            b' ' => out.push('+'),
            b'\n' => out.push_str("%0D%0A"),
            b => push_escaped(&mut out, b),
        }
    }
    out
}

fn push_escaped(out: &mut String, b: u8) {
    out.push('%');
    out.push(HEX[(b >> 4) as usize] as char);
    out.push(HEX[(b & 15) as usize] as char);
}

/// Encodes any byte outside the printable-ASCII-minus-space range as
/// `%HH`, counting how many bytes (and how many of those were plain
/// spaces) needed escaping.
///
/// Mirrors the illegal-character bookkeeping `a_Url_new` performs before
/// resolving a URL string: `illegal_chars` and `illegal_chars_spc` feed
/// diagnostics about how mangled the input was.
pub fn encode_illegal_chars(s: &str) -> (String, u32, u32) {
    let mut illegal = 0u32;
    let mut illegal_spc = 0u32;
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if b == b' ' {
            illegal_spc += 1;
            illegal += 1;
            push_escaped(&mut out, b);
        } else if b > 0x1F && b < 0x7F {
            out.push(b as char);
        } else {
            illegal += 1;
            push_escaped(&mut out, b);
        }
    }
    (out, illegal, illegal_spc)
}

/// Strips a leading `URL:` prefix, enclosing `<...>` delimiters, and any
/// embedded control characters or spaces, per RFC 3986's advice for
/// importing URLs from other media (e.g. pasted text, mail headers).
pub fn strip_delimiters(s: &str) -> String {
    let mut rest = s;
    if let Some(stripped) = rest.strip_prefix("URL:") {
        rest = stripped;
    }
    rest = rest.strip_prefix('<').unwrap_or(rest);

    let mut out: String = rest.chars().filter(|&c| c > '\u{1F}' && c < '\u{7F}' && c != ' ').collect();
    if out.ends_with('>') {
        out.pop();
    }
    out
}
