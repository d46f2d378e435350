#![no_main]

use dillo_url::Url;
use libfuzzer_sys::fuzz_target;

// Splits the corpus into a base URL and a relative string, since
// `resolve` is where most of the interesting interactions between the
// two live.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 2048 {
        return;
    }

    let mut parts = text.splitn(2, '\u{1}');
    let base_str = parts.next().unwrap_or("");
    let rel_str = parts.next().unwrap_or("");

    let base = Url::parse(base_str, None).ok();

    if let Ok(url) = Url::parse(base_str, None) {
        // Every accessor must be callable without panicking, and
        // `as_str` must reflect a non-empty string for any URL that
        // parsed successfully.
        assert!(!url.as_str().is_empty());
        let _ = url.scheme();
        let _ = url.authority();
        let _ = url.path();
        let _ = url.query();
        let _ = url.fragment();
        let _ = url.hostname();
        let _ = url.port();
        let _ = url.port_or_default();
        let _ = url.cmp_identity(&url);
    }

    if let Some(base) = &base {
        let _ = base.resolve(rel_str);
    }
});
