//! Stylesheet rewriting.
//!
//! The subsetting tool writes its stylesheet next to the font binaries and
//! references them by bare file name. The canonical stylesheet lives in the
//! sibling `css/` directory, so every reference gets a `../fonts/` prefix.

const FONTS_PREFIX: &str = "../fonts/";

/// Rewrites every `url(...)` reference to `url('../fonts/<target>')`.
///
/// A reference is `url(`, an optional quote, one or more characters that are
/// neither quotes nor `)`, an optional quote, then `)`. Anything that does not
/// match that shape is copied through unchanged.
pub fn rewrite_font_urls(css: &str) -> String {
    let mut out = String::with_capacity(css.len() + 64);
    let mut rest = css;

    while let Some(pos) = rest.find("url(") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        match match_url(candidate) {
            Some((target, consumed)) => {
                out.push_str("url('");
                out.push_str(FONTS_PREFIX);
                out.push_str(target);
                out.push_str("')");
                rest = &candidate[consumed..];
            }
            None => {
                // Not a reference; emit the `u` and resume scanning after it.
                out.push('u');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Matches one reference at the start of `s`, returning the target and the
/// number of bytes consumed.
fn match_url(s: &str) -> Option<(&str, usize)> {
    let mut i = "url(".len();
    let bytes = s.as_bytes();
    if matches!(bytes.get(i), Some(b'\'' | b'"')) {
        i += 1;
    }
    let start = i;
    while let Some(&b) = bytes.get(i) {
        if matches!(b, b'\'' | b'"' | b')') {
            break;
        }
        i += 1;
    }
    if i == start {
        return None;
    }
    let target = &s[start..i];
    if matches!(bytes.get(i), Some(b'\'' | b'"')) {
        i += 1;
    }
    if bytes.get(i) != Some(&b')') {
        return None;
    }
    Some((target, i + 1))
}

/// Collects the `url(...)` targets of a stylesheet, in order of appearance.
pub fn font_urls(css: &str) -> Vec<&str> {
    let mut urls = Vec::new();
    let mut rest = css;
    while let Some(pos) = rest.find("url(") {
        let candidate = &rest[pos..];
        match match_url(candidate) {
            Some((target, consumed)) => {
                urls.push(target);
                rest = &candidate[consumed..];
            }
            None => rest = &candidate[1..],
        }
    }
    urls
}
