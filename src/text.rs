//! Marker-based substring extraction
//!
//! Used where the site offers no structured document: both the product page's image
//! URLs and the storefront's item list are pulled out of raw markup by fixed literal
//! delimiters.

/// Iterate over every substring found strictly between `begin` and the next `end`.
///
/// Matches never overlap and are returned in document order. Scanning stops at the
/// first `begin` without a closing `end`.
pub fn extract_iter<'a>(
    text: &'a str,
    begin: &'a str,
    end: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    let mut pos = 0;
    std::iter::from_fn(move || {
        let (value, next) = extract_from(text, begin, end, pos)?;
        pos = next;
        Some(value)
    })
}

/// Return the first substring between `begin` and `end`, if any.
pub fn extract_first<'a>(text: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    extract_from(text, begin, end, 0).map(|(value, _)| value)
}

/// Find one match starting at byte offset `pos`, returning it with the offset just
/// past its closing marker.
fn extract_from<'a>(text: &'a str, begin: &str, end: &str, pos: usize) -> Option<(&'a str, usize)> {
    let rest = text.get(pos..)?;
    let start = pos + rest.find(begin)? + begin.len();
    let stop = start + text[start..].find(end)?;
    Some((&text[start..stop], stop + end.len()))
}
