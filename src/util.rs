// src/util.rs — Shared string helpers

/// Truncate a string for display/logging (UTF-8 safe).
///
/// Returns a substring of at most `max_len` bytes, ensuring the cut
/// point falls on a valid UTF-8 character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Like `truncate_str`, but marks a cut with "...".
pub fn ellipsize(s: &str, max_len: usize) -> String {
    let cut = truncate_str(s, max_len);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}
