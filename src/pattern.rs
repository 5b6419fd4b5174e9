use regex::Regex;

use crate::errors::GitverResult;

/// Compiles a describe-style glob into an anchored regex over the full ref
/// path `refs/tags/<name>`.
///
/// `*` matches any sequence of characters, `?` matches exactly one; there is
/// no other wildcard syntax. The entire ref path must match, so `v*` matches
/// `refs/tags/v1.0` but not `refs/tags/release-1.0`.
pub fn compile_match_pattern(glob: &str) -> GitverResult<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 16);
    pattern.push_str("^refs/tags/");
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');

    Ok(Regex::new(&pattern)?)
}
