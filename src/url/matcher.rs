/// Checks if a URL path matches an include/exclude pattern
///
/// Two kinds of patterns are supported:
/// 1. Prefix: "/blog" matches "/blog", "/blog/post-1" but not "/blogging"
/// 2. Wildcard: any pattern containing `*`, where `*` matches any run of
///    characters (including `/`). "*/print" matches "/news/12/print".
///
/// Matching is case-insensitive.
///
/// # Examples
///
/// ```
/// use sitewarden::url::matches_path_pattern;
///
/// assert!(matches_path_pattern("/blog", "/blog/post-1"));
/// assert!(!matches_path_pattern("/blog", "/blogging"));
/// assert!(matches_path_pattern("*.php", "/index.php"));
/// ```
pub fn matches_path_pattern(pattern: &str, path: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let path = path.to_lowercase();

    if pattern.contains('*') {
        return wildcard_match(pattern.as_bytes(), path.as_bytes());
    }

    let prefix = pattern.trim_end_matches('/');
    if prefix.is_empty() {
        // "/" matches everything
        return true;
    }

    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Greedy wildcard matcher with single-star backtracking
fn wildcard_match(pattern: &[u8], text: &[u8]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_text = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }

    p == pattern.len()
}
