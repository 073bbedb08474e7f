//! Target URL construction.

/// Build the absolute upstream URL for one request.
///
/// The result is `base + "/" + path`, with `"?" + query` appended when the
/// query string is non-empty. An empty path yields a trailing-slash URL on
/// purpose. Nothing is escaped, normalized, or validated here; whatever the
/// client sent in path and query passes through verbatim.
pub fn resolve_target_url(base: &str, path: &str, query: Option<&str>) -> String {
    // Inbound paths arrive with a leading slash; the join supplies its own.
    let path = path.strip_prefix('/').unwrap_or(path);
    let mut target = format!("{base}/{path}");
    if let Some(query) = query {
        if !query.is_empty() {
            target.push('?');
            target.push_str(query);
        }
    }
    target
}
