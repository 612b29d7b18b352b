/// Path utilities for base URLs, route paths and request paths
///
/// All functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;

/// Normalizes a configured base URL
///
/// The result starts with `/` and never ends with `/`, so a root base
/// collapses to the empty string and route paths can be formed by plain
/// `format!("{base}/{relative}")`.
///
/// Returns `Cow::Borrowed` when the input is already normalized.
///
/// # Examples
///
/// ```
/// use pages_router::path::normalize_base_url;
///
/// assert_eq!(normalize_base_url("/site"), "/site");
/// assert_eq!(normalize_base_url("site/"), "/site");
/// assert_eq!(normalize_base_url("/"), "");
/// assert_eq!(normalize_base_url(""), "");
/// ```
pub fn normalize_base_url(base: &str) -> Cow<'_, str> {
    if base.is_empty() || (base.starts_with('/') && !base.ends_with('/')) {
        return Cow::Borrowed(base);
    }

    let prefixed = if base.starts_with('/') {
        Cow::Borrowed(base)
    } else {
        Cow::Owned(format!("/{}", base))
    };

    // Only one trailing slash is dropped; `//` is left for the caller to notice
    if prefixed.ends_with('/') {
        Cow::Owned(prefixed[..prefixed.len() - 1].to_string())
    } else {
        prefixed
    }
}

/// Converts an OS-specific relative file path into `/`-separated form
///
/// # Examples
///
/// ```
/// use pages_router::path::to_url_path;
///
/// assert_eq!(to_url_path("blog\\[slug].ts"), "blog/[slug].ts");
/// assert_eq!(to_url_path("./index.ts"), "index.ts");
/// ```
pub fn to_url_path(relative: &str) -> Cow<'_, str> {
    let relative = relative.strip_prefix("./").unwrap_or(relative);

    if relative.contains('\\') {
        Cow::Owned(relative.replace('\\', "/"))
    } else {
        Cow::Borrowed(relative)
    }
}

/// Non-empty segments of a path
///
/// # Examples
///
/// ```
/// use pages_router::path::segments;
///
/// let parts: Vec<&str> = segments("/a//b/c/").collect();
/// assert_eq!(parts, vec!["a", "b", "c"]);
/// assert_eq!(segments("/").count(), 0);
/// ```
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Joins a normalized base URL with a relative route path
///
/// Never produces a trailing slash except for the root route `/`.
pub fn join_route_path(base: &str, relative: &str) -> String {
    let joined = format!("{}/{}", base, relative.trim_matches('/'));

    match joined.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}
