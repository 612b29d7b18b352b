/// File path → route path conversion
///
/// Pure functional parsing of handler file locations into route entries.
/// All functions are **pure**: same input → same output, no side effects.
use crate::path::{join_route_path, normalize_base_url, to_url_path};
use crate::route::pattern::rewrite_brackets;
use crate::{HandlerRef, HttpMethod, RouteEntry};

/// Role a file plays, decided by its basename (extension stripped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// `index`: terminates requests for its directory
    Index,
    /// `_middleware` (or the deprecated `_middleware_`): wraps its whole subtree
    Middleware,
    /// Any other name: terminates requests for its own path
    Leaf,
}

impl FileRole {
    pub fn from_stem(stem: &str) -> Self {
        match stem {
            "index" => FileRole::Index,
            // TODO: drop `_middleware_` once projects have migrated to `_middleware`
            "_middleware" | "_middleware_" => FileRole::Middleware,
            _ => FileRole::Leaf,
        }
    }

    /// Whether the basename is dropped so the route collapses onto the directory
    pub fn collapses(&self) -> bool {
        matches!(self, FileRole::Index | FileRole::Middleware)
    }
}

/// Splits `dir/name.ext` into (`dir/name`, `name`), stripping the extension
///
/// Like a path's extension, only a dot after the first character of the
/// basename starts an extension.
fn strip_extension(relative: &str) -> (&str, &str) {
    let basename_start = relative.rfind('/').map(|i| i + 1).unwrap_or(0);
    let basename = &relative[basename_start..];

    match basename.rfind('.') {
        Some(dot) if dot > 0 => {
            let end = basename_start + dot;
            (&relative[..end], &relative[basename_start..end])
        }
        _ => (relative, basename),
    }
}

/// Computes the route path and role for a handler file
///
/// # Arguments
///
/// * `relative_file` - File path relative to the functions directory, with extension
/// * `base_url` - Configured base URL (normalized here)
///
/// # Examples
///
/// ```
/// use pages_router::{route_path_for_file, FileRole};
///
/// assert_eq!(
///     route_path_for_file("blog/index.ts", "/site"),
///     ("/site/blog".to_string(), FileRole::Index)
/// );
/// assert_eq!(
///     route_path_for_file("users/[id].js", "/"),
///     ("/users/:id".to_string(), FileRole::Leaf)
/// );
/// assert_eq!(
///     route_path_for_file("_middleware.ts", ""),
///     ("/".to_string(), FileRole::Middleware)
/// );
/// ```
pub fn route_path_for_file(relative_file: &str, base_url: &str) -> (String, FileRole) {
    let relative = to_url_path(relative_file);
    let (without_ext, stem) = strip_extension(&relative);
    let role = FileRole::from_stem(stem);

    let route_relative = if role.collapses() {
        without_ext
            .rfind('/')
            .map(|slash| &without_ext[..slash])
            .unwrap_or("")
    } else {
        without_ext
    };

    let base = normalize_base_url(base_url);
    let route_path = join_route_path(&base, route_relative);
    (rewrite_brackets(&route_path).into_owned(), role)
}

/// Builds the route entry contributed by one matching export
///
/// Middleware files contribute to `middlewares`; every other file contributes
/// to `modules`.
///
/// # Examples
///
/// ```
/// use pages_router::{synthesize, HttpMethod};
///
/// let entry = synthesize("api/_middleware.ts", "onRequest", None, "/");
/// assert_eq!(entry.route_path, "/api");
/// assert_eq!(entry.method, None);
/// assert_eq!(entry.middlewares[0].to_string(), "api/_middleware.ts:onRequest");
/// assert!(entry.modules.is_empty());
///
/// let entry = synthesize("api/todos/[id].ts", "onRequestPut", Some(HttpMethod::Put), "/");
/// assert_eq!(entry.route_path, "/api/todos/:id");
/// assert_eq!(entry.method, Some(HttpMethod::Put));
/// assert_eq!(entry.modules.len(), 1);
/// ```
pub fn synthesize(
    relative_file: &str,
    export_name: &str,
    method: Option<HttpMethod>,
    base_url: &str,
) -> RouteEntry {
    let (route_path, role) = route_path_for_file(relative_file, base_url);
    let handler = HandlerRef::new(to_url_path(relative_file), export_name);

    match role {
        FileRole::Middleware => RouteEntry::middleware(route_path, method, handler),
        FileRole::Index | FileRole::Leaf => RouteEntry::module(route_path, method, handler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("a/b/index.ts"), ("a/b/index", "index"));
        assert_eq!(strip_extension("index.test.ts"), ("index.test", "index.test"));
        assert_eq!(strip_extension("a.b/c"), ("a.b/c", "c"));
        assert_eq!(strip_extension(".hidden"), (".hidden", ".hidden"));
    }

    #[test]
    fn test_deprecated_middleware_alias() {
        assert_eq!(FileRole::from_stem("_middleware_"), FileRole::Middleware);
        assert_eq!(FileRole::from_stem("_middlewares"), FileRole::Leaf);
    }

    #[test]
    fn test_root_index_under_base() {
        let (path, role) = route_path_for_file("index.js", "site");
        assert_eq!(path, "/site");
        assert_eq!(role, FileRole::Index);
    }

    #[test]
    fn test_nested_catch_all_and_param() {
        let (path, _) = route_path_for_file("posts/[[slug]]/[id].ts", "/");
        assert_eq!(path, "/posts/:slug*/:id");
    }

    #[test]
    fn test_dynamic_directory_index() {
        let (path, role) = route_path_for_file("users/[id]/index.tsx", "/");
        assert_eq!(path, "/users/:id");
        assert_eq!(role, FileRole::Index);
    }

    #[test]
    fn test_windows_separators() {
        let entry = synthesize("blog\\[slug].ts", "onRequest", None, "/");
        assert_eq!(entry.route_path, "/blog/:slug");
        assert_eq!(entry.modules[0].file, "blog/[slug].ts");
    }
}
