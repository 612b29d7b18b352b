/// Precedence ordering of route entries
///
/// More specific routes sort first so that runtime matching, which takes the
/// first exact match, never lets a broad pattern occlude a narrower one.
use crate::path::segments;
use crate::route::pattern::classify_segment;
use crate::RouteEntry;
use std::cmp::Ordering;

/// Total order over route entries, most specific first
///
/// 1. More segments first
/// 2. Position by position: wildcard segments after non-wildcard ones, then
///    param segments after literal ones
/// 3. Entries with an explicit method before method-less ones
/// 4. Lexicographic route path
/// 5. Method name, so distinct (path, method) keys never compare equal
///
/// # Examples
///
/// ```
/// use pages_router::{compare_routes, HandlerRef, RouteEntry};
/// use std::cmp::Ordering;
///
/// let literal = RouteEntry::module("/a/b", None, HandlerRef::new("a/b.ts", "onRequest"));
/// let param = RouteEntry::module("/a/:id", None, HandlerRef::new("a/[id].ts", "onRequest"));
/// assert_eq!(compare_routes(&literal, &param), Ordering::Less);
/// ```
pub fn compare_routes(a: &RouteEntry, b: &RouteEntry) -> Ordering {
    let segments_a: Vec<&str> = segments(&a.route_path).collect();
    let segments_b: Vec<&str> = segments(&b.route_path).collect();

    segments_b
        .len()
        .cmp(&segments_a.len())
        .then_with(|| compare_segments(&segments_a, &segments_b))
        .then_with(|| b.method.is_some().cmp(&a.method.is_some()))
        .then_with(|| a.route_path.cmp(&b.route_path))
        .then_with(|| method_name(a).cmp(&method_name(b)))
}

fn method_name(entry: &RouteEntry) -> Option<&'static str> {
    entry.method.map(|method| method.as_str())
}

/// First position where the two (equal-length) paths differ in kind
fn compare_segments(segments_a: &[&str], segments_b: &[&str]) -> Ordering {
    segments_a
        .iter()
        .zip(segments_b)
        .map(|(a, b)| {
            let (a, b) = (classify_segment(a), classify_segment(b));
            a.is_wildcard()
                .cmp(&b.is_wildcard())
                .then_with(|| a.is_dynamic().cmp(&b.is_dynamic()))
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort into precedence order
pub fn sort_routes(routes: &mut [RouteEntry]) {
    routes.sort_by(compare_routes);
}
