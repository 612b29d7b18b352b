//! Integration tests for pages-router
//!
//! Tests are organized by feature area and cover:
//! - Route synthesis from file locations
//! - Merging of contributions into a table
//! - Precedence ordering
//! - Matching request paths against the ordered table

use pages_router::{
    compare_routes, synthesize, HandlerKind, HandlerRef, HttpMethod, ParamValue, RouteEntry,
    RoutePattern, RouteTable, RouteTableBuilder,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cmp::Ordering;

fn build(files: &[(&str, &str)], base_url: &str) -> RouteTable {
    let mut builder = RouteTableBuilder::new();
    for (file, export) in files {
        let method = HandlerKind::parse(export).and_then(|kind| kind.method());
        builder
            .add(synthesize(file, export, method, base_url))
            .unwrap();
    }
    builder.build()
}

fn paths(table: &RouteTable) -> Vec<&str> {
    table.iter().map(|entry| entry.route_path.as_str()).collect()
}

// ============================================================================
// Route Synthesis
// ============================================================================

#[rstest]
#[case("index.ts", "/", "/")]
#[case("index.ts", "/site", "/site")]
#[case("about.js", "/", "/about")]
#[case("blog/index.ts", "/site", "/site/blog")]
#[case("blog/index.ts", "site/", "/site/blog")]
#[case("users/[id].ts", "/", "/users/:id")]
#[case("docs/[[path]].ts", "/", "/docs/:path*")]
#[case("posts/[[slug]]/[id].ts", "/", "/posts/:slug*/:id")]
#[case("api/_middleware.ts", "/", "/api")]
#[case("_middleware.js", "/", "/")]
fn test_route_path_synthesis(#[case] file: &str, #[case] base: &str, #[case] expected: &str) {
    let entry = synthesize(file, "onRequest", None, base);
    assert_eq!(entry.route_path, expected);
}

#[test]
fn test_index_collapse_with_method() {
    let table = build(&[("blog/index.ts", "onRequestGet")], "/site");
    let entry = &table.routes()[0];
    assert_eq!(entry.route_path, "/site/blog");
    assert_eq!(entry.method, Some(HttpMethod::Get));
    assert_eq!(entry.modules, vec![HandlerRef::new("blog/index.ts", "onRequestGet")]);
}

#[test]
fn test_handler_grammar() {
    assert_eq!(HandlerKind::parse("onRequest"), Some(HandlerKind::AnyMethod));
    assert_eq!(
        HandlerKind::parse("onRequestDelete"),
        Some(HandlerKind::Method(HttpMethod::Delete))
    );
    assert_eq!(HandlerKind::parse("onRequestget"), None);
    assert_eq!(HandlerKind::parse("onRequestTrace"), None);
    assert_eq!(HandlerKind::parse("handler"), None);
}

// ============================================================================
// Merging
// ============================================================================

#[test]
fn test_index_and_middleware_share_an_entry() {
    let table = build(
        &[
            ("admin/_middleware.ts", "onRequest"),
            ("admin/index.ts", "onRequest"),
        ],
        "/",
    );

    assert_eq!(table.len(), 1);
    let entry = &table.routes()[0];
    assert_eq!(entry.route_path, "/admin");
    assert_eq!(entry.middlewares[0].file, "admin/_middleware.ts");
    assert_eq!(entry.modules[0].file, "admin/index.ts");
}

#[test]
fn test_leaf_and_index_for_same_route_conflict() {
    let mut builder = RouteTableBuilder::new();
    builder
        .add(synthesize("about.ts", "onRequest", None, "/"))
        .unwrap();
    assert!(builder
        .add(synthesize("about/index.ts", "onRequest", None, "/"))
        .is_err());
}

#[test]
fn test_empty_table() {
    let table = build(&[], "/");
    assert!(table.is_empty());
    assert_eq!(serde_json::to_string(&table).unwrap(), "[]");
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_full_precedence_order() {
    let table = build(
        &[
            ("_middleware.ts", "onRequest"),
            ("index.ts", "onRequestGet"),
            ("[[catchall]].ts", "onRequest"),
            ("users/[id].ts", "onRequestGet"),
            ("users/[id].ts", "onRequest"),
            ("users/me.ts", "onRequest"),
            ("users/[id]/posts/[[rest]].ts", "onRequest"),
            ("users/[id]/posts/index.ts", "onRequestPost"),
        ],
        "/",
    );

    assert_eq!(
        paths(&table),
        vec![
            "/users/:id/posts/:rest*",
            "/users/:id/posts",
            "/users/me",
            "/users/:id",
            "/users/:id",
            "/:catchall*",
            "/",
            "/",
        ]
    );

    // method-specific before method-less within one path
    assert_eq!(table.routes()[3].method, Some(HttpMethod::Get));
    assert_eq!(table.routes()[4].method, None);
    assert_eq!(table.routes()[6].method, Some(HttpMethod::Get));
}

#[test]
fn test_segment_count_dominance() {
    let deep = RouteEntry::module("/:a*/:b*/:c*", None, HandlerRef::new("x.ts", "onRequest"));
    let shallow = RouteEntry::module(
        "/a/b",
        Some(HttpMethod::Get),
        HandlerRef::new("a/b.ts", "onRequestGet"),
    );
    assert_eq!(compare_routes(&deep, &shallow), Ordering::Less);
}

#[test]
fn test_precedence_is_total_and_transitive() {
    let route_paths = [
        "/",
        "/a",
        "/b",
        "/:id",
        "/:rest*",
        "/a/b",
        "/a/:id",
        "/:x/b",
        "/a/:rest*",
        "/:x/:y",
        "/a/b/c",
        "/v1:beta",
    ];
    let methods = [None, Some(HttpMethod::Get), Some(HttpMethod::Post)];

    let entries: Vec<RouteEntry> = route_paths
        .iter()
        .flat_map(|path| {
            methods.iter().map(move |method| {
                RouteEntry::module(*path, *method, HandlerRef::new("f.ts", "onRequest"))
            })
        })
        .collect();

    for a in &entries {
        for b in &entries {
            let forward = compare_routes(a, b);
            assert_eq!(forward, compare_routes(b, a).reverse());
            if a.key() != b.key() {
                assert_ne!(forward, Ordering::Equal, "{:?} vs {:?}", a.key(), b.key());
            }

            for c in &entries {
                if forward == Ordering::Less && compare_routes(b, c) == Ordering::Less {
                    assert_eq!(compare_routes(a, c), Ordering::Less);
                }
            }
        }
    }
}

// ============================================================================
// Matching against the table
// ============================================================================

/// First entry (table order) whose pattern exactly matches and has modules
fn first_exact<'a>(table: &'a RouteTable, method: &str, path: &str) -> Option<&'a RouteEntry> {
    table.iter().find(|entry| {
        entry.accepts(method)
            && !entry.modules.is_empty()
            && RoutePattern::new(&entry.route_path).match_exact(path).is_some()
    })
}

#[test]
fn test_literal_wins_over_param() {
    let table = build(
        &[("users/[id].ts", "onRequest"), ("users/me.ts", "onRequest")],
        "/",
    );

    let entry = first_exact(&table, "GET", "/users/me").unwrap();
    assert_eq!(entry.modules[0].file, "users/me.ts");

    let entry = first_exact(&table, "GET", "/users/42").unwrap();
    assert_eq!(entry.modules[0].file, "users/[id].ts");
}

#[test]
fn test_param_inside_segment() {
    let table = build(
        &[
            ("blog/post-[id].ts", "onRequest"),
            ("blog/post-latest.ts", "onRequest"),
            ("users/[id].json.ts", "onRequest"),
        ],
        "/",
    );
    assert!(paths(&table).contains(&"/blog/post-:id"));
    assert!(paths(&table).contains(&"/users/:id.json"));

    let entry = first_exact(&table, "GET", "/blog/post-7").unwrap();
    assert_eq!(entry.modules[0].file, "blog/post-[id].ts");
    let m = RoutePattern::new(&entry.route_path)
        .match_exact("/blog/post-7")
        .unwrap();
    assert_eq!(m.params["id"], ParamValue::One("7".into()));

    let entry = first_exact(&table, "GET", "/blog/post-latest").unwrap();
    assert_eq!(entry.modules[0].file, "blog/post-latest.ts");

    let entry = first_exact(&table, "GET", "/users/42.json").unwrap();
    assert_eq!(entry.modules[0].file, "users/[id].json.ts");
    let m = RoutePattern::new(&entry.route_path)
        .match_exact("/users/42.json")
        .unwrap();
    assert_eq!(m.params["id"], ParamValue::One("42".into()));
    assert!(first_exact(&table, "GET", "/users/42").is_none());
}

#[test]
fn test_method_filtering() {
    let table = build(
        &[("todos.ts", "onRequestPost"), ("todos.ts", "onRequestGet")],
        "/",
    );

    let entry = first_exact(&table, "POST", "/todos").unwrap();
    assert_eq!(entry.modules[0].export, "onRequestPost");
    assert!(first_exact(&table, "DELETE", "/todos").is_none());
}

#[test]
fn test_catch_all_fallback() {
    let table = build(
        &[("index.ts", "onRequest"), ("[[path]].ts", "onRequest")],
        "/",
    );

    let entry = first_exact(&table, "GET", "/a/b/c").unwrap();
    assert_eq!(entry.route_path, "/:path*");

    let entry = first_exact(&table, "GET", "/").unwrap();
    assert_eq!(entry.route_path, "/");

    let m = RoutePattern::new("/:path*").match_exact("/a/b/c").unwrap();
    assert_eq!(
        m.params["path"],
        ParamValue::Many(vec!["a".into(), "b".into(), "c".into()])
    );
}

#[test]
fn test_middleware_prefixes_in_reverse_table_order() {
    let table = build(
        &[
            ("_middleware.ts", "onRequest"),
            ("admin/_middleware.ts", "onRequest"),
            ("admin/users.ts", "onRequest"),
        ],
        "/",
    );

    let collected: Vec<&str> = table
        .iter()
        .rev()
        .filter(|entry| {
            RoutePattern::new(&entry.route_path)
                .match_prefix("/admin/users")
                .is_some()
        })
        .flat_map(|entry| entry.middlewares.iter().map(|m| m.file.as_str()))
        .collect();

    assert_eq!(collected, vec!["_middleware.ts", "admin/_middleware.ts"]);
}
