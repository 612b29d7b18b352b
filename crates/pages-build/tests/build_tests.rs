//! Integration tests for pages-build
//!
//! Each test lays out a functions directory on disk and runs the pipeline
//! end to end.

use pages_build::{
    write_route_artifacts, BuildError, CommandTranspiler, RouteGenerator,
};
use pages_router::{HandlerRef, HttpMethod, RouteTable};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn functions(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, contents) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn summary(table: &RouteTable) -> Vec<(String, Option<HttpMethod>, Vec<String>, Vec<String>)> {
    table
        .iter()
        .map(|entry| {
            (
                entry.route_path.clone(),
                entry.method,
                entry.modules.iter().map(HandlerRef::to_string).collect(),
                entry.middlewares.iter().map(HandlerRef::to_string).collect(),
            )
        })
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[tokio::test]
async fn test_generates_sorted_table() {
    let dir = functions(&[
        ("_middleware.ts", "export const onRequest = async ({ next }) => next();"),
        ("index.ts", "export function onRequestGet() { return new Response('home'); }"),
        (
            "api/todos/[id].ts",
            "export const onRequestGet = () => {}, onRequestDelete = () => {};",
        ),
        ("api/todos/index.js", "const list = () => {};\nexport { list as onRequestGet };"),
        ("api/[[catchall]].mjs", "export function onRequest() {}"),
        ("lib/helpers.ts", "export function format() {}"),
        ("README.md", "# not a handler"),
    ]);

    let table = RouteGenerator::new(dir.path()).generate().await.unwrap();

    assert_eq!(
        summary(&table),
        vec![
            (
                "/api/todos/:id".to_string(),
                Some(HttpMethod::Delete),
                strings(&["api/todos/[id].ts:onRequestDelete"]),
                vec![],
            ),
            (
                "/api/todos/:id".to_string(),
                Some(HttpMethod::Get),
                strings(&["api/todos/[id].ts:onRequestGet"]),
                vec![],
            ),
            (
                "/api/todos".to_string(),
                Some(HttpMethod::Get),
                strings(&["api/todos/index.js:onRequestGet"]),
                vec![],
            ),
            (
                "/api/:catchall*".to_string(),
                None,
                strings(&["api/[[catchall]].mjs:onRequest"]),
                vec![],
            ),
            ("/".to_string(), Some(HttpMethod::Get), strings(&["index.ts:onRequestGet"]), vec![]),
            ("/".to_string(), None, vec![], strings(&["_middleware.ts:onRequest"])),
        ]
    );
}

#[tokio::test]
async fn test_base_url_prefixes_every_route() {
    let dir = functions(&[
        ("blog/index.ts", "export const onRequestGet = () => {};"),
        ("index.ts", "export const onRequest = () => {};"),
    ]);

    let table = RouteGenerator::new(dir.path())
        .base_url("site/")
        .generate()
        .await
        .unwrap();

    let paths: Vec<&str> = table.iter().map(|entry| entry.route_path.as_str()).collect();
    assert_eq!(paths, vec!["/site/blog", "/site"]);
}

#[tokio::test]
async fn test_empty_directory_yields_empty_table() {
    let dir = functions(&[("utils.ts", "export const helper = 1;")]);
    let table = RouteGenerator::new(dir.path()).generate().await.unwrap();
    assert!(table.is_empty());
}

#[tokio::test]
async fn test_parse_error_aborts_build() {
    let dir = functions(&[
        ("good.ts", "export const onRequest = () => {};"),
        ("broken.js", "export function onRequest( {"),
    ]);

    let error = RouteGenerator::new(dir.path()).generate().await.unwrap_err();
    match &error {
        BuildError::Analyze { path, .. } => assert!(path.ends_with("broken.js")),
        other => panic!("expected analyze error, got {other}"),
    }
    assert!(error.to_string().contains("broken.js"));
}

#[tokio::test]
async fn test_conflicting_modules_abort_build() {
    let dir = functions(&[
        ("about.ts", "export const onRequest = () => {};"),
        ("about/index.ts", "export const onRequest = () => {};"),
    ]);

    let error = RouteGenerator::new(dir.path()).generate().await.unwrap_err();
    assert!(matches!(error, BuildError::Conflict(_)), "{error}");
}

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = RouteGenerator::new(dir.path().join("functions"))
        .generate()
        .await
        .unwrap_err();
    assert!(matches!(error, BuildError::Scan { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_transpiler_output_is_analyzed() {
    let dir = functions(&[("index.ts", "this is not javascript")]);

    let transpiler = CommandTranspiler::new("sh").args([
        "-c",
        "cat >/dev/null; echo 'export function onRequestPut() {}'",
    ]);
    let table = RouteGenerator::new(dir.path())
        .transpiler(transpiler)
        .generate()
        .await
        .unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.routes()[0].method, Some(HttpMethod::Put));
}

#[tokio::test]
async fn test_writes_artifacts() {
    let dir = functions(&[("hello.ts", "export const onRequest = () => {};")]);
    let out = tempfile::tempdir().unwrap();
    let outdir = out.path().join("dist");

    let table = RouteGenerator::new(dir.path()).generate().await.unwrap();
    let artifacts =
        write_route_artifacts(&table, dir.path(), &outdir, "routes.json", "routes.mjs").unwrap();

    let json: RouteTable =
        serde_json::from_str(&fs::read_to_string(&artifacts.routes_json).unwrap()).unwrap();
    assert_eq!(json, table);

    let module = fs::read_to_string(&artifacts.routes_module).unwrap();
    let functions_dir = fs::canonicalize(dir.path()).unwrap();
    let expected_import = format!(
        "import {{ onRequest as hello_ts_onRequest }} from \"{}/hello.ts\";",
        functions_dir.display()
    );
    assert!(module.starts_with(&expected_import), "{module}");
    assert!(Path::new(&artifacts.routes_module).exists());
}
