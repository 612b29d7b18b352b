/// Export analysis: find handler exports in a source file
///
/// Parses a (normalized) source with the tree-sitter grammar for its dialect
/// and collects every top-level named export matching the handler grammar
/// (`onRequest`, `onRequestGet`, ..).
pub mod ast;

use crate::transpile::Dialect;
use ast::ExportStatement;
use pages_router::{HandlerKind, HttpMethod};
use tree_sitter::{Language, Node, Parser};

/// A matching export found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerExport {
    /// Exported name (the alias for `export { local as onRequest }`)
    pub name: String,
    pub kind: HandlerKind,
}

impl HandlerExport {
    pub fn method(&self) -> Option<HttpMethod> {
        self.kind.method()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("failed to load {dialect:?} grammar: {source}")]
    Language {
        dialect: Dialect,
        #[source]
        source: tree_sitter::LanguageError,
    },

    #[error("parser produced no syntax tree")]
    Unparsable,

    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Holds one parser per grammar; parsers are reused across files
///
/// # Examples
///
/// ```
/// use pages_build::{Dialect, ExportAnalyzer};
///
/// let mut analyzer = ExportAnalyzer::new();
/// let exports = analyzer
///     .analyze(
///         "const get = () => new Response('ok');\nexport { get as onRequestGet };",
///         Dialect::JavaScript,
///     )
///     .unwrap();
///
/// assert_eq!(exports.len(), 1);
/// assert_eq!(exports[0].name, "onRequestGet");
/// ```
#[derive(Default)]
pub struct ExportAnalyzer {
    javascript: Option<Parser>,
    typescript: Option<Parser>,
    tsx: Option<Parser>,
}

impl ExportAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching exports in declaration order, without duplicates
    pub fn analyze(
        &mut self,
        source: &str,
        dialect: Dialect,
    ) -> Result<Vec<HandlerExport>, AnalyzeError> {
        let parser = self.parser(dialect)?;
        let tree = parser.parse(source, None).ok_or(AnalyzeError::Unparsable)?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|node| {
                    let position = node.start_position();
                    (position.row + 1, position.column + 1)
                })
                .unwrap_or((1, 1));
            return Err(AnalyzeError::Syntax { line, column });
        }

        let mut exports: Vec<HandlerExport> = Vec::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if node.kind() != "export_statement" {
                continue;
            }

            let statement = ExportStatement::lower(node, source);
            for name in statement.exported_names() {
                let Some(kind) = HandlerKind::parse(name) else {
                    continue;
                };
                if exports.iter().any(|export| export.name == name) {
                    continue;
                }
                exports.push(HandlerExport {
                    name: name.to_string(),
                    kind,
                });
            }
        }

        Ok(exports)
    }

    fn parser(&mut self, dialect: Dialect) -> Result<&mut Parser, AnalyzeError> {
        let (slot, language): (&mut Option<Parser>, Language) = match dialect {
            Dialect::JavaScript | Dialect::Jsx => (
                &mut self.javascript,
                tree_sitter_javascript::LANGUAGE.into(),
            ),
            Dialect::TypeScript => (
                &mut self.typescript,
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            ),
            Dialect::Tsx => (&mut self.tsx, tree_sitter_typescript::LANGUAGE_TSX.into()),
        };

        if slot.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(&language)
                .map_err(|source| AnalyzeError::Language { dialect, source })?;
            *slot = Some(parser);
        }

        slot.as_mut().ok_or(AnalyzeError::Unparsable)
    }
}

/// Depth-first search for the first error or missing node
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(source: &str, dialect: Dialect) -> Vec<String> {
        ExportAnalyzer::new()
            .analyze(source, dialect)
            .unwrap()
            .into_iter()
            .map(|export| export.name)
            .collect()
    }

    #[test]
    fn test_function_declarations() {
        let source = r#"
            export async function onRequestGet(context) {
                return new Response("hello");
            }
            export function helper() {}
            export function* onRequestPatch() {}
        "#;
        assert_eq!(
            names(source, Dialect::JavaScript),
            vec!["onRequestGet", "onRequestPatch"]
        );
    }

    #[test]
    fn test_variable_declarations() {
        let source = r#"
            export const onRequestPost = async () => new Response(null), other = 1;
            export let onRequestPut = () => {}, onRequestDelete = () => {};
            export var { onRequestHead } = handlers;
        "#;
        assert_eq!(
            names(source, Dialect::JavaScript),
            vec!["onRequestPost", "onRequestPut", "onRequestDelete"]
        );
    }

    #[test]
    fn test_specifier_alias_wins() {
        let source = r#"
            const onRequest = () => {};
            const handler = () => {};
            export { handler as onRequestOptions, onRequest as notAHandler };
        "#;
        assert_eq!(names(source, Dialect::JavaScript), vec!["onRequestOptions"]);
    }

    #[test]
    fn test_reexports() {
        let source = r#"
            export { onRequest } from "./shared";
            export { get as onRequestGet } from "./get";
            export * from "./everything";
        "#;
        assert_eq!(
            names(source, Dialect::JavaScript),
            vec!["onRequest", "onRequestGet"]
        );
    }

    #[test]
    fn test_ignored_forms() {
        let source = r#"
            export default function onRequest() {}
            export class onRequestGet {}
            const onRequestPost = 1;
        "#;
        assert!(names(source, Dialect::JavaScript).is_empty());
    }

    #[test]
    fn test_typescript_forms() {
        let source = r#"
            import type { PagesFunction } from "./types";

            interface Env { KV: string }
            export type onRequestHead = string;
            export type { PagesFunction as onRequestPatch };

            export const onRequestGet: PagesFunction<Env> = async ({ env }) => {
                return new Response(env.KV);
            };

            export function onRequestPost<T>(context: T): Response {
                return new Response(null);
            }
        "#;
        assert_eq!(
            names(source, Dialect::TypeScript),
            vec!["onRequestGet", "onRequestPost"]
        );
    }

    #[test]
    fn test_tsx_and_jsx() {
        let tsx = "export const onRequest = (): JSX.Element => <div>hi</div>;";
        assert_eq!(names(tsx, Dialect::Tsx), vec!["onRequest"]);

        let jsx = "export function onRequestGet() { return <p />; }";
        assert_eq!(names(jsx, Dialect::Jsx), vec!["onRequestGet"]);
    }

    #[test]
    fn test_duplicate_names_reported_once() {
        let source = r#"
            export function onRequest() {}
            export { onRequest as onRequest };
        "#;
        assert_eq!(names(source, Dialect::JavaScript), vec!["onRequest"]);
    }

    #[test]
    fn test_nested_exports_are_not_top_level() {
        let source = "function outer() { const onRequest = 1; return onRequest; }";
        assert!(names(source, Dialect::JavaScript).is_empty());
    }

    #[test]
    fn test_method_inferred() {
        let exports = ExportAnalyzer::new()
            .analyze("export const onRequestDelete = () => {};", Dialect::JavaScript)
            .unwrap();
        assert_eq!(exports[0].method(), Some(HttpMethod::Delete));
    }

    #[rstest]
    #[case("export function onRequest( {", Dialect::JavaScript)]
    #[case("export const onRequest = ;", Dialect::JavaScript)]
    #[case("export const x: = 1;", Dialect::TypeScript)]
    fn test_syntax_errors(#[case] source: &str, #[case] dialect: Dialect) {
        let error = ExportAnalyzer::new().analyze(source, dialect).unwrap_err();
        assert!(matches!(error, AnalyzeError::Syntax { line: 1, .. }), "{error}");
    }
}
