/// Typed view of top-level `export` statements
///
/// tree-sitter hands back untyped nodes; each `export_statement` is lowered
/// once into [`ExportStatement`] and every consumer matches on that enum.
use tree_sitter::Node;

/// One entry of an `export { .. }` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpecifier {
    /// Binding (or re-exported name) on the left of `as`
    pub local: String,
    /// Name on the right of `as`, if any
    pub alias: Option<String>,
    /// `export { type Foo }`
    pub type_only: bool,
}

impl ExportSpecifier {
    /// The name importers see
    pub fn exported_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.local)
    }
}

/// Closed set of export statement shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatement {
    /// `export function name() {}` (also async and generator functions)
    Function { name: String },
    /// `export class Name {}`
    Class { name: String },
    /// `export const a = .., b = ..` (destructuring patterns are skipped)
    Variables { names: Vec<String> },
    /// `export { a, b as c }`, with or without `from`
    Specifiers(Vec<ExportSpecifier>),
    /// `export default ..`
    Default,
    /// `export * from ..` and `export * as ns from ..`
    Namespace,
    /// `export type { .. }`, `export type X = ..`, `export interface ..`, `export declare ..`
    TypeOnly,
    /// Anything else (`export = x`, `export enum`, `export as namespace`)
    Other,
}

impl ExportStatement {
    /// Lowers an `export_statement` node
    pub fn lower(node: Node<'_>, source: &str) -> Self {
        let mut cursor = node.walk();
        let mut is_default = false;
        let mut is_type = false;
        let mut is_namespace = false;
        let mut clause = None;

        for child in node.children(&mut cursor) {
            match child.kind() {
                "default" if !child.is_named() => is_default = true,
                "type" if !child.is_named() => is_type = true,
                "*" | "namespace_export" => is_namespace = true,
                "export_clause" => clause = Some(child),
                _ => {}
            }
        }

        if is_default {
            return ExportStatement::Default;
        }

        if let Some(declaration) = node.child_by_field_name("declaration") {
            return lower_declaration(declaration, source);
        }

        match clause {
            Some(_) if is_type => ExportStatement::TypeOnly,
            Some(clause) => ExportStatement::Specifiers(lower_specifiers(clause, source)),
            None if is_namespace => ExportStatement::Namespace,
            None => ExportStatement::Other,
        }
    }

    /// Runtime names this statement exports
    pub fn exported_names(&self) -> Vec<&str> {
        match self {
            ExportStatement::Function { name } => vec![name.as_str()],
            ExportStatement::Variables { names } => names.iter().map(String::as_str).collect(),
            ExportStatement::Specifiers(specifiers) => specifiers
                .iter()
                .filter(|specifier| !specifier.type_only)
                .map(ExportSpecifier::exported_name)
                .collect(),
            ExportStatement::Class { .. }
            | ExportStatement::Default
            | ExportStatement::Namespace
            | ExportStatement::TypeOnly
            | ExportStatement::Other => Vec::new(),
        }
    }
}

fn lower_declaration(declaration: Node<'_>, source: &str) -> ExportStatement {
    let name = || {
        declaration
            .child_by_field_name("name")
            .map(|name| text(name, source).to_string())
    };

    match declaration.kind() {
        "function_declaration" | "generator_function_declaration" => match name() {
            Some(name) => ExportStatement::Function { name },
            None => ExportStatement::Other,
        },
        "class_declaration" | "abstract_class_declaration" => match name() {
            Some(name) => ExportStatement::Class { name },
            None => ExportStatement::Other,
        },
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = declaration.walk();
            let names = declaration
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "variable_declarator")
                .filter_map(|declarator| declarator.child_by_field_name("name"))
                .filter(|name| name.kind() == "identifier")
                .map(|name| text(name, source).to_string())
                .collect();
            ExportStatement::Variables { names }
        }
        "type_alias_declaration"
        | "interface_declaration"
        | "function_signature"
        | "ambient_declaration" => ExportStatement::TypeOnly,
        _ => ExportStatement::Other,
    }
}

fn lower_specifiers(clause: Node<'_>, source: &str) -> Vec<ExportSpecifier> {
    let mut cursor = clause.walk();
    clause
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "export_specifier")
        .filter_map(|specifier| {
            let local = specifier.child_by_field_name("name")?;
            let alias = specifier.child_by_field_name("alias");

            let mut inner = specifier.walk();
            let type_only = specifier
                .children(&mut inner)
                .any(|child| !child.is_named() && matches!(child.kind(), "type" | "typeof"));

            Some(ExportSpecifier {
                local: module_export_name(local, source),
                alias: alias.map(|alias| module_export_name(alias, source)),
                type_only,
            })
        })
        .collect()
}

/// `foo` or `"foo"` (string-literal export names)
fn module_export_name(node: Node<'_>, source: &str) -> String {
    let raw = text(node, source);
    if node.kind() == "string" && raw.len() >= 2 {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.to_string()
    }
}

fn text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}
