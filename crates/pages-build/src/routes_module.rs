/// Routes module emission
///
/// Renders the route table as an ES module the bundler injects into the
/// dispatcher template: every handler reference becomes an import, and the
/// table becomes `export const routes = [..]` with functions in place of
/// `file:export` strings.
use pages_router::{HandlerRef, RouteTable};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

/// Renders the routes module for `table`
///
/// Import specifiers are `functions_dir` joined with each handler's file.
///
/// # Examples
///
/// ```
/// use pages_build::render_routes_module;
/// use pages_router::{synthesize, HttpMethod, RouteTableBuilder};
/// use std::path::Path;
///
/// let mut builder = RouteTableBuilder::new();
/// builder
///     .add(synthesize("users/[id].ts", "onRequestGet", Some(HttpMethod::Get), "/"))
///     .unwrap();
///
/// let module = render_routes_module(&builder.build(), Path::new("../functions"));
/// assert!(module.starts_with(
///     "import { onRequestGet as users__id__ts_onRequestGet } from \"../functions/users/[id].ts\";"
/// ));
/// assert!(module.contains("routePath: \"/users/:id\""));
/// assert!(module.contains("method: \"GET\""));
/// assert!(module.contains("modules: [users__id__ts_onRequestGet]"));
/// ```
pub fn render_routes_module(table: &RouteTable, functions_dir: &Path) -> String {
    let identifiers = assign_identifiers(table);
    let mut module = String::new();

    for reference in table.handler_refs() {
        let specifier = import_specifier(functions_dir, &reference.file);
        let _ = writeln!(
            module,
            "import {{ {} as {} }} from {};",
            reference.export,
            identifiers[reference],
            quote(&specifier)
        );
    }

    module.push_str("\nexport const routes = [\n");
    for entry in table {
        let list = |references: &[HandlerRef]| {
            references
                .iter()
                .map(|reference| identifiers[reference].as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        module.push_str("  {\n");
        let _ = writeln!(module, "    routePath: {},", quote(&entry.route_path));
        if let Some(method) = entry.method {
            let _ = writeln!(module, "    method: {},", quote(method.as_str()));
        }
        let _ = writeln!(module, "    middlewares: [{}],", list(&entry.middlewares));
        let _ = writeln!(module, "    modules: [{}],", list(&entry.modules));
        module.push_str("  },\n");
    }
    module.push_str("];\n");

    module
}

/// Gives every handler reference a unique JavaScript identifier
fn assign_identifiers(table: &RouteTable) -> HashMap<&HandlerRef, String> {
    let mut taken: HashMap<String, usize> = HashMap::new();

    table
        .handler_refs()
        .into_iter()
        .map(|reference| {
            let base = format!("{}_{}", sanitize(&reference.file), reference.export);
            let count = taken.entry(base.clone()).or_insert(0);
            *count += 1;

            let identifier = match *count {
                1 => base,
                n => format!("{}{}", base, n),
            };
            (reference, identifier)
        })
        .collect()
}

/// `api/[id].ts` → `api__id__ts`
fn sanitize(file: &str) -> String {
    let identifier: String = file
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", identifier)
    } else {
        identifier
    }
}

fn import_specifier(functions_dir: &Path, file: &str) -> String {
    let dir = functions_dir.to_string_lossy().replace('\\', "/");
    format!("{}/{}", dir.trim_end_matches('/'), file)
}

/// JSON string quoting is valid JavaScript string quoting
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
