/// Route table generation from a functions directory
///
/// scan → per-file (read, transpile, analyze) in parallel → merge in scan
/// order → sort once.
use crate::analyzer::{ExportAnalyzer, HandlerExport};
use crate::error::BuildError;
use crate::scanner::{scan, SourceFile};
use crate::transpile::{Dialect, NativeGrammar, Transpiler};
use pages_router::{synthesize, RouteTable, RouteTableBuilder};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

thread_local! {
    // one analyzer per blocking worker, so its parsers serve every file that worker picks up
    static ANALYZER: RefCell<ExportAnalyzer> = RefCell::new(ExportAnalyzer::new());
}

/// Handler exports found in one file
#[derive(Debug, Clone)]
struct FileExports {
    /// Position in scan order
    index: usize,
    relative: String,
    exports: Vec<HandlerExport>,
}

/// Builds the route table for a functions directory
///
/// # Examples
///
/// ```no_run
/// use pages_build::RouteGenerator;
///
/// # async fn run() -> Result<(), pages_build::BuildError> {
/// let table = RouteGenerator::new("functions")
///     .base_url("/api")
///     .generate()
///     .await?;
///
/// for entry in &table {
///     println!("{} {:?}", entry.route_path, entry.method);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RouteGenerator {
    directory: PathBuf,
    base_url: String,
    transpiler: Arc<dyn Transpiler>,
}

impl RouteGenerator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            base_url: "/".to_string(),
            transpiler: Arc::new(NativeGrammar),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn transpiler(mut self, transpiler: impl Transpiler + 'static) -> Self {
        self.transpiler = Arc::new(transpiler);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Runs the whole pipeline; the first per-file failure aborts the build
    pub async fn generate(&self) -> Result<RouteTable, BuildError> {
        let directory = self.directory.clone();
        let files = tokio::task::spawn_blocking(move || scan(&directory)).await??;
        debug!("Scanned {} file(s) in {:?}", files.len(), self.directory);

        let mut tasks = JoinSet::new();
        for (index, file) in files.into_iter().enumerate() {
            let Some(dialect) = Dialect::from_path(&file.path) else {
                continue;
            };
            let transpiler = Arc::clone(&self.transpiler);
            tasks.spawn_blocking(move || analyze_file(index, file, dialect, transpiler.as_ref()));
        }

        let mut analyzed = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            // dropping `tasks` on the error path aborts whatever is still queued
            analyzed.push(joined??);
        }
        analyzed.sort_by_key(|file| file.index);

        let mut builder = RouteTableBuilder::new();
        for file in &analyzed {
            for export in &file.exports {
                debug!("{} exports {}", file.relative, export.name);
                builder.add(synthesize(
                    &file.relative,
                    &export.name,
                    export.method(),
                    &self.base_url,
                ))?;
            }
        }

        let table = builder.build();
        info!(
            "Generated {} route(s) from {} handler file(s)",
            table.len(),
            analyzed.iter().filter(|file| !file.exports.is_empty()).count()
        );
        Ok(table)
    }
}

fn analyze_file(
    index: usize,
    file: SourceFile,
    dialect: Dialect,
    transpiler: &dyn Transpiler,
) -> Result<FileExports, BuildError> {
    let source = std::fs::read_to_string(&file.path).map_err(|source| BuildError::Read {
        path: file.path.clone(),
        source,
    })?;

    let normalized = transpiler
        .normalize(&source, dialect)
        .map_err(|source| BuildError::Transpile {
            path: file.path.clone(),
            source,
        })?;

    let exports = ANALYZER
        .with(|analyzer| {
            analyzer
                .borrow_mut()
                .analyze(&normalized.code, normalized.dialect)
        })
        .map_err(|source| BuildError::Analyze {
            path: file.path.clone(),
            source,
        })?;

    Ok(FileExports {
        index,
        relative: file.relative,
        exports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source_file(root: &Path, relative: &str, contents: &str) -> SourceFile {
        let path = root.join(relative);
        std::fs::write(&path, contents).unwrap();
        SourceFile {
            path,
            relative: relative.to_string(),
        }
    }

    fn names(file: &FileExports) -> Vec<&str> {
        file.exports.iter().map(|export| export.name.as_str()).collect()
    }

    #[test]
    fn test_worker_analyzer_serves_mixed_dialects() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("a.ts", "export const onRequestGet = (c: any): Response => c.next();"),
            ("b.js", "export function onRequestPost() {}"),
            ("c.tsx", "export const onRequest = () => <div />;"),
            ("d.ts", "export async function onRequestPut(): Promise<Response> { return x; }"),
        ];

        let analyzed: Vec<FileExports> = files
            .iter()
            .enumerate()
            .map(|(index, (relative, contents))| {
                let file = source_file(dir.path(), relative, contents);
                let dialect = Dialect::from_path(&file.path).unwrap();
                analyze_file(index, file, dialect, &NativeGrammar).unwrap()
            })
            .collect();

        assert_eq!(names(&analyzed[0]), vec!["onRequestGet"]);
        assert_eq!(names(&analyzed[1]), vec!["onRequestPost"]);
        assert_eq!(names(&analyzed[2]), vec!["onRequest"]);
        assert_eq!(names(&analyzed[3]), vec!["onRequestPut"]);
    }

    #[test]
    fn test_syntax_error_does_not_poison_worker_analyzer() {
        let dir = tempfile::tempdir().unwrap();
        let broken = source_file(dir.path(), "broken.ts", "export const = ;");
        assert!(matches!(
            analyze_file(0, broken, Dialect::TypeScript, &NativeGrammar),
            Err(BuildError::Analyze { .. })
        ));

        let fine = source_file(dir.path(), "fine.ts", "export function onRequest() {}");
        let analyzed = analyze_file(1, fine, Dialect::TypeScript, &NativeGrammar).unwrap();
        assert_eq!(names(&analyzed), vec!["onRequest"]);
    }
}
