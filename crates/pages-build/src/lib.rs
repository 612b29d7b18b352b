//! # Pages Build
//!
//! Build-time half of file-convention routing for edge functions:
//! - Scans a functions directory for handler sources
//! - Finds `onRequest*` exports with tree-sitter grammars (JS, JSX, TS, TSX)
//! - Merges them into a precedence-ordered [`RouteTable`](pages_router::RouteTable)
//! - Writes the table as JSON plus an ES routes module for the bundler
//!
//! ## Example
//!
//! ```no_run
//! use pages_build::{write_route_artifacts, RouteGenerator};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), pages_build::BuildError> {
//! let table = RouteGenerator::new("functions").generate().await?;
//! write_route_artifacts(&table, Path::new("functions"), Path::new(".pages"), "routes.json", "routes.mjs")?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod analyzer;
mod artifacts;
pub mod bundle;
mod error;
mod generate;
mod routes_module;
pub mod scanner;
pub mod transpile;

pub use analyzer::{AnalyzeError, ExportAnalyzer, HandlerExport};
pub use artifacts::{write_route_artifacts, RouteArtifacts};
pub use bundle::{report_build, BuildReport, BundleOptions, Bundler, EsbuildBundler, PluginConstants};
pub use error::BuildError;
pub use generate::RouteGenerator;
pub use routes_module::render_routes_module;
pub use scanner::{scan, SourceFile};
pub use transpile::{CommandTranspiler, Dialect, NativeGrammar, Normalized, TranspileError, Transpiler};
