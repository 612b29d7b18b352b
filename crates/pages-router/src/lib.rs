//! # Pages Router
//!
//! File-convention route tables for edge functions:
//! - Route synthesis from handler file locations (`blog/[slug].ts` → `/blog/:slug`)
//! - Index (`index`) and middleware (`_middleware`) files collapsing onto their directory
//! - Single-segment (`:id`) and catch-all (`:slug*`) parameters
//! - A strict precedence ordering so overlapping patterns resolve deterministically
//! - Exact and prefix matching of request paths against the ordered table
//!
//! The table is produced once at build time and only read afterwards.
//!
//! ## Example
//!
//! ```
//! use pages_router::{synthesize, HttpMethod, RouteTableBuilder};
//!
//! let mut builder = RouteTableBuilder::new();
//! builder
//!     .add(synthesize("blog/index.ts", "onRequestGet", Some(HttpMethod::Get), "/site"))
//!     .unwrap();
//! builder
//!     .add(synthesize("_middleware.ts", "onRequest", None, "/site"))
//!     .unwrap();
//!
//! let table = builder.build();
//! assert_eq!(table.routes()[0].route_path, "/site/blog");
//! assert_eq!(table.routes()[1].route_path, "/site");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod handler_ref;
mod method;
pub mod matcher;
pub mod path;
pub mod route;
pub mod sort;
mod table;

pub use handler_ref::{HandlerRef, HandlerRefError};
pub use matcher::{MatchResult, ParamValue, Params, RoutePattern};
pub use method::{HandlerKind, HttpMethod, ParseMethodError};
pub use path::normalize_base_url;
pub use route::parser::{route_path_for_file, synthesize, FileRole};
pub use route::pattern::{classify_segment, rewrite_brackets, PatternSegment, SegmentPart};
pub use sort::{compare_routes, sort_routes};
pub use table::{RouteConflict, RouteEntry, RouteKey, RouteTable, RouteTableBuilder};
