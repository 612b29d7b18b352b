//! # Pages Runtime
//!
//! Request-time half of file-convention routing for edge functions:
//! - Resolves a route table's `file:export` references to executable handlers
//! - Builds a chain per request: every prefix-matching middleware (least
//!   specific first) followed by the first exactly matching module
//! - Drives the chain through `next()`, letting handlers substitute the request
//! - Falls through to the plugin's asset service or the enclosing continuation
//!
//! ## Example
//!
//! ```
//! use axum::http::HeaderValue;
//! use axum::response::IntoResponse;
//! use pages_router::{synthesize, RouteTableBuilder};
//! use pages_runtime::{Dispatcher, Env, HandlerRegistry};
//!
//! let mut builder = RouteTableBuilder::new();
//! builder.add(synthesize("_middleware.ts", "onRequest", None, "/")).unwrap();
//! builder.add(synthesize("index.ts", "onRequestGet", None, "/")).unwrap();
//!
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .register("_middleware.ts", "onRequest", |context| async move {
//!         let mut response = context.next.run().await?;
//!         response
//!             .headers_mut()
//!             .insert("x-powered-by", HeaderValue::from_static("pages"));
//!         Ok(response)
//!     })
//!     .register("index.ts", "onRequestGet", |_context| async move {
//!         Ok("home".into_response())
//!     });
//!
//! let _app = Dispatcher::from_table(&builder.build(), &registry)
//!     .unwrap()
//!     .into_router(Env::new());
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod context;
mod dispatcher;
mod env;
mod handler;
pub mod response;

pub use context::{Data, EventContext, Next, Outer, WaitUntil};
pub use dispatcher::{
    relative_path, Dispatcher, PluginConfig, WorkerContext, DEFAULT_BODY_LIMIT,
};
pub use env::{Env, Fetcher, ServeDirFetcher, ASSETS_BINDING};
pub use handler::{
    handler, BoxFuture, HandlerRegistry, HandlerResult, PagesFunction, ResolveError,
    ResolvedRoutes,
};

/// Buffered request, cloneable so every chain step can receive the current one
pub type Request = axum::http::Request<axum::body::Bytes>;

pub type Response = axum::response::Response;
