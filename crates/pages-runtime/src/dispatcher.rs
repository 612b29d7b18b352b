/// Request dispatch over a resolved route table
use crate::context::{Chain, ChainParts, Data, Outer, WaitUntil};
use crate::env::Env;
use crate::handler::{HandlerRegistry, HandlerResult, ResolveError, ResolvedRoutes};
use crate::{Request, Response};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderMap, Method, StatusCode, Uri, Version};
use axum::response::IntoResponse;
use axum::Router;
use pages_router::RouteTable;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Largest request body `into_router` buffers unless configured otherwise
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Deployment constants of a plugin, passed in at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginConfig {
    pub name: Option<String>,
    /// When set (and an `ASSETS` binding exists), unmatched requests go to the asset service
    pub assets_directory: Option<String>,
}

impl PluginConfig {
    /// Internal URL of a plugin asset
    ///
    /// ```
    /// use pages_runtime::PluginConfig;
    ///
    /// let plugin = PluginConfig { name: Some("auth".into()), assets_directory: Some("public".into()) };
    /// assert_eq!(
    ///     plugin.asset_url("/login.css"),
    ///     "http://fakehost/cdn-cgi/pages-plugins/auth/login.css"
    /// );
    /// ```
    pub fn asset_url(&self, relative_path: &str) -> String {
        format!(
            "http://fakehost/cdn-cgi/pages-plugins/{}{}",
            self.name.as_deref().unwrap_or_default(),
            relative_path
        )
    }
}

/// What the enclosing platform hands the dispatcher for one request
pub struct WorkerContext {
    pub request: Request,
    /// Path under which the dispatcher is mounted (`""` at the top level)
    pub function_path: String,
    pub env: Arc<Env>,
    pub data: Data,
    /// The enclosing continuation
    pub next: Outer,
    pub wait_until: WaitUntil,
}

impl WorkerContext {
    pub fn new(request: Request, env: impl Into<Arc<Env>>, next: Outer) -> Self {
        Self {
            request,
            function_path: String::new(),
            env: env.into(),
            data: Data::default(),
            next,
            wait_until: WaitUntil::spawn(),
        }
    }

    pub fn with_function_path(mut self, function_path: impl Into<String>) -> Self {
        self.function_path = function_path.into();
        self
    }

    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }
}

/// Top-level request handler for a route table
///
/// # Examples
///
/// ```
/// use axum::body::Bytes;
/// use axum::http;
/// use axum::response::IntoResponse;
/// use pages_router::{synthesize, RouteTableBuilder};
/// use pages_runtime::{Dispatcher, Env, HandlerRegistry};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut builder = RouteTableBuilder::new();
/// builder.add(synthesize("hello.ts", "onRequest", None, "/")).unwrap();
///
/// let mut registry = HandlerRegistry::new();
/// registry.register("hello.ts", "onRequest", |_context| async move {
///     Ok("hello".into_response())
/// });
///
/// let dispatcher = Dispatcher::from_table(&builder.build(), &registry).unwrap();
///
/// let request = http::Request::builder().uri("/hello").body(Bytes::new()).unwrap();
/// let response = dispatcher.fetch(request, Env::new()).await.unwrap();
/// assert_eq!(response.status(), 200);
///
/// let request = http::Request::builder().uri("/missing").body(Bytes::new()).unwrap();
/// let response = dispatcher.fetch(request, Env::new()).await.unwrap();
/// assert_eq!(response.status(), 404);
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<ResolvedRoutes>,
    plugin: Arc<PluginConfig>,
    plugin_args: Arc<Value>,
    body_limit: usize,
}

impl Dispatcher {
    pub fn new(routes: ResolvedRoutes) -> Self {
        Self {
            routes: Arc::new(routes),
            plugin: Arc::new(PluginConfig::default()),
            plugin_args: Arc::new(Value::Null),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn from_table(table: &RouteTable, registry: &HandlerRegistry) -> Result<Self, ResolveError> {
        Ok(Self::new(ResolvedRoutes::resolve(table, registry)?))
    }

    pub fn with_plugin(mut self, plugin: PluginConfig) -> Self {
        self.plugin = Arc::new(plugin);
        self
    }

    pub fn with_plugin_args(mut self, plugin_args: Value) -> Self {
        self.plugin_args = Arc::new(plugin_args);
        self
    }

    /// Caps the request bodies `into_router` buffers; larger ones get 413
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Dispatches one request mounted under an enclosing function
    ///
    /// Handler errors propagate unchanged.
    pub async fn handle(&self, context: WorkerContext) -> HandlerResult {
        let relative_path = relative_path(context.request.uri().path(), &context.function_path);
        let steps = self
            .routes
            .steps(context.request.method().as_str(), &relative_path);
        debug!(
            "{} {} matched {} handler(s)",
            context.request.method(),
            relative_path,
            steps.len()
        );

        let chain = Chain::new(ChainParts {
            steps,
            request: context.request,
            relative_path,
            function_path: context.function_path,
            data: context.data,
            env: context.env,
            plugin: Arc::clone(&self.plugin),
            plugin_args: Arc::clone(&self.plugin_args),
            outer: context.next,
            wait_until: context.wait_until,
        });

        chain.advance(None).await
    }

    /// Dispatches a top-level request; the outer continuation answers 404
    pub async fn fetch(&self, request: Request, env: impl Into<Arc<Env>>) -> HandlerResult {
        self.handle(WorkerContext::new(request, env, not_found()))
            .await
    }

    /// Axum router sending every request through the dispatcher
    ///
    /// Bodies above the body limit are answered with 413 before any handler
    /// runs. Handler errors are logged and answered with 500.
    pub fn into_router(self, env: impl Into<Arc<Env>>) -> Router {
        let env: Arc<Env> = env.into();
        let body_limit = self.body_limit;
        let dispatcher = Arc::new(self);

        Router::new()
            .fallback(
                move |method: Method,
                      uri: Uri,
                      version: Version,
                      headers: HeaderMap,
                      body: Result<Bytes, BytesRejection>| {
                    let dispatcher = Arc::clone(&dispatcher);
                    let env = Arc::clone(&env);
                    async move {
                        let body = match body {
                            Ok(body) => body,
                            Err(rejection) => {
                                warn!("Failed to read request body: {}", rejection);
                                return rejection.into_response();
                            }
                        };

                        let mut request = Request::new(body);
                        *request.method_mut() = method;
                        *request.uri_mut() = uri;
                        *request.version_mut() = version;
                        *request.headers_mut() = headers;
                        dispatcher.serve(request, env).await
                    }
                },
            )
            .layer(DefaultBodyLimit::max(body_limit))
    }

    async fn serve(&self, request: Request, env: Arc<Env>) -> Response {
        match self.fetch(request, env).await {
            Ok(response) => response,
            Err(e) => {
                error!("Handler failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

fn not_found() -> Outer {
    Outer::new(|_request| Box::pin(async { Ok(StatusCode::NOT_FOUND.into_response()) }))
}

/// Request path below the mount point, always starting with `/`
///
/// Only whole segments are stripped; a path outside the mount point is
/// returned unchanged.
pub fn relative_path(path: &str, function_path: &str) -> String {
    let mount = function_path.trim_end_matches('/');
    match path.strip_prefix(mount) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}
