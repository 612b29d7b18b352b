/// Per-request context handed to every handler, and the `next()` continuation
use crate::env::Env;
use crate::handler::{BoxFuture, HandlerResult, Step};
use crate::response::strip_null_body;
use crate::{PluginConfig, Request};
use pages_router::Params;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::debug;

/// Request-scoped scratch space shared by every step of one chain
pub type Data = Arc<RwLock<Map<String, Value>>>;

/// The enclosing continuation: what would run if this routing layer were absent
#[derive(Clone)]
pub struct Outer(Arc<dyn Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync>);

impl Outer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Request) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub async fn run(&self, request: Request) -> HandlerResult {
        (self.0)(request).await
    }
}

/// Extends the request lifetime until a background task finishes
#[derive(Clone)]
pub struct WaitUntil(Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>);

impl WaitUntil {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Runs tasks on the current tokio runtime
    pub fn spawn() -> Self {
        Self::new(|task| {
            tokio::spawn(task);
        })
    }

    pub fn register(&self, task: BoxFuture<'static, ()>) {
        (self.0)(task)
    }
}

impl Default for WaitUntil {
    fn default() -> Self {
        Self::spawn()
    }
}

/// What a handler sees
pub struct EventContext {
    /// Current request; a substitute passed to [`Next::run_with`] replaces it
    pub request: Request,
    /// Enclosing function path plus the path this handler's route matched
    pub function_path: String,
    /// Parameters extracted by this handler's route
    pub params: Params,
    pub data: Data,
    pub env: Arc<Env>,
    /// Arguments the plugin was mounted with
    pub plugin_args: Arc<Value>,
    /// Continues with the next queued handler, or the fallback when none remain
    pub next: Next,
    /// Skips the rest of the chain and defers to the enclosing continuation
    pub outer: Outer,
    wait_until: WaitUntil,
}

impl EventContext {
    pub fn wait_until<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.wait_until.register(Box::pin(task));
    }
}

/// Handle to advance the chain
///
/// Advancing is forward-only: each step runs at most once, whichever handler
/// triggers it.
#[derive(Clone)]
pub struct Next {
    chain: Arc<Chain>,
}

impl Next {
    /// Runs the next step with the current request
    pub async fn run(&self) -> HandlerResult {
        Arc::clone(&self.chain).advance(None).await
    }

    /// Runs the next step with `request`, which also becomes the request for
    /// every later step and for the fallback
    pub async fn run_with(&self, request: Request) -> HandlerResult {
        Arc::clone(&self.chain).advance(Some(request)).await
    }
}

/// Request match context: cursor over queued steps plus request-scoped state
pub(crate) struct Chain {
    steps: Mutex<std::vec::IntoIter<Step>>,
    request: Mutex<Request>,
    relative_path: String,
    function_path: String,
    data: Data,
    env: Arc<Env>,
    plugin: Arc<PluginConfig>,
    plugin_args: Arc<Value>,
    outer: Outer,
    wait_until: WaitUntil,
}

pub(crate) struct ChainParts {
    pub steps: Vec<Step>,
    pub request: Request,
    pub relative_path: String,
    pub function_path: String,
    pub data: Data,
    pub env: Arc<Env>,
    pub plugin: Arc<PluginConfig>,
    pub plugin_args: Arc<Value>,
    pub outer: Outer,
    pub wait_until: WaitUntil,
}

impl Chain {
    pub(crate) fn new(parts: ChainParts) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(parts.steps.into_iter()),
            request: Mutex::new(parts.request),
            relative_path: parts.relative_path,
            function_path: parts.function_path,
            data: parts.data,
            env: parts.env,
            plugin: parts.plugin,
            plugin_args: parts.plugin_args,
            outer: parts.outer,
            wait_until: parts.wait_until,
        })
    }

    pub(crate) fn advance(self: Arc<Self>, substitute: Option<Request>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(async move {
            let request = {
                let mut current = self.request.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(substitute) = substitute {
                    *current = substitute;
                }
                duplicate(&current)
            };

            let step = self
                .steps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .next();

            let Some(step) = step else {
                return self.fall_through(request).await;
            };

            let function_path = format!("{}{}", self.function_path, step.path);
            debug!("Running handler for {} at {}", self.relative_path, function_path);

            let context = EventContext {
                request,
                function_path,
                params: step.params,
                data: Arc::clone(&self.data),
                env: Arc::clone(&self.env),
                plugin_args: Arc::clone(&self.plugin_args),
                next: Next {
                    chain: Arc::clone(&self),
                },
                outer: self.outer.clone(),
                wait_until: self.wait_until.clone(),
            };

            let response = (step.handler)(context).await?;
            Ok(strip_null_body(response))
        })
    }

    /// No steps left: the asset service if configured and bound, else the outer continuation
    async fn fall_through(&self, mut request: Request) -> HandlerResult {
        if self.plugin.assets_directory.is_some() {
            if let Some(assets) = self.env.assets() {
                let url = self.plugin.asset_url(&self.relative_path);
                debug!("Serving {} from plugin assets at {}", self.relative_path, url);
                *request.uri_mut() = url.parse()?;
                return assets.fetch(request).await;
            }
        }

        debug!("No handler for {}, deferring to outer continuation", self.relative_path);
        self.outer.run(request).await
    }
}

/// Copies method, URI, version, headers and body; extensions are not carried
fn duplicate(request: &Request) -> Request {
    let mut copy = Request::new(request.body().clone());
    *copy.method_mut() = request.method().clone();
    *copy.uri_mut() = request.uri().clone();
    *copy.version_mut() = request.version();
    *copy.headers_mut() = request.headers().clone();
    copy
}
