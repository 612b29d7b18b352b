/// Executable handlers and their resolution against a route table
use crate::context::EventContext;
use crate::Response;
use pages_router::{HandlerRef, HttpMethod, Params, RoutePattern, RouteTable};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every handler and continuation returns
pub type HandlerResult = anyhow::Result<Response>;

/// An executable handler export
pub type PagesFunction = Arc<dyn Fn(EventContext) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Wraps an async function as a [`PagesFunction`]
///
/// # Examples
///
/// ```
/// use pages_runtime::{handler, EventContext, PagesFunction};
/// use axum::response::IntoResponse;
///
/// let hello: PagesFunction = handler(|_context: EventContext| async move {
///     Ok("hello".into_response())
/// });
/// ```
pub fn handler<F, Fut>(f: F) -> PagesFunction
where
    F: Fn(EventContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |context| -> BoxFuture<'static, HandlerResult> { Box::pin(f(context)) })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no handler registered for `{0}`")]
    Missing(HandlerRef),
}

/// Maps `file:export` references to executable handlers
///
/// Fills the role the bundler's import graph plays in a deployed script.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerRef, PagesFunction>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` as the export `export` of `file`
    pub fn register<F, Fut>(&mut self, file: &str, export: &str, f: F) -> &mut Self
    where
        F: Fn(EventContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.insert(HandlerRef::new(file, export), handler(f))
    }

    pub fn insert(&mut self, reference: HandlerRef, function: PagesFunction) -> &mut Self {
        self.handlers.insert(reference, function);
        self
    }

    pub fn get(&self, reference: &HandlerRef) -> Option<&PagesFunction> {
        self.handlers.get(reference)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// A route entry with compiled pattern and executable handlers
#[derive(Clone)]
pub(crate) struct ResolvedRoute {
    pattern: RoutePattern,
    method: Option<HttpMethod>,
    modules: Vec<PagesFunction>,
    middlewares: Vec<PagesFunction>,
}

impl ResolvedRoute {
    fn accepts(&self, request_method: &str) -> bool {
        self.method
            .map(|method| method.matches(request_method))
            .unwrap_or(true)
    }
}

/// One queued chain step
pub(crate) struct Step {
    pub handler: PagesFunction,
    pub params: Params,
    /// Matched prefix of the relative path
    pub path: String,
}

/// The route table with every reference resolved, in table order
#[derive(Clone, Default)]
pub struct ResolvedRoutes {
    routes: Vec<ResolvedRoute>,
}

impl ResolvedRoutes {
    /// Resolves every handler reference once; a missing one fails the whole table
    pub fn resolve(table: &RouteTable, registry: &HandlerRegistry) -> Result<Self, ResolveError> {
        let lookup = |references: &[HandlerRef]| -> Result<Vec<PagesFunction>, ResolveError> {
            references
                .iter()
                .map(|reference| {
                    registry
                        .get(reference)
                        .cloned()
                        .ok_or_else(|| ResolveError::Missing(reference.clone()))
                })
                .collect()
        };

        let routes = table
            .iter()
            .map(|entry| -> Result<ResolvedRoute, ResolveError> {
                Ok(ResolvedRoute {
                    pattern: RoutePattern::new(&entry.route_path),
                    method: entry.method,
                    modules: lookup(&entry.modules)?,
                    middlewares: lookup(&entry.middlewares)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handlers to run for a request, in execution order
    ///
    /// Middlewares of every prefix-matching entry, least specific first,
    /// then the modules of the first exactly matching entry that has any.
    pub(crate) fn steps(&self, request_method: &str, relative_path: &str) -> Vec<Step> {
        let mut steps = Vec::new();

        for route in self.routes.iter().rev() {
            if route.middlewares.is_empty() || !route.accepts(request_method) {
                continue;
            }
            if let Some(matched) = route.pattern.match_prefix(relative_path) {
                steps.extend(route.middlewares.iter().map(|handler| Step {
                    handler: Arc::clone(handler),
                    params: matched.params.clone(),
                    path: matched.path.clone(),
                }));
            }
        }

        let terminal = self.routes.iter().find_map(|route| {
            if route.modules.is_empty() || !route.accepts(request_method) {
                return None;
            }
            route
                .pattern
                .match_exact(relative_path)
                .map(|matched| (route, matched))
        });

        if let Some((route, matched)) = terminal {
            steps.extend(route.modules.iter().map(|handler| Step {
                handler: Arc::clone(handler),
                params: matched.params.clone(),
                path: matched.path.clone(),
            }));
        }

        steps
    }
}
