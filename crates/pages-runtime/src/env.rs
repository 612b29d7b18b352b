/// Environment bindings visible to handlers
use crate::handler::HandlerResult;
use crate::Request;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Uri;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Binding name of the static asset service
pub const ASSETS_BINDING: &str = "ASSETS";

/// A service reachable through a binding, called like `fetch(request)`
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: Request) -> HandlerResult;
}

/// Named bindings and plain-text variables
#[derive(Clone, Default)]
pub struct Env {
    bindings: HashMap<String, Arc<dyn Fetcher>>,
    vars: HashMap<String, String>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(mut self, name: impl Into<String>, fetcher: impl Fetcher + 'static) -> Self {
        self.bindings.insert(name.into(), Arc::new(fetcher));
        self
    }

    /// Binds `fetcher` as the asset service
    pub fn with_assets(self, fetcher: impl Fetcher + 'static) -> Self {
        self.with_binding(ASSETS_BINDING, fetcher)
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn binding(&self, name: &str) -> Option<&Arc<dyn Fetcher>> {
        self.bindings.get(name)
    }

    pub fn assets(&self) -> Option<&Arc<dyn Fetcher>> {
        self.binding(ASSETS_BINDING)
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bindings: Vec<&String> = self.bindings.keys().collect();
        bindings.sort();
        f.debug_struct("Env")
            .field("bindings", &bindings)
            .field("vars", &self.vars)
            .finish()
    }
}

/// Serves files from a local directory, for development and tests
///
/// With a prefix set, request paths starting with it are served relative to
/// the directory, so a plugin's rewritten asset URLs map onto its files.
///
/// ```no_run
/// use pages_runtime::{Env, ServeDirFetcher};
///
/// let env = Env::new().with_assets(
///     ServeDirFetcher::new("public").with_prefix("/cdn-cgi/pages-plugins/auth"),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ServeDirFetcher {
    root: PathBuf,
    prefix: Option<String>,
}

impl ServeDirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    fn strip_prefix(&self, uri: &Uri) -> anyhow::Result<Option<Uri>> {
        let Some(prefix) = self.prefix.as_deref() else {
            return Ok(None);
        };
        let Some(rest) = uri.path().strip_prefix(prefix) else {
            return Ok(None);
        };

        let path = if rest.starts_with('/') {
            rest.to_string()
        } else {
            format!("/{}", rest)
        };
        let path_and_query = match uri.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };
        Ok(Some(path_and_query.parse()?))
    }
}

#[async_trait]
impl Fetcher for ServeDirFetcher {
    async fn fetch(&self, request: Request) -> HandlerResult {
        let mut request = request.map(Body::from);
        if let Some(uri) = self.strip_prefix(request.uri())? {
            *request.uri_mut() = uri;
        }

        let response = ServeDir::new(&self.root).oneshot(request).await?;
        Ok(response.map(Body::new))
    }
}
