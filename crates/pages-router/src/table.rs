/// Route entries and the ordered route table
use crate::sort::sort_routes;
use crate::{HandlerRef, HttpMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the route table
///
/// Serialized as `{ "routePath", "method"?, "modules", "middlewares" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// URL pattern like `/users/:id` or `/docs/:path*`
    pub route_path: String,
    /// Absent means "matches any method"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Terminal handlers, run on an exact path match
    #[serde(default)]
    pub modules: Vec<HandlerRef>,
    /// Handlers run for every request under this path
    #[serde(default)]
    pub middlewares: Vec<HandlerRef>,
}

/// Identity of an entry within a table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub route_path: String,
    pub method: Option<HttpMethod>,
}

impl RouteEntry {
    /// Entry carrying a single terminal handler
    pub fn module(
        route_path: impl Into<String>,
        method: Option<HttpMethod>,
        handler: HandlerRef,
    ) -> Self {
        Self {
            route_path: route_path.into(),
            method,
            modules: vec![handler],
            middlewares: Vec::new(),
        }
    }

    /// Entry carrying a single middleware handler
    pub fn middleware(
        route_path: impl Into<String>,
        method: Option<HttpMethod>,
        handler: HandlerRef,
    ) -> Self {
        Self {
            route_path: route_path.into(),
            method,
            modules: Vec::new(),
            middlewares: vec![handler],
        }
    }

    pub fn key(&self) -> RouteKey {
        RouteKey {
            route_path: self.route_path.clone(),
            method: self.method,
        }
    }

    /// Whether the entry applies to a request method token
    pub fn accepts(&self, request_method: &str) -> bool {
        self.method
            .map(|method| method.matches(request_method))
            .unwrap_or(true)
    }
}

/// Two different files tried to terminate the same (path, method)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "conflicting handlers for {} {route_path}: `{existing}` and `{incoming}` both terminate this route",
    .method.map(|m| m.as_str()).unwrap_or("*")
)]
pub struct RouteConflict {
    pub route_path: String,
    pub method: Option<HttpMethod>,
    pub existing: HandlerRef,
    pub incoming: HandlerRef,
}

/// The immutable, precedence-ordered route table
///
/// Serializes as a plain JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Wraps entries that are already in precedence order
    ///
    /// Used when loading a serialized table; the order is kept as-is.
    pub fn from_sorted(routes: Vec<RouteEntry>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteEntry> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every handler reference in table order, without duplicates
    pub fn handler_refs(&self) -> Vec<&HandlerRef> {
        let mut seen = std::collections::HashSet::new();
        self.routes
            .iter()
            .flat_map(|entry| entry.middlewares.iter().chain(entry.modules.iter()))
            .filter(|reference| seen.insert(*reference))
            .collect()
    }

    pub fn into_routes(self) -> Vec<RouteEntry> {
        self.routes
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteEntry;
    type IntoIter = std::slice::Iter<'a, RouteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}

/// Single-writer reduction of route contributions into a table
///
/// Contributions sharing a (path, method) key are merged: first-seen order
/// of both handler lists is preserved. A second *file* terminating the same
/// key is rejected with [`RouteConflict`].
///
/// # Examples
///
/// ```
/// use pages_router::{synthesize, HttpMethod, RouteTableBuilder};
///
/// let mut builder = RouteTableBuilder::new();
/// builder.add(synthesize("admin/index.ts", "onRequest", None, "/")).unwrap();
/// builder.add(synthesize("admin/_middleware.ts", "onRequest", None, "/")).unwrap();
///
/// let table = builder.build();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.routes()[0].modules.len(), 1);
/// assert_eq!(table.routes()[0].middlewares.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntry>,
    index: HashMap<RouteKey, usize>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one contribution into the table under construction
    pub fn add(&mut self, entry: RouteEntry) -> Result<(), RouteConflict> {
        let key = entry.key();

        let Some(&position) = self.index.get(&key) else {
            self.index.insert(key, self.entries.len());
            self.entries.push(entry);
            return Ok(());
        };

        let existing = &mut self.entries[position];
        if let (Some(current), Some(incoming)) = (existing.modules.first(), entry.modules.first()) {
            if current.file != incoming.file {
                return Err(RouteConflict {
                    route_path: key.route_path,
                    method: key.method,
                    existing: current.clone(),
                    incoming: incoming.clone(),
                });
            }
        }

        existing.modules.extend(entry.modules);
        existing.middlewares.extend(entry.middlewares);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorts once into precedence order and freezes the table
    pub fn build(self) -> RouteTable {
        let mut routes = self.entries;
        sort_routes(&mut routes);
        RouteTable { routes }
    }
}
