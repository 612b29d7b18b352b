/// HTTP methods a handler export can be bound to
///
/// Handler exports follow the grammar `onRequest` or `onRequest<Method>`.
/// The bare form is bound to every method.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static HANDLER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^onRequest(Get|Post|Put|Patch|Delete|Options|Head)?$")
        .expect("handler name pattern is valid")
});

/// Methods recognised in handler export names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    /// Canonical upper-case token, as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Maps the capitalised suffix of an export name (`Get`, `Post`, ...)
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "Get" => Some(HttpMethod::Get),
            "Post" => Some(HttpMethod::Post),
            "Put" => Some(HttpMethod::Put),
            "Patch" => Some(HttpMethod::Patch),
            "Delete" => Some(HttpMethod::Delete),
            "Options" => Some(HttpMethod::Options),
            "Head" => Some(HttpMethod::Head),
            _ => None,
        }
    }

    /// Whether a request method token selects this method
    pub fn matches(&self, request_method: &str) -> bool {
        self.as_str() == request_method
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method `{0}`")]
pub struct ParseMethodError(pub String);

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

/// What a matching export name binds to
///
/// # Examples
///
/// ```
/// use pages_router::{HandlerKind, HttpMethod};
///
/// assert_eq!(HandlerKind::parse("onRequest"), Some(HandlerKind::AnyMethod));
/// assert_eq!(
///     HandlerKind::parse("onRequestPost"),
///     Some(HandlerKind::Method(HttpMethod::Post))
/// );
/// assert_eq!(HandlerKind::parse("onRequestget"), None);
/// assert_eq!(HandlerKind::parse("handler"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// `onRequest`
    AnyMethod,
    /// `onRequest<Method>`
    Method(HttpMethod),
}

impl HandlerKind {
    pub fn parse(export_name: &str) -> Option<Self> {
        let captures = HANDLER_NAME.captures(export_name)?;
        match captures.get(1) {
            None => Some(HandlerKind::AnyMethod),
            Some(suffix) => HttpMethod::from_suffix(suffix.as_str()).map(HandlerKind::Method),
        }
    }

    pub fn method(&self) -> Option<HttpMethod> {
        match self {
            HandlerKind::AnyMethod => None,
            HandlerKind::Method(method) => Some(*method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_suffix_parses() {
        for method in HttpMethod::ALL {
            let suffix = format!("{}{}", &method.as_str()[..1], method.as_str()[1..].to_lowercase());
            let name = format!("onRequest{}", suffix);
            assert_eq!(HandlerKind::parse(&name), Some(HandlerKind::Method(method)));
        }
    }

    #[test]
    fn test_rejects_near_misses() {
        assert_eq!(HandlerKind::parse("onRequestAll"), None);
        assert_eq!(HandlerKind::parse("onRequestGetter"), None);
        assert_eq!(HandlerKind::parse("xonRequest"), None);
        assert_eq!(HandlerKind::parse(""), None);
    }

    #[test]
    fn test_method_from_str_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("OPTIONS".parse::<HttpMethod>(), Ok(HttpMethod::Options));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_matches_exact_token() {
        assert!(HttpMethod::Post.matches("POST"));
        assert!(!HttpMethod::Post.matches("GET"));
    }
}
