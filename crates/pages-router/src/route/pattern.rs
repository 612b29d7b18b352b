/// Pattern syntax for route paths
///
/// File paths spell parameters with brackets (`[id]`, `[[slug]]`); route
/// paths spell them with a colon (`:id`, `:slug*`). This module converts the
/// former into the latter and classifies the resulting segments.
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

// [[name]] → :name*
static CATCH_ALL_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^/\[\]]+)\]\]").expect("catch-all pattern is valid"));

// [name] → :name
static PARAM_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^/\[\]]+)\]").expect("param pattern is valid"));

// :name or :name*, where a name is a run of ASCII word characters
static PARAM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z0-9_]+)(\*)?").expect("param token pattern is valid"));

/// One segment of a compiled route path
///
/// # Examples
///
/// ```
/// use pages_router::route::pattern::{classify_segment, PatternSegment};
///
/// assert!(matches!(classify_segment("about"), PatternSegment::Static(_)));
/// assert!(matches!(classify_segment(":id"), PatternSegment::Param(_)));
/// assert!(matches!(classify_segment(":slug*"), PatternSegment::CatchAll(_)));
/// assert!(matches!(classify_segment("post-:id"), PatternSegment::Compound(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Catch-all segment: `:slug*`, consumes one or more path segments
    CatchAll(String),
    /// Named parameter: `:id`, consumes exactly one path segment
    Param(String),
    /// Literal text
    Static(String),
    /// Literal text mixed with parameters inside one segment, like `post-:id`
    /// or `:id.json`; consumes exactly one path segment
    Compound(Vec<SegmentPart>),
}

/// Piece of a [`PatternSegment::Compound`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentPart {
    Literal(String),
    Param(String),
    /// `:name*` inside a segment; captures like a parameter, as a one-element list
    CatchAll(String),
}

impl PatternSegment {
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, PatternSegment::Static(_))
    }

    /// Whether the segment holds a catch-all anywhere
    pub fn is_wildcard(&self) -> bool {
        match self {
            PatternSegment::CatchAll(_) => true,
            PatternSegment::Compound(parts) => parts
                .iter()
                .any(|part| matches!(part, SegmentPart::CatchAll(_))),
            PatternSegment::Param(_) | PatternSegment::Static(_) => false,
        }
    }
}

/// Classifies one segment of a route path (pure function)
///
/// A parameter is `:` followed by one or more ASCII word characters, with
/// an optional trailing `*`; everything around it is literal text. A `:`
/// not followed by a word character stays literal.
pub fn classify_segment(segment: &str) -> PatternSegment {
    let mut parts = Vec::new();
    let mut literal_start = 0;

    for token in PARAM_TOKEN.captures_iter(segment) {
        let (Some(whole), Some(name)) = (token.get(0), token.get(1)) else {
            continue;
        };
        if whole.start() > literal_start {
            parts.push(SegmentPart::Literal(segment[literal_start..whole.start()].to_string()));
        }
        let name = name.as_str().to_string();
        parts.push(if token.get(2).is_some() {
            SegmentPart::CatchAll(name)
        } else {
            SegmentPart::Param(name)
        });
        literal_start = whole.end();
    }
    if literal_start < segment.len() {
        parts.push(SegmentPart::Literal(segment[literal_start..].to_string()));
    }

    if parts.len() > 1 {
        return PatternSegment::Compound(parts);
    }
    match parts.pop() {
        None => PatternSegment::Static(String::new()),
        Some(SegmentPart::Literal(literal)) => PatternSegment::Static(literal),
        Some(SegmentPart::Param(name)) => PatternSegment::Param(name),
        Some(SegmentPart::CatchAll(name)) => PatternSegment::CatchAll(name),
    }
}

/// Rewrites bracket segments of a file-derived path into route syntax
///
/// Two passes over the whole path, catch-all first, so the plain-bracket
/// pass never sees the inner brackets of `[[name]]`. Unbalanced brackets are
/// left as literal text.
///
/// # Examples
///
/// ```
/// use pages_router::rewrite_brackets;
///
/// assert_eq!(rewrite_brackets("/posts/[[slug]]/[id]"), "/posts/:slug*/:id");
/// assert_eq!(rewrite_brackets("/users/[id]"), "/users/:id");
/// assert_eq!(rewrite_brackets("/about"), "/about");
/// ```
pub fn rewrite_brackets(path: &str) -> Cow<'_, str> {
    if !path.contains('[') {
        return Cow::Borrowed(path);
    }

    let catch_all = CATCH_ALL_BRACKETS.replace_all(path, ":${1}*");
    let rewritten = PARAM_BRACKETS.replace_all(&catch_all, ":${1}").into_owned();
    Cow::Owned(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        assert_eq!(
            classify_segment("about"),
            PatternSegment::Static("about".to_string())
        );
    }

    #[test]
    fn test_classify_param() {
        assert_eq!(
            classify_segment(":id"),
            PatternSegment::Param("id".to_string())
        );
    }

    #[test]
    fn test_classify_catch_all() {
        assert_eq!(
            classify_segment(":slug*"),
            PatternSegment::CatchAll("slug".to_string())
        );
    }

    #[test]
    fn test_classify_degenerate_markers_stay_static() {
        assert_eq!(classify_segment(":"), PatternSegment::Static(":".to_string()));
        assert_eq!(
            classify_segment(":*"),
            PatternSegment::Static(":*".to_string())
        );
        assert_eq!(
            classify_segment("v1:"),
            PatternSegment::Static("v1:".to_string())
        );
    }

    #[test]
    fn test_classify_compound() {
        assert_eq!(
            classify_segment("post-:id"),
            PatternSegment::Compound(vec![
                SegmentPart::Literal("post-".to_string()),
                SegmentPart::Param("id".to_string()),
            ])
        );
        assert_eq!(
            classify_segment(":id.json"),
            PatternSegment::Compound(vec![
                SegmentPart::Param("id".to_string()),
                SegmentPart::Literal(".json".to_string()),
            ])
        );
        assert_eq!(
            classify_segment(":from-:to"),
            PatternSegment::Compound(vec![
                SegmentPart::Param("from".to_string()),
                SegmentPart::Literal("-".to_string()),
                SegmentPart::Param("to".to_string()),
            ])
        );
    }

    #[test]
    fn test_precedence_kinds_follow_classification() {
        assert!(classify_segment("post-:id").is_dynamic());
        assert!(!classify_segment("post-:id").is_wildcard());
        assert!(classify_segment("v-:rest*").is_wildcard());
        assert!(!classify_segment("v1:").is_dynamic());
        assert!(!classify_segment("about").is_dynamic());
    }

    #[test]
    fn test_rewrite_several_catch_alls() {
        assert_eq!(rewrite_brackets("/[[a]]/[[b]]"), "/:a*/:b*");
    }

    #[test]
    fn test_rewrite_unbalanced_is_literal() {
        assert_eq!(rewrite_brackets("/[id/x"), "/[id/x");
        assert_eq!(rewrite_brackets("/id]"), "/id]");
    }

    #[test]
    fn test_rewrite_inside_segment() {
        assert_eq!(rewrite_brackets("/post-[id]"), "/post-:id");
        assert_eq!(rewrite_brackets("/users/[id].json"), "/users/:id.json");
    }

    #[test]
    fn test_rewrite_borrows_without_brackets() {
        assert!(matches!(rewrite_brackets("/plain"), Cow::Borrowed("/plain")));
    }
}
