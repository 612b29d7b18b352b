/// Matching request paths against compiled route paths
///
/// Two modes are needed at dispatch time:
/// - **exact**: every request segment must be consumed (terminal modules)
/// - **prefix**: trailing request segments may remain (middlewares)
use crate::path::segments;
use crate::route::pattern::{classify_segment, PatternSegment, SegmentPart};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Value captured by a parameter segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `:name` captures a single segment
    One(String),
    /// `:name*` captures every segment it spans
    Many(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::One(value) => Some(value),
            ParamValue::Many(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            ParamValue::One(value) => std::slice::from_ref(value),
            ParamValue::Many(values) => values,
        }
    }
}

/// Parameters extracted by a match, by name
pub type Params = HashMap<String, ParamValue>;

/// Result of matching a path against a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Extracted, percent-decoded parameters
    pub params: Params,
    /// The portion of the request path the pattern consumed (`""` for the root)
    pub path: String,
}

/// A compiled route path
///
/// # Examples
///
/// ```
/// use pages_router::{ParamValue, RoutePattern};
///
/// let pattern = RoutePattern::new("/docs/:section/:rest*");
///
/// let m = pattern.match_exact("/docs/guide/a/b").unwrap();
/// assert_eq!(m.params["section"], ParamValue::One("guide".into()));
/// assert_eq!(m.params["rest"], ParamValue::Many(vec!["a".into(), "b".into()]));
///
/// assert!(pattern.match_exact("/docs/guide").is_none());
///
/// let admin = RoutePattern::new("/admin");
/// assert_eq!(admin.match_prefix("/admin/users").unwrap().path, "/admin");
/// assert!(admin.match_exact("/admin/users").is_none());
///
/// let post = RoutePattern::new("/post-:id");
/// assert_eq!(post.match_exact("/post-7").unwrap().params["id"], ParamValue::One("7".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<PatternSegment>,
    compiled: Vec<SegmentMatcher>,
    case_insensitive: bool,
}

/// A segment ready for matching against one request segment
#[derive(Debug, Clone)]
enum SegmentMatcher {
    CatchAll(String),
    Param(String),
    Static(String),
    /// Anchored regex with one group per parameter, in order;
    /// the flag marks catch-alls
    Compound { regex: Regex, names: Vec<(String, bool)> },
}

impl SegmentMatcher {
    fn compile(segment: &PatternSegment, case_insensitive: bool) -> Self {
        match segment {
            PatternSegment::CatchAll(name) => SegmentMatcher::CatchAll(name.clone()),
            PatternSegment::Param(name) => SegmentMatcher::Param(name.clone()),
            PatternSegment::Static(literal) => SegmentMatcher::Static(literal.clone()),
            PatternSegment::Compound(parts) => {
                let mut source = String::from(if case_insensitive { "(?i)^" } else { "^" });
                let mut names = Vec::new();
                let mut raw = String::new();
                for part in parts {
                    match part {
                        SegmentPart::Literal(literal) => {
                            source.push_str(&regex::escape(literal));
                            raw.push_str(literal);
                        }
                        SegmentPart::Param(name) | SegmentPart::CatchAll(name) => {
                            source.push_str("(.+?)");
                            names.push((name.clone(), matches!(part, SegmentPart::CatchAll(_))));
                            raw.push(':');
                            raw.push_str(name);
                        }
                    }
                }
                source.push('$');

                // escaped literals and fixed groups always compile
                match Regex::new(&source) {
                    Ok(regex) => SegmentMatcher::Compound { regex, names },
                    Err(_) => SegmentMatcher::Static(raw),
                }
            }
        }
    }
}

impl RoutePattern {
    /// Compiles a route path; literal segments compare case-insensitively
    pub fn new(route_path: &str) -> Self {
        let segments: Vec<PatternSegment> = segments(route_path).map(classify_segment).collect();
        Self {
            source: route_path.to_string(),
            compiled: compile(&segments, true),
            segments,
            case_insensitive: true,
        }
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        if self.case_insensitive != case_insensitive {
            self.compiled = compile(&self.segments, case_insensitive);
            self.case_insensitive = case_insensitive;
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Matches only if the whole path is consumed
    pub fn match_exact(&self, path: &str) -> Option<MatchResult> {
        self.match_path(path, true)
    }

    /// Matches if the pattern consumes a leading run of whole segments
    pub fn match_prefix(&self, path: &str) -> Option<MatchResult> {
        self.match_path(path, false)
    }

    fn match_path(&self, path: &str, end: bool) -> Option<MatchResult> {
        let path_segments: Vec<&str> = segments(path).collect();

        let mut search = Search {
            pattern: &self.compiled,
            path: &path_segments,
            end,
            case_insensitive: self.case_insensitive,
            params: Params::new(),
            dead: HashSet::new(),
        };
        let consumed = search.run(0, 0)?;
        let params = search.params;

        let path = if consumed == 0 {
            String::new()
        } else {
            format!("/{}", path_segments[..consumed].join("/"))
        };

        Some(MatchResult { params, path })
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.case_insensitive == other.case_insensitive
    }
}

impl Eq for RoutePattern {}

fn compile(segments: &[PatternSegment], case_insensitive: bool) -> Vec<SegmentMatcher> {
    segments
        .iter()
        .map(|segment| SegmentMatcher::compile(segment, case_insensitive))
        .collect()
}

/// Backtracking matcher over pattern and path segments
///
/// Catch-alls are greedy and give segments back when later pattern segments
/// need them. A `(pattern index, consumed)` state that failed once fails
/// again, so failures are remembered and the search stays polynomial no
/// matter how many catch-alls a pattern holds. Parameters are recorded only
/// while unwinding a successful match.
struct Search<'a> {
    pattern: &'a [SegmentMatcher],
    path: &'a [&'a str],
    end: bool,
    case_insensitive: bool,
    params: Params,
    dead: HashSet<(usize, usize)>,
}

impl<'a> Search<'a> {
    /// Returns the number of path segments consumed by a successful match
    fn run(&mut self, index: usize, consumed: usize) -> Option<usize> {
        if self.dead.contains(&(index, consumed)) {
            return None;
        }
        let result = self.step(index, consumed);
        if result.is_none() {
            self.dead.insert((index, consumed));
        }
        result
    }

    fn step(&mut self, index: usize, consumed: usize) -> Option<usize> {
        let pattern = self.pattern;
        let path = self.path;

        let Some(segment) = pattern.get(index) else {
            return if self.end && consumed < path.len() {
                None
            } else {
                Some(consumed)
            };
        };

        let remaining = &path[consumed..];

        match segment {
            SegmentMatcher::CatchAll(name) => {
                for take in (1..=remaining.len()).rev() {
                    if let Some(done) = self.run(index + 1, consumed + take) {
                        let values = remaining[..take].iter().map(|s| decode(s)).collect();
                        self.params.insert(name.clone(), ParamValue::Many(values));
                        return Some(done);
                    }
                }
                None
            }
            SegmentMatcher::Param(name) => {
                let value = remaining.first()?;
                let done = self.run(index + 1, consumed + 1)?;
                self.params.insert(name.clone(), ParamValue::One(decode(value)));
                Some(done)
            }
            SegmentMatcher::Static(literal) => {
                let value = remaining.first()?;
                let matches = if self.case_insensitive {
                    literal.eq_ignore_ascii_case(value)
                } else {
                    literal == value
                };

                if !matches {
                    return None;
                }
                self.run(index + 1, consumed + 1)
            }
            SegmentMatcher::Compound { regex, names } => {
                let value = remaining.first()?;
                let captures = regex.captures(value)?;
                let done = self.run(index + 1, consumed + 1)?;
                for (group, (name, many)) in names.iter().enumerate() {
                    let Some(capture) = captures.get(group + 1) else {
                        continue;
                    };
                    let value = decode(capture.as_str());
                    let value = if *many {
                        ParamValue::Many(vec![value])
                    } else {
                        ParamValue::One(value)
                    };
                    self.params.insert(name.clone(), value);
                }
                Some(done)
            }
        }
    }
}

/// Percent-decodes a captured segment, keeping it raw if it is not valid UTF-8
fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .unwrap_or(Cow::Borrowed(segment))
        .into_owned()
}
