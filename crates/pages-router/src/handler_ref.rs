/// Reference to an exported handler: `relativeFilePath:exportName`
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points at "file + exported symbol"; only resolved to a callable after bundling
///
/// # Examples
///
/// ```
/// use pages_router::HandlerRef;
///
/// let reference: HandlerRef = "api/[id].ts:onRequestGet".parse().unwrap();
/// assert_eq!(reference.file, "api/[id].ts");
/// assert_eq!(reference.export, "onRequestGet");
/// assert_eq!(reference.to_string(), "api/[id].ts:onRequestGet");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HandlerRef {
    /// File path relative to the functions directory, with extension
    pub file: String,
    /// Exported symbol name
    pub export: String,
}

impl HandlerRef {
    pub fn new(file: impl Into<String>, export: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            export: export.into(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.export)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid handler reference `{0}`: expected `file:export`")]
pub struct HandlerRefError(pub String);

impl FromStr for HandlerRef {
    type Err = HandlerRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Export names never contain ':', file paths might
        match s.rsplit_once(':') {
            Some((file, export)) if !file.is_empty() && !export.is_empty() => {
                Ok(HandlerRef::new(file, export))
            }
            _ => Err(HandlerRefError(s.to_string())),
        }
    }
}

impl TryFrom<String> for HandlerRef {
    type Error = HandlerRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HandlerRef> for String {
    fn from(value: HandlerRef) -> Self {
        value.to_string()
    }
}
