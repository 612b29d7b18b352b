/// Route module for file-convention routing
///
/// - `pattern`: bracket rewriting and route-path segment classification
/// - `parser`: file location → route path, role and entry

pub mod parser;
pub mod pattern;

// Re-export commonly used types
pub use parser::{route_path_for_file, synthesize, FileRole};
pub use pattern::{classify_segment, rewrite_brackets, PatternSegment, SegmentPart};
