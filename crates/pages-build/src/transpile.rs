/// Source normalization ahead of export analysis
///
/// The analyzer only needs *a* grammar that accepts the file. By default the
/// bundled grammars already cover every supported dialect, so normalization
/// is a passthrough. Projects that rely on syntax the grammars do not know
/// can route sources through an external program instead.
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Syntax family of a source file, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Extensions recognized as handler sources
    pub const EXTENSIONS: [&'static str; 5] = ["js", "mjs", "jsx", "ts", "tsx"];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "js" | "mjs" => Some(Dialect::JavaScript),
            "jsx" => Some(Dialect::Jsx),
            "ts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }

    /// # Examples
    ///
    /// ```
    /// use pages_build::Dialect;
    /// use std::path::Path;
    ///
    /// assert_eq!(Dialect::from_path(Path::new("api/[id].ts")), Some(Dialect::TypeScript));
    /// assert_eq!(Dialect::from_path(Path::new("README.md")), None);
    /// assert_eq!(Dialect::from_path(Path::new("Makefile")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::JavaScript => "js",
            Dialect::Jsx => "jsx",
            Dialect::TypeScript => "ts",
            Dialect::Tsx => "tsx",
        }
    }
}

/// Output of a transpiler: code plus the dialect it is now written in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub code: String,
    pub dialect: Dialect,
}

#[derive(Debug, thiserror::Error)]
pub enum TranspileError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`{program}` produced output that is not UTF-8")]
    InvalidOutput { program: String },
}

/// Rewrites a source file into a dialect the analyzer can parse
///
/// Implementations must be deterministic and must fail on invalid input
/// rather than passing it through.
pub trait Transpiler: Send + Sync {
    fn normalize(&self, source: &str, dialect: Dialect) -> Result<Normalized, TranspileError>;
}

/// Passthrough: the bundled grammars parse every supported dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeGrammar;

impl Transpiler for NativeGrammar {
    fn normalize(&self, source: &str, dialect: Dialect) -> Result<Normalized, TranspileError> {
        Ok(Normalized {
            code: source.to_string(),
            dialect,
        })
    }
}

/// Pipes each source through an external program that emits plain JavaScript
///
/// The program receives the source on stdin and the dialect name
/// (`js`, `jsx`, `ts`, `tsx`) as its last argument.
///
/// ```toml
/// [functions]
/// transpile_command = ["node", "scripts/strip-types.mjs"]
/// ```
#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    program: String,
    args: Vec<String>,
}

impl CommandTranspiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builds a transpiler from `[program, args..]`; `None` for an empty command
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    fn spawn_error(&self, source: std::io::Error) -> TranspileError {
        TranspileError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl Transpiler for CommandTranspiler {
    fn normalize(&self, source: &str, dialect: Dialect) -> Result<Normalized, TranspileError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(dialect.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // The child fills its stdout pipe while still reading input, so stdin
        // is fed from a separate thread while this one drains the output
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|e| self.spawn_error(e))?;
        if !output.status.success() {
            return Err(TranspileError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // a program that exits early closes its stdin; only report that once it succeeded
        written.map_err(|e| self.spawn_error(e))?;

        let code = String::from_utf8(output.stdout).map_err(|_| TranspileError::InvalidOutput {
            program: self.program.clone(),
        })?;

        Ok(Normalized {
            code,
            dialect: Dialect::JavaScript,
        })
    }
}
