/// Bundler interface
///
/// The bundler packages the dispatcher template, the injected routes module
/// and every handler file into one deployable script. Only three features
/// are needed from it: entry-point injection, compile-time constants, and an
/// end-of-build report of error and warning counts.
use crate::error::BuildError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Build-time constants handed to the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConstants {
    /// Plugin name, used in the asset fallback URL
    pub name: Option<String>,
    /// Directory of static assets bundled with the plugin
    pub assets_directory: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Dispatcher template the bundle starts from
    pub entry_point: PathBuf,
    /// Rendered routes module, injected into the entry point
    pub routes_module: PathBuf,
    pub outfile: PathBuf,
    pub minify: bool,
    pub sourcemap: bool,
    pub plugin: PluginConstants,
}

/// Diagnostics counted at the end of a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub error_count: usize,
    pub warning_count: usize,
}

impl BuildReport {
    pub fn succeeded(&self) -> bool {
        self.error_count == 0
    }
}

#[async_trait]
pub trait Bundler: Send + Sync {
    /// Produces the bundle; diagnostics are reported, not returned as errors
    async fn bundle(&self, options: &BundleOptions) -> Result<BuildReport, BuildError>;

    /// Bundler name for logs
    fn name(&self) -> &'static str;
}

/// Logs the end-of-build summary; `on_end` runs only if there were no errors
///
/// # Examples
///
/// ```
/// use pages_build::{report_build, BuildReport};
///
/// let mut finished = false;
/// report_build(&BuildReport { error_count: 0, warning_count: 2 }, || finished = true);
/// assert!(finished);
///
/// let mut finished = false;
/// report_build(&BuildReport { error_count: 1, warning_count: 0 }, || finished = true);
/// assert!(!finished);
/// ```
pub fn report_build<F: FnOnce()>(report: &BuildReport, on_end: F) {
    if report.error_count > 0 {
        error!(
            "{} error(s) and {} warning(s) when compiling Worker.",
            report.error_count, report.warning_count
        );
    } else if report.warning_count > 0 {
        warn!(
            "{} warning(s) when compiling Worker.",
            report.warning_count
        );
        on_end();
    } else {
        info!("Compiled Worker successfully.");
        on_end();
    }
}

/// Runs the `esbuild` executable
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: String,
}

impl Default for EsbuildBundler {
    fn default() -> Self {
        Self::new("esbuild")
    }
}

impl EsbuildBundler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line arguments for one build
    pub fn args(&self, options: &BundleOptions) -> Vec<String> {
        let mut args = vec![
            options.entry_point.display().to_string(),
            "--bundle".to_string(),
            "--format=esm".to_string(),
            "--target=esnext".to_string(),
            "--allow-overwrite".to_string(),
            format!("--outfile={}", options.outfile.display()),
            format!("--inject:{}", options.routes_module.display()),
            format!(
                "--define:__PLUGIN_NAME__={}",
                define_value(options.plugin.name.as_deref())
            ),
            format!(
                "--define:__PLUGIN_ASSETS_DIRECTORY__={}",
                define_value(options.plugin.assets_directory.as_deref())
            ),
        ];

        if options.minify {
            args.push("--minify".to_string());
        }
        if options.sourcemap {
            args.push("--sourcemap".to_string());
        }

        args
    }
}

#[async_trait]
impl Bundler for EsbuildBundler {
    async fn bundle(&self, options: &BundleOptions) -> Result<BuildReport, BuildError> {
        let args = self.args(options);
        debug!("Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| BuildError::Bundler {
                program: self.program.clone(),
                source,
            })?;

        let diagnostics = String::from_utf8_lossy(&output.stderr);
        let mut report = count_diagnostics(&diagnostics);
        if !output.status.success() && report.error_count == 0 {
            // crashed without printing a diagnostic
            report.error_count = 1;
        }
        Ok(report)
    }

    fn name(&self) -> &'static str {
        "esbuild"
    }
}

/// Compile-time constant: a JSON string, or `undefined` when unset
fn define_value(value: Option<&str>) -> String {
    match value {
        Some(value) => serde_json::Value::String(value.to_string()).to_string(),
        None => "undefined".to_string(),
    }
}

/// Counts `[ERROR]` and `[WARNING]` lines in esbuild's log output
pub fn count_diagnostics(output: &str) -> BuildReport {
    output.lines().fold(BuildReport::default(), |mut report, line| {
        if line.contains("[ERROR]") {
            report.error_count += 1;
        } else if line.contains("[WARNING]") {
            report.warning_count += 1;
        }
        report
    })
}
