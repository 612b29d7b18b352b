use anyhow::{Context, Result};
use pages_build::PluginConstants;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pages.toml";

/// Project configuration, loaded from `pages.toml`
///
/// Every field has a default, so the file and each of its sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PagesConfig {
    #[serde(default)]
    pub functions: FunctionsConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub plugin: PluginConstants,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionsConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// External transpiler, e.g. `["sucrase", "--transforms", "typescript"]`
    #[serde(default)]
    pub transpile_command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
    #[serde(default = "default_routes_json")]
    pub routes_json: String,
    #[serde(default = "default_routes_module")]
    pub routes_module: String,
    #[serde(default = "default_outfile")]
    pub outfile: String,
    #[serde(default)]
    pub minify: bool,
    #[serde(default)]
    pub sourcemap: bool,
    /// Bundler executable
    #[serde(default = "default_bundler")]
    pub bundler: String,
    /// Dispatcher template to bundle; without it only the route artifacts are written
    #[serde(default)]
    pub entry_point: Option<PathBuf>,
}

fn default_directory() -> PathBuf {
    "functions".into()
}
fn default_base_url() -> String {
    "/".into()
}
fn default_outdir() -> PathBuf {
    ".pages".into()
}
fn default_routes_json() -> String {
    "routes.json".into()
}
fn default_routes_module() -> String {
    "routes.mjs".into()
}
fn default_outfile() -> String {
    "_worker.js".into()
}
fn default_bundler() -> String {
    "esbuild".into()
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            base_url: default_base_url(),
            transpile_command: Vec::new(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            outdir: default_outdir(),
            routes_json: default_routes_json(),
            routes_module: default_routes_module(),
            outfile: default_outfile(),
            minify: false,
            sourcemap: false,
            bundler: default_bundler(),
            entry_point: None,
        }
    }
}

impl PagesConfig {
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from a specific path.
    /// Returns default config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}
