mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pages")]
#[command(version, about = "Pages Functions CLI - file-convention routing for edge functions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the route table, routes module and worker bundle
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for routes.json, routes.mjs and the bundle
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Minify the bundle
        #[arg(long)]
        minify: bool,

        /// Emit a source map next to the bundle
        #[arg(long)]
        sourcemap: bool,

        /// Rebuild whenever a file under the functions directory changes
        #[arg(short, long)]
        watch: bool,

        /// Plugin name, used in asset fallback URLs
        #[arg(long)]
        plugin_name: Option<String>,

        /// Directory of static assets shipped with the plugin
        #[arg(long)]
        plugin_assets_directory: Option<String>,
    },

    /// Print the ordered route table
    Routes {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the table as JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by every command that scans a functions directory
#[derive(Args)]
struct SourceArgs {
    /// Functions directory to scan
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// URL prefix every route path is placed under
    #[arg(short, long)]
    base_url: Option<String>,

    /// Project configuration file
    #[arg(short, long, default_value = config::CONFIG_FILE)]
    config: PathBuf,
}

impl SourceArgs {
    /// Loads the configuration file and applies the shared flag overrides
    fn load(&self) -> Result<config::PagesConfig> {
        let mut config = config::PagesConfig::load(&self.config)?;
        if let Some(directory) = &self.directory {
            config.functions.directory = directory.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.functions.base_url = base_url.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Build {
            source,
            outdir,
            minify,
            sourcemap,
            watch,
            plugin_name,
            plugin_assets_directory,
        } => {
            let mut config = source.load()?;
            if let Some(outdir) = outdir {
                config.build.outdir = outdir;
            }
            config.build.minify |= minify;
            config.build.sourcemap |= sourcemap;
            if plugin_name.is_some() {
                config.plugin.name = plugin_name;
            }
            if plugin_assets_directory.is_some() {
                config.plugin.assets_directory = plugin_assets_directory;
            }

            if watch {
                commands::watch::execute(&config).await?;
            } else {
                commands::build::execute(&config).await?;
            }
        }
        Commands::Routes { source, json } => {
            commands::routes::execute(&source.load()?, json).await?;
        }
    }

    Ok(())
}
