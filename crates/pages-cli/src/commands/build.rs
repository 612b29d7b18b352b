use super::generator;
use crate::config::PagesConfig;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use pages_build::{report_build, write_route_artifacts, BuildReport, BundleOptions, Bundler, EsbuildBundler};
use tracing::warn;

pub async fn execute(config: &PagesConfig) -> Result<()> {
    println!("{}", "Building functions...".green().bold());
    println!();

    match build(config).await? {
        Some(report) if !report.succeeded() => bail!("bundling failed"),
        _ => Ok(()),
    }
}

/// One full build: route table, artifacts, then the bundle if an entry point is set
///
/// Returns the bundler's report, or `None` when bundling was skipped.
pub async fn build(config: &PagesConfig) -> Result<Option<BuildReport>> {
    let directory = &config.functions.directory;

    let table = generator(config)
        .generate()
        .await
        .with_context(|| format!("failed to build routes from {}", directory.display()))?;

    let artifacts = write_route_artifacts(
        &table,
        directory,
        &config.build.outdir,
        &config.build.routes_json,
        &config.build.routes_module,
    )?;
    println!(
        "  {} {} route(s) from {}",
        "✓".green(),
        table.len(),
        directory.display().to_string().cyan()
    );
    println!("  {} {}", "✓".green(), artifacts.routes_json.display());
    println!("  {} {}", "✓".green(), artifacts.routes_module.display());

    let Some(entry_point) = &config.build.entry_point else {
        warn!("No entry_point configured in [build]; skipping the bundle step");
        return Ok(None);
    };

    let options = BundleOptions {
        entry_point: entry_point.clone(),
        routes_module: artifacts.routes_module,
        outfile: config.build.outdir.join(&config.build.outfile),
        minify: config.build.minify,
        sourcemap: config.build.sourcemap,
        plugin: config.plugin.clone(),
    };

    let bundler = EsbuildBundler::new(config.build.bundler.as_str());
    println!("{} Bundling with {}...", "⚙".cyan(), bundler.name());

    let report = bundler.bundle(&options).await?;
    report_build(&report, || {
        println!("  {} {}", "✓".green(), options.outfile.display());
    });

    Ok(Some(report))
}
