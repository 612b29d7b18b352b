use super::build::build;
use crate::config::PagesConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Changes arriving within this window are folded into one rebuild
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Builds once, then rebuilds on every change under the functions directory until Ctrl-C
pub async fn execute(config: &PagesConfig) -> Result<()> {
    let directory = &config.functions.directory;
    println!("{}", "Building functions in watch mode...".green().bold());
    println!();

    rebuild(config).await;

    let root = std::fs::canonicalize(directory).unwrap_or_else(|_| directory.clone());
    let (tx, mut rx) = mpsc::channel(100);
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                for path in event.paths {
                    if is_hidden(path.strip_prefix(&root).unwrap_or(&path)) {
                        continue;
                    }
                    let _ = tx.blocking_send(path);
                }
            }
        }
    })?;
    watcher
        .watch(directory, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", directory.display()))?;
    println!("  {} Watching: {}", "👀".cyan(), directory.display());

    loop {
        tokio::select! {
            changed = rx.recv() => {
                let Some(path) = changed else { break };
                tokio::time::sleep(DEBOUNCE).await;
                let mut batched = 1;
                while rx.try_recv().is_ok() {
                    batched += 1;
                }
                debug!("{} change(s) since last build", batched);

                println!();
                println!("{} File changed: {}", "🔄".yellow(), path.display());
                rebuild(config).await;
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Stopped watching".yellow());
                break;
            }
        }
    }

    Ok(())
}

/// Runs a build, printing failures instead of returning them
async fn rebuild(config: &PagesConfig) {
    match build(config).await {
        Ok(Some(report)) if !report.succeeded() => {
            eprintln!("{} Bundling failed, waiting for changes", "❌".red());
        }
        Ok(_) => println!("{} Build complete", "✓".green()),
        Err(e) => eprintln!("{} Build failed: {:#}", "❌".red(), e),
    }
}

/// Editor swap files and dot-directories, relative to the watched root
fn is_hidden(path: &Path) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .map_or(false, |name| name.starts_with('.') && name.len() > 1 && name != "..")
    })
}
