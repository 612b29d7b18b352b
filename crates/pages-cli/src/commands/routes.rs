use super::generator;
use crate::config::PagesConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use pages_router::{HandlerRef, RouteTable};

pub async fn execute(config: &PagesConfig, json: bool) -> Result<()> {
    let directory = &config.functions.directory;
    let table = generator(config)
        .generate()
        .await
        .with_context(|| format!("failed to build routes from {}", directory.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print_table(&table);
    }

    Ok(())
}

fn print_table(table: &RouteTable) {
    if table.is_empty() {
        println!("{}", "No routes found".yellow());
        return;
    }

    let width = table
        .iter()
        .map(|entry| entry.route_path.len())
        .max()
        .unwrap_or_default();

    for entry in table.iter() {
        let method = entry.method.map(|method| method.as_str()).unwrap_or("*");
        println!(
            "{}  {}  {}",
            format!("{:<width$}", entry.route_path).cyan(),
            format!("{:<7}", method).bold(),
            describe(&entry.middlewares, &entry.modules)
        );
    }
}

fn describe(middlewares: &[HandlerRef], modules: &[HandlerRef]) -> String {
    let mut parts: Vec<String> = middlewares
        .iter()
        .map(|reference| format!("{} {}", "middleware".dimmed(), reference))
        .collect();
    parts.extend(modules.iter().map(HandlerRef::to_string));
    parts.join(", ")
}
