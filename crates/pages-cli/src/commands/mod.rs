pub mod build;
pub mod routes;
pub mod watch;

use crate::config::PagesConfig;
use pages_build::{CommandTranspiler, RouteGenerator};

/// Route generator for the configured functions directory and transpiler
pub fn generator(config: &PagesConfig) -> RouteGenerator {
    let generator = RouteGenerator::new(&config.functions.directory)
        .base_url(config.functions.base_url.as_str());

    match CommandTranspiler::from_command_line(&config.functions.transpile_command) {
        Some(transpiler) => generator.transpiler(transpiler),
        None => generator,
    }
}
