/// Writing the build outputs to disk
use crate::error::BuildError;
use crate::routes_module::render_routes_module;
use pages_router::RouteTable;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the route table artifacts were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteArtifacts {
    /// Serialized route table (`file:export` references)
    pub routes_json: PathBuf,
    /// ES module with handler imports, for the bundler
    pub routes_module: PathBuf,
}

/// Writes `routes_json` and `routes_module` into `outdir`
///
/// Imports in the routes module use the absolute path of `functions_dir`, so
/// the module can live anywhere.
pub fn write_route_artifacts(
    table: &RouteTable,
    functions_dir: &Path,
    outdir: &Path,
    routes_json: &str,
    routes_module: &str,
) -> Result<RouteArtifacts, BuildError> {
    fs::create_dir_all(outdir).map_err(|source| BuildError::Write {
        path: outdir.to_path_buf(),
        source,
    })?;

    let functions_dir = fs::canonicalize(functions_dir).map_err(|source| BuildError::Read {
        path: functions_dir.to_path_buf(),
        source,
    })?;

    let artifacts = RouteArtifacts {
        routes_json: outdir.join(routes_json),
        routes_module: outdir.join(routes_module),
    };

    let json = serde_json::to_string_pretty(table)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        .map_err(|source| BuildError::Write {
            path: artifacts.routes_json.clone(),
            source,
        })?;
    write(&artifacts.routes_json, &json)?;
    write(
        &artifacts.routes_module,
        &render_routes_module(table, &functions_dir),
    )?;

    info!(
        "Wrote {} and {}",
        artifacts.routes_json.display(),
        artifacts.routes_module.display()
    );
    Ok(artifacts)
}

fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}
