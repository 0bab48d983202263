//! Terminal output helpers shared by the subcommands.

mod diagnostic;
mod table;

pub use diagnostic::LexiconDiagnostic;
pub use table::{format_coverage_table, LocaleCoverage};

use std::fs;
use std::path::Path;

use lexicon::{Catalog, CatalogError};
use miette::{miette, IntoDiagnostic, Result, WrapErr};

/// Read and parse a JSON catalog, turning JSON errors into source-annotated
/// diagnostics.
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    parse_catalog(path, &content)
}

/// Read a catalog file, or merge every `*.json` fragment of a directory in
/// file-name order.
pub fn read_catalog_or_dir(path: &Path) -> Result<Catalog> {
    if !path.is_dir() {
        return read_catalog(path);
    }
    let mut fragments = Vec::new();
    for entry in fs::read_dir(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?
    {
        let fragment = entry.into_diagnostic()?.path();
        if fragment.is_file() && fragment.extension().is_some_and(|extension| extension == "json") {
            fragments.push(fragment);
        }
    }
    fragments.sort();

    let mut catalog = Catalog::new();
    for fragment in &fragments {
        catalog
            .merge(read_catalog(fragment)?)
            .map_err(|error| miette!("{}: {error}", fragment.display()))?;
    }
    Ok(catalog)
}

/// Parse catalog content that was read from `path`.
pub fn parse_catalog(path: &Path, content: &str) -> Result<Catalog> {
    match Catalog::from_json_str(content) {
        Ok(catalog) => Ok(catalog),
        Err(CatalogError::Json(error)) => {
            Err(LexiconDiagnostic::from_json_error(path, content, &error).into())
        }
        Err(error) => Err(miette!("{}: {error}", path.display())),
    }
}
