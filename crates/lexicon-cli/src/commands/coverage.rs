//! Coverage command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use lexicon::interpreter::missing_keys;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::output::{format_coverage_table, read_catalog_or_dir, LocaleCoverage};

/// Arguments for the coverage command.
#[derive(Debug, Args)]
pub struct CoverageArgs {
    /// Default-locale catalog file or fragment directory (e.g., locales/en.json or locales/en).
    #[arg(long)]
    pub source: PathBuf,

    /// Locales to check coverage for (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub lang: Vec<String>,

    /// Directory containing `<locale>.json` catalogs or `<locale>/` fragment
    /// directories. Defaults to the source's parent directory.
    #[arg(long)]
    pub translations: Option<PathBuf>,

    /// Exit with non-zero code if any translation is incomplete.
    #[arg(long)]
    pub strict: bool,

    /// Output results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for coverage data.
#[derive(Debug, Serialize)]
struct CoverageJson {
    locale: String,
    translated: usize,
    total: usize,
    missing: Vec<String>,
}

/// Run the coverage command.
pub fn run_coverage(args: CoverageArgs) -> Result<i32> {
    let source = read_catalog_or_dir(&args.source)?;
    let total = source.len();

    let base_dir = args
        .translations
        .clone()
        .or_else(|| args.source.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let mut coverage_data = Vec::new();
    for lang in &args.lang {
        let fragment_dir = base_dir.join(lang);
        let catalog_path = if fragment_dir.is_dir() {
            fragment_dir
        } else {
            base_dir.join(format!("{lang}.json"))
        };
        let missing = if catalog_path.exists() {
            let catalog = read_catalog_or_dir(&catalog_path)?;
            missing_keys(&source, &catalog)
        } else {
            tracing::debug!(path = %catalog_path.display(), "no catalog for locale");
            source.keys()
        };

        coverage_data.push(LocaleCoverage {
            locale: lang.clone(),
            translated: total - missing.len(),
            missing,
        });
    }

    let any_incomplete = coverage_data.iter().any(|c| !c.missing.is_empty());

    if args.json {
        let json_data: Vec<CoverageJson> = coverage_data
            .iter()
            .map(|c| CoverageJson {
                locale: c.locale.clone(),
                translated: c.translated,
                total,
                missing: c.missing.clone(),
            })
            .collect();

        let json_output = serde_json::to_string_pretty(&json_data).into_diagnostic()?;
        println!("{json_output}");
    } else {
        println!("{}", format_coverage_table(total, &coverage_data));

        for locale_coverage in &coverage_data {
            if !locale_coverage.missing.is_empty() {
                println!("\nMissing in {}:", locale_coverage.locale);
                for key_path in &locale_coverage.missing {
                    println!("  - {key_path}");
                }
            }
        }
    }

    if args.strict && any_incomplete {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
