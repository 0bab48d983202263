//! Implementation of the `lexicon check` command.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use lexicon::interpreter::validate_catalog;
use lexicon::{parse_template, Catalog, CatalogError, CatalogWarning, LocaleId};
use miette::{miette, IntoDiagnostic, Report, Result, WrapErr};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::output::{read_catalog_or_dir, LexiconDiagnostic};

/// Arguments for the check command.
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Catalog files to check (.json)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Default-locale catalog to check keys and arguments against. The
    /// locale of each checked file is taken from its file name.
    #[arg(long)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Severity {
    Error,
    Warning,
}

/// One problem, as emitted by `--json`.
#[derive(Debug, Serialize)]
struct Finding {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    severity: Severity,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

/// Findings for every checked file, plus the rendered reports for terminal output.
#[derive(Default)]
struct CheckReport {
    findings: Vec<Finding>,
    reports: Vec<Report>,
    templates: usize,
}

impl CheckReport {
    fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Error).count()
    }

    fn check_file(&mut self, path: &Path, source: Option<&Catalog>) -> Result<()> {
        let file = path.display().to_string();
        let content = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {file}"))?;

        let catalog = match Catalog::from_json_str(&content) {
            Ok(catalog) => catalog,
            Err(CatalogError::Json(error)) => {
                self.findings.push(Finding {
                    file,
                    key: None,
                    severity: Severity::Error,
                    message: error.to_string(),
                    line: Some(error.line()),
                    column: Some(error.column()),
                });
                self.reports
                    .push(LexiconDiagnostic::from_json_error(path, &content, &error).into());
                return Ok(());
            }
            Err(error) => {
                self.findings.push(Finding {
                    file: file.clone(),
                    key: None,
                    severity: Severity::Error,
                    message: error.to_string(),
                    line: None,
                    column: None,
                });
                self.reports.push(miette!("{file}: {error}"));
                return Ok(());
            }
        };

        for (key_path, template) in catalog.entries() {
            self.templates += 1;
            if let Err(error) = parse_template(template) {
                let name = format!("{file}:{key_path}");
                self.reports
                    .push(LexiconDiagnostic::from_parse_error(&name, template, &error).into());
                self.findings.push(Finding {
                    file: file.clone(),
                    key: Some(key_path),
                    severity: Severity::Error,
                    message: error.kind.to_string(),
                    line: Some(error.line),
                    column: Some(error.column),
                });
            }
        }

        let Some(source) = source else {
            return Ok(());
        };
        let locale = locale_from_path(path)?;
        for warning in validate_catalog(source, &catalog, &locale) {
            // Syntax errors were reported above with source context.
            if matches!(warning, CatalogWarning::SyntaxError { .. }) {
                continue;
            }
            self.findings.push(Finding {
                file: file.clone(),
                key: Some(warning.key_path().to_string()),
                severity: Severity::Warning,
                message: warning.to_string(),
                line: None,
                column: None,
            });
        }
        Ok(())
    }
}

/// The locale a catalog file holds, from its stem (`locales/pt-BR.json` is `pt-BR`).
fn locale_from_path(path: &Path) -> Result<LocaleId> {
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .ok_or_else(|| miette!("cannot infer a locale from {}", path.display()))?;
    LocaleId::parse(stem)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot infer a locale from {}", path.display()))
}

/// Run the check command.
pub fn run_check(args: CheckArgs) -> Result<i32> {
    let source = args.source.as_deref().map(read_catalog_or_dir).transpose()?;

    let mut report = CheckReport::default();
    for path in &args.files {
        report.check_file(path, source.as_ref())?;
    }
    let errors = report.error_count();

    if args.json {
        let json_output = serde_json::to_string_pretty(&report.findings).into_diagnostic()?;
        println!("{json_output}");
    } else {
        for diagnostic in &report.reports {
            eprintln!("{diagnostic:?}");
        }
        for finding in report.findings.iter().filter(|f| f.severity == Severity::Warning) {
            eprintln!(
                "{}: {}",
                "warning".if_supports_color(Stream::Stderr, OwoColorize::yellow),
                finding.message
            );
        }
        if errors == 0 {
            println!(
                "{} {} file(s), {} template(s) checked",
                "✓".if_supports_color(Stream::Stdout, OwoColorize::green),
                args.files.len(),
                report.templates
            );
        } else {
            eprintln!(
                "{} {errors} error(s) in {} file(s)",
                "✗".if_supports_color(Stream::Stderr, OwoColorize::red),
                args.files.len()
            );
        }
    }

    if errors > 0 {
        Ok(exitcode::DATAERR)
    } else {
        Ok(exitcode::OK)
    }
}
