//! Implementation of the `lexicon eval` command.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::ArgGroup;
use lexicon::{
    parse_template, Args, Config, Diagnostic, LocaleId, LocaleManager, TranslateError, Value,
};
use miette::{IntoDiagnostic, Result, WrapErr};
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::output::LexiconDiagnostic;

/// Arguments for the eval command.
#[derive(Debug, clap::Args)]
#[command(group(ArgGroup::new("input").required(true).args(["template", "key"])))]
pub struct EvalArgs {
    /// Locale to render in (e.g., en, ro, pt-BR)
    #[arg(long, required = true)]
    pub lang: String,

    /// Template string to render
    #[arg(long)]
    pub template: Option<String>,

    /// Catalog key path to translate (e.g., settings.title)
    #[arg(long)]
    pub key: Option<String>,

    /// Directory of `<locale>.json` catalogs or `<locale>/` fragment directories
    #[arg(long, conflicts_with = "config")]
    pub catalogs: Option<PathBuf>,

    /// Configuration file naming the default locale and catalog directory
    #[arg(long, env = "LEXICON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default locale when no configuration file is given
    #[arg(long, default_value = "en")]
    pub default_locale: String,

    /// Parameters in name=value format (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output for eval results.
#[derive(Serialize)]
struct EvalResult<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: &'a [Diagnostic],
}

/// Parse a key=value parameter string.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid parameter format '{s}': expected name=value"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Integers first, then floats; anything else stays a string.
fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        Value::Number(n)
    } else if let Ok(n) = raw.parse::<f64>() {
        Value::Float(n)
    } else {
        Value::String(raw.to_string())
    }
}

/// Load `<locale>.json` files and `<locale>/` fragment directories from `dir`.
fn load_catalogs_from(manager: &LocaleManager, dir: &Path) -> Result<()> {
    let entries = fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry.into_diagnostic()?.path();
        let is_fragment_dir = path.is_dir();
        let name = if is_fragment_dir {
            path.file_name()
        } else if path.extension() == Some(OsStr::new("json")) {
            path.file_stem()
        } else {
            continue;
        };
        let Some(locale) = name
            .and_then(OsStr::to_str)
            .and_then(|name| LocaleId::parse(name).ok())
        else {
            tracing::debug!(path = %path.display(), "skipping entry not named after a locale");
            continue;
        };
        if is_fragment_dir {
            manager.load_catalog_dir(locale, &path).into_diagnostic()?;
        } else {
            manager.load_catalog_file(locale, &path).into_diagnostic()?;
        }
    }
    Ok(())
}

/// Build a manager rendering in `lang`, which need not have a catalog of its own.
fn build_manager(args: &EvalArgs, lang: &LocaleId) -> Result<LocaleManager> {
    if let Some(path) = &args.config {
        let config = Config::from_file(path).into_diagnostic()?;
        let manager = LocaleManager::builder()
            .default_locale(config.default_locale.clone())
            .initial_locale(lang.clone())
            .mode(config.mode)
            .build();
        for locale in config.all_locales() {
            config.load_locale(&manager, locale).into_diagnostic()?;
        }
        return Ok(manager);
    }

    let default_locale = LocaleId::parse(&args.default_locale).into_diagnostic()?;
    let manager = LocaleManager::builder()
        .default_locale(default_locale)
        .initial_locale(lang.clone())
        .build();
    if let Some(dir) = &args.catalogs {
        load_catalogs_from(&manager, dir)?;
    }
    Ok(manager)
}

/// Run the eval command.
pub fn run_eval(args: EvalArgs) -> Result<i32> {
    let lang = LocaleId::parse(&args.lang).into_diagnostic()?;
    let manager = build_manager(&args, &lang)?;
    let bag: Args = args
        .params
        .iter()
        .map(|(name, raw)| (name.clone(), parse_value(raw)))
        .collect();

    let collected = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&collected);
    let _subscription = manager.on_diagnostic(move |diagnostic| {
        if let Ok(mut diagnostics) = sink.lock() {
            diagnostics.push(diagnostic.clone());
        }
    });

    let outcome = match (&args.template, &args.key) {
        (Some(template), _) => {
            if let Err(error) = parse_template(template) {
                return Err(LexiconDiagnostic::from_parse_error("<template>", template, &error).into());
            }
            Ok(manager.format_str(template, &bag))
        }
        (None, Some(key)) => match manager.try_translate(key, &bag) {
            Ok(output) => Ok(output),
            Err(TranslateError::Degraded {
                output,
                diagnostics,
                ..
            }) => {
                if let Ok(mut collected) = collected.lock() {
                    collected.extend(diagnostics);
                }
                Ok(output)
            }
            Err(TranslateError::Syntax {
                key_path,
                locale,
                source,
            }) => {
                let name = format!("{locale}:{key_path}");
                let template = manager
                    .catalog(&locale)
                    .and_then(|catalog| catalog.get(&key_path).map(str::to_string))
                    .unwrap_or_default();
                return Err(LexiconDiagnostic::from_parse_error(&name, &template, &source).into());
            }
            Err(error) => Err(error.to_string()),
        },
        (None, None) => Err("either --template or --key is required".to_string()),
    };

    let diagnostics = collected
        .lock()
        .map(|diagnostics| diagnostics.clone())
        .unwrap_or_default();

    let (output, error) = match &outcome {
        Ok(output) => (Some(output.as_str()), None),
        Err(error) => (None, Some(error.clone())),
    };

    if args.json {
        let json_output = serde_json::to_string_pretty(&EvalResult {
            result: output,
            error,
            diagnostics: &diagnostics,
        })
        .into_diagnostic()?;
        println!("{json_output}");
    } else {
        if let Some(output) = output {
            println!("{output}");
        }
        if let Some(error) = error {
            eprintln!(
                "{}: {error}",
                "error".if_supports_color(Stream::Stderr, OwoColorize::red)
            );
        }
        for diagnostic in &diagnostics {
            eprintln!(
                "{}: {diagnostic}",
                "warning".if_supports_color(Stream::Stderr, OwoColorize::yellow)
            );
        }
    }

    if outcome.is_ok() && diagnostics.is_empty() {
        Ok(exitcode::OK)
    } else {
        Ok(exitcode::DATAERR)
    }
}
