//! Translation catalog checks against the default locale.

use thiserror::Error;

use crate::catalog::Catalog;
use crate::parser::{ParseError, parse_template};
use crate::types::LocaleId;

/// A problem found in a translation catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogWarning {
    /// The key does not exist in the default catalog.
    #[error("'{key_path}' in '{locale}' does not exist in the default catalog")]
    UnknownKey { key_path: String, locale: LocaleId },

    /// The template does not parse.
    #[error("'{key_path}' in '{locale}': {error}")]
    SyntaxError {
        key_path: String,
        locale: LocaleId,
        error: ParseError,
    },

    /// The template uses different arguments than the default template.
    #[error(
        "'{key_path}' in '{locale}' uses arguments [{}] but the default uses [{}]",
        found.join(", "),
        expected.join(", ")
    )]
    ArgumentMismatch {
        key_path: String,
        locale: LocaleId,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl CatalogWarning {
    pub fn key_path(&self) -> &str {
        match self {
            CatalogWarning::UnknownKey { key_path, .. }
            | CatalogWarning::SyntaxError { key_path, .. }
            | CatalogWarning::ArgumentMismatch { key_path, .. } => key_path,
        }
    }
}

/// Check `target` (the catalog of `locale`) against the default catalog.
///
/// Warnings are reported in key order. Argument names are only compared
/// when both templates parse.
///
/// # Example
///
/// ```
/// use lexicon::{Catalog, LocaleId};
/// use lexicon::interpreter::{CatalogWarning, validate_catalog};
///
/// let default = Catalog::from_json_str(r#"{ "greeting": "Hello, {name}!" }"#).unwrap();
/// let target = Catalog::from_json_str(r#"{
///     "greeting": "Halo, {nama}!",
///     "extra": "Lebih"
/// }"#).unwrap();
///
/// let warnings = validate_catalog(&default, &target, &LocaleId::parse("id").unwrap());
/// assert_eq!(warnings.len(), 2);
/// assert!(matches!(warnings[0], CatalogWarning::UnknownKey { .. }));
/// assert!(matches!(warnings[1], CatalogWarning::ArgumentMismatch { .. }));
/// ```
pub fn validate_catalog(
    default: &Catalog,
    target: &Catalog,
    locale: &LocaleId,
) -> Vec<CatalogWarning> {
    let mut warnings = Vec::new();

    for (key_path, template) in target.entries() {
        let source = default.get(&key_path);
        if source.is_none() {
            warnings.push(CatalogWarning::UnknownKey {
                key_path: key_path.clone(),
                locale: locale.clone(),
            });
        }

        let message = match parse_template(template) {
            Ok(message) => message,
            Err(error) => {
                warnings.push(CatalogWarning::SyntaxError {
                    key_path,
                    locale: locale.clone(),
                    error,
                });
                continue;
            }
        };

        let Some(Ok(source)) = source.map(parse_template) else {
            continue;
        };
        let expected: Vec<String> = source.argument_names().into_iter().map(str::to_string).collect();
        let found: Vec<String> = message.argument_names().into_iter().map(str::to_string).collect();
        if expected != found {
            warnings.push(CatalogWarning::ArgumentMismatch {
                key_path,
                locale: locale.clone(),
                expected,
                found,
            });
        }
    }

    warnings
}

/// Keys of the default catalog absent from `target`, in key order.
pub fn missing_keys(default: &Catalog, target: &Catalog) -> Vec<String> {
    default
        .keys()
        .into_iter()
        .filter(|key_path| target.get(key_path).is_none())
        .collect()
}
