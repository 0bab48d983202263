//! CLDR plural category resolution.
//!
//! Languages differ in how many cardinal forms they distinguish. Japanese and
//! Indonesian only use "other", English adds "one", Romanian adds "few", and
//! Polish, Czech or Russian add "many" on top of that.
//!
//! Rules for supported languages come from `icu_plurals` and are cached per
//! thread per language. Fractions keep their visible digits, so Romanian
//! `1.5` is "few" and Czech `1.5` is "many". Any other language falls back to
//! the minimal rule where exactly `1` is "one".

use std::cell::RefCell;

use icu_locale_core::Locale;
use icu_plurals::{PluralCategory as IcuCategory, PluralOperands, PluralRuleType, PluralRules};

use crate::types::PluralCategory;

/// Language subtags with CLDR cardinal rules.
const SUPPORTED_LANGUAGES: &[&str] = &[
    "ar", "cs", "de", "en", "es", "fr", "id", "it", "ja", "ko", "pl", "pt", "ro", "ru", "sk", "tr",
    "uk", "vi", "zh",
];

thread_local! {
    /// Per-thread cache of rules keyed by language. `None` marks a language
    /// whose rules could not be built.
    static PLURAL_RULES_CACHE: RefCell<Vec<(&'static str, Option<PluralRules>)>> =
        const { RefCell::new(Vec::new()) };
}

fn supported_language(language: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|code| code.eq_ignore_ascii_case(language))
        .copied()
}

fn build_rules(language: &'static str) -> Option<PluralRules> {
    let locale: Locale = language.parse().ok()?;
    match PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()) {
        Ok(rules) => Some(rules),
        Err(error) => {
            tracing::debug!(language, %error, "no plural rules; using the default rule");
            None
        }
    }
}

fn from_icu(category: IcuCategory) -> PluralCategory {
    match category {
        IcuCategory::Zero => PluralCategory::Zero,
        IcuCategory::One => PluralCategory::One,
        IcuCategory::Two => PluralCategory::Two,
        IcuCategory::Few => PluralCategory::Few,
        IcuCategory::Many => PluralCategory::Many,
        IcuCategory::Other => PluralCategory::Other,
    }
}

fn default_rule(n: f64) -> PluralCategory {
    if n == 1.0 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

/// CLDR operands of `n`, from its shortest decimal form (`2.5` has one
/// visible fraction digit, `2.0` has none).
fn operands(n: f64) -> Option<PluralOperands> {
    n.abs().to_string().parse().ok()
}

/// Get the CLDR cardinal plural category of `n` in `locale`.
///
/// Only the language subtag of `locale` matters (`pt-BR` uses `pt` rules).
/// Non-finite values are always "other".
///
/// # Examples
///
/// ```
/// use lexicon::PluralCategory;
/// use lexicon::interpreter::plural_category;
///
/// assert_eq!(plural_category("en", 1.0), PluralCategory::One);
/// assert_eq!(plural_category("en", 5.0), PluralCategory::Other);
///
/// assert_eq!(plural_category("ro", 2.0), PluralCategory::Few);
/// assert_eq!(plural_category("ro", 20.0), PluralCategory::Other);
///
/// assert_eq!(plural_category("id", 1.0), PluralCategory::Other);
/// assert_eq!(plural_category("en", 1.5), PluralCategory::Other);
/// assert_eq!(plural_category("ro", 1.5), PluralCategory::Few);
/// ```
pub fn plural_category(locale: &str, n: f64) -> PluralCategory {
    if !n.is_finite() {
        return PluralCategory::Other;
    }
    let language = locale.split(['-', '_']).next().unwrap_or(locale);
    let Some(language) = supported_language(language) else {
        return default_rule(n);
    };

    PLURAL_RULES_CACHE.with_borrow_mut(|cache| {
        let index = match cache.iter().position(|(code, _)| *code == language) {
            Some(index) => index,
            None => {
                cache.push((language, build_rules(language)));
                cache.len() - 1
            }
        };
        let Some(rules) = &cache[index].1 else {
            return default_rule(n);
        };
        match operands(n) {
            Some(operands) => from_icu(rules.category_for(operands)),
            None => PluralCategory::Other,
        }
    })
}
