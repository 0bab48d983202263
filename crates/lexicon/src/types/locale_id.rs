use std::fmt;
use std::str::FromStr;

use icu_locale_core::LanguageIdentifier;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A validated BCP-47 language tag such as `id`, `ro`, `en-US` or `pt-BR`.
///
/// Tags are canonicalised on parse (`en_us` and `EN-us` both become
/// `en-US`), so two `LocaleId`s compare equal exactly when they name the same
/// locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId(String);

/// Returned when a string is not a well-formed language tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid locale identifier '{input}'")]
pub struct InvalidLocaleId {
    pub input: String,
}

impl LocaleId {
    /// Parse and canonicalise a language tag.
    ///
    /// ```
    /// use lexicon::LocaleId;
    ///
    /// let locale = LocaleId::parse("pt_br").unwrap();
    /// assert_eq!(locale.as_str(), "pt-BR");
    /// assert_eq!(locale.language(), "pt");
    /// ```
    pub fn parse(input: &str) -> Result<Self, InvalidLocaleId> {
        let invalid = || InvalidLocaleId {
            input: input.to_string(),
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }
        let normalized = trimmed.replace('_', "-");
        let langid: LanguageIdentifier = normalized.parse().map_err(|_| invalid())?;
        Ok(Self(langid.to_string()))
    }

    /// The canonical tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language subtag (`pt` for `pt-BR`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// The language-only locale, if this tag carries more than a language.
    pub fn language_only(&self) -> Option<LocaleId> {
        if self.language() == self.0 {
            None
        } else {
            Some(Self(self.language().to_string()))
        }
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocaleId {
    type Err = InvalidLocaleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocaleId {
    type Error = InvalidLocaleId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for LocaleId {
    type Error = InvalidLocaleId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LocaleId> for String {
    fn from(locale: LocaleId) -> Self {
        locale.0
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
