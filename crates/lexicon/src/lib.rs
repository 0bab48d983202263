pub mod catalog;
pub mod config;
pub mod interpreter;
pub mod parser;
pub mod types;

pub use catalog::{Catalog, CatalogError, CatalogNode, CatalogStore};
pub use config::{Config, ConfigError};
pub use interpreter::{
    CatalogWarning, Diagnostic, DiagnosticKind, FallbackChain, LoadError, LocaleChange,
    LocaleError, LocaleManager, PlainFormatter, Subscription, TranslateError, TranslateMode,
    ValueFormatter,
};
pub use parser::{Message, ParseError, Segment, SyntaxErrorKind, parse_template};
pub use types::{Args, InvalidLocaleId, LocaleId, PluralCategory, Value};

/// Creates an [`Args`] bag from name/value pairs.
///
/// Values are converted via `Into<Value>`, so integers, floats, strings,
/// booleans and `SystemTime`s can be passed directly. Names are written
/// either as bare identifiers or as string expressions.
///
/// # Example
///
/// ```
/// use lexicon::args;
///
/// let a = args! { count: 3, name: "Alice" };
/// assert_eq!(a.len(), 2);
/// assert_eq!(a["count"].as_number(), Some(3.0));
/// assert_eq!(a["name"].as_string(), Some("Alice"));
///
/// let b = args! { "first-name" => "Bob" };
/// assert_eq!(b["first-name"].as_string(), Some("Bob"));
/// ```
#[macro_export]
macro_rules! args {
    {} => {
        $crate::Args::new()
    };
    { $($key:ident : $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::Args::new();
            $(
                map.insert(
                    ::std::string::String::from(stringify!($key)),
                    ::std::convert::Into::<$crate::Value>::into($value),
                );
            )+
            map
        }
    };
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::Args::new();
            $(
                map.insert($key.to_string(), ::std::convert::Into::<$crate::Value>::into($value));
            )+
            map
        }
    };
}
