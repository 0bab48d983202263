mod locale_id;
mod plural_category;
mod value;

pub use locale_id::{InvalidLocaleId, LocaleId};
pub use plural_category::{PluralCategory, UnknownPluralCategory};
pub use value::{Args, Value};
