//! Catalog trees and the store that holds one per locale.

mod error;
mod node;
mod store;

pub use error::CatalogError;
pub use node::{Catalog, CatalogNode};
pub use store::{CatalogStore, LoadTicket, Lookup};
