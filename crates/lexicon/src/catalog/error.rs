use thiserror::Error;

/// Errors raised while building a catalog tree.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The payload is not valid JSON.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON node that is neither a string nor an object.
    #[error("catalog entry '{path}' must be a string or an object, found {found}")]
    InvalidNode { path: String, found: &'static str },

    /// A key path with empty segments, or a group name containing `.`.
    #[error("invalid key path '{path}'")]
    InvalidKey { path: String },

    /// A leaf and a group claim the same path.
    #[error("key path '{path}' conflicts with an existing entry")]
    Conflict { path: String },

    /// Two merged fragments both define the same key.
    #[error("key path '{path}' is defined in more than one fragment")]
    DuplicateKey { path: String },
}
