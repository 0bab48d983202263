//! The per-locale catalog tree.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use super::CatalogError;

/// A node in a catalog tree: a template leaf or a named group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNode {
    Leaf(String),
    Group(BTreeMap<String, CatalogNode>),
}

/// One locale's templates, addressed by dot-joined key paths.
///
/// # Example
///
/// ```
/// use lexicon::Catalog;
///
/// let catalog = Catalog::from_json_str(r#"{
///     "submit": "Submit",
///     "auth": { "resend": "Resend in {seconds} seconds" }
/// }"#).unwrap();
///
/// assert_eq!(catalog.get("auth.resend"), Some("Resend in {seconds} seconds"));
/// assert_eq!(catalog.get("auth"), None);
/// assert_eq!(catalog.get("auth.missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    root: BTreeMap<String, CatalogNode>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a nested JSON object of strings.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Build a catalog from an already-parsed JSON value.
    ///
    /// The value must be an object whose leaves are strings.
    pub fn from_json_value(value: JsonValue) -> Result<Self, CatalogError> {
        match value {
            JsonValue::Object(map) => Ok(Self {
                root: group_from_json(map, "")?,
            }),
            other => Err(CatalogError::InvalidNode {
                path: String::new(),
                found: json_kind(&other),
            }),
        }
    }

    /// Build a catalog from flat `(key_path, template)` pairs.
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut catalog = Self::new();
        for (key_path, template) in entries {
            catalog.insert(key_path.as_ref(), template)?;
        }
        Ok(catalog)
    }

    /// Insert or replace the template at `key_path`, creating groups as needed.
    pub fn insert(&mut self, key_path: &str, template: impl Into<String>) -> Result<(), CatalogError> {
        let segments: Vec<&str> = key_path.split('.').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(CatalogError::InvalidKey {
                path: key_path.to_string(),
            });
        }
        insert_into(&mut self.root, &segments, template.into(), key_path)
    }

    /// Merge another catalog fragment into this one.
    ///
    /// Fragments must be disjoint: a key present in both is a
    /// [`DuplicateKey`](CatalogError::DuplicateKey), and a leaf in one where
    /// the other has a group is a [`Conflict`](CatalogError::Conflict). On
    /// error `self` is left unchanged.
    ///
    /// ```
    /// use lexicon::Catalog;
    ///
    /// let mut catalog = Catalog::from_json_str(r#"{ "auth": { "submit": "Submit" } }"#).unwrap();
    /// let tour = Catalog::from_json_str(r#"{ "auth": { "welcome": "Welcome" } }"#).unwrap();
    /// catalog.merge(tour).unwrap();
    /// assert_eq!(catalog.keys(), vec!["auth.submit", "auth.welcome"]);
    /// ```
    pub fn merge(&mut self, other: Catalog) -> Result<(), CatalogError> {
        let mut merged = self.root.clone();
        merge_into(&mut merged, other.root, "")?;
        self.root = merged;
        Ok(())
    }

    /// Look up the template at `key_path`.
    ///
    /// Returns `None` if any segment is missing or the addressed node is a group.
    pub fn get(&self, key_path: &str) -> Option<&str> {
        match self.node(key_path)? {
            CatalogNode::Leaf(template) => Some(template),
            CatalogNode::Group(_) => None,
        }
    }

    /// Look up any node (leaf or group) at `key_path`.
    pub fn node(&self, key_path: &str) -> Option<&CatalogNode> {
        let mut segments = key_path.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            let CatalogNode::Group(children) = node else {
                return None;
            };
            node = children.get(segment)?;
        }
        Some(node)
    }

    /// Every leaf key path, in tree order (groups are visited alphabetically).
    pub fn keys(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(key_path, _)| key_path)
            .collect()
    }

    /// Every `(key_path, template)` pair, in tree order.
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut entries = Vec::new();
        collect_entries(&self.root, "", &mut entries);
        entries
    }

    /// Number of leaf templates.
    pub fn len(&self) -> usize {
        count_leaves(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

fn group_from_json(
    map: Map<String, JsonValue>,
    prefix: &str,
) -> Result<BTreeMap<String, CatalogNode>, CatalogError> {
    map.into_iter()
        .map(|(key, value)| {
            let path = join_path(prefix, &key);
            if key.is_empty() || key.contains('.') {
                return Err(CatalogError::InvalidKey { path });
            }
            let node = match value {
                JsonValue::String(template) => CatalogNode::Leaf(template),
                JsonValue::Object(children) => CatalogNode::Group(group_from_json(children, &path)?),
                other => {
                    return Err(CatalogError::InvalidNode {
                        path,
                        found: json_kind(&other),
                    });
                }
            };
            Ok((key, node))
        })
        .collect()
}

fn insert_into(
    group: &mut BTreeMap<String, CatalogNode>,
    segments: &[&str],
    template: String,
    key_path: &str,
) -> Result<(), CatalogError> {
    let conflict = || CatalogError::Conflict {
        path: key_path.to_string(),
    };
    let Some((first, rest)) = segments.split_first() else {
        return Err(CatalogError::InvalidKey {
            path: key_path.to_string(),
        });
    };

    if rest.is_empty() {
        if let Some(CatalogNode::Group(_)) = group.get(*first) {
            return Err(conflict());
        }
        group.insert((*first).to_string(), CatalogNode::Leaf(template));
        return Ok(());
    }

    let child = group
        .entry((*first).to_string())
        .or_insert_with(|| CatalogNode::Group(BTreeMap::new()));
    match child {
        CatalogNode::Group(children) => insert_into(children, rest, template, key_path),
        CatalogNode::Leaf(_) => Err(conflict()),
    }
}

fn merge_into(
    group: &mut BTreeMap<String, CatalogNode>,
    incoming: BTreeMap<String, CatalogNode>,
    prefix: &str,
) -> Result<(), CatalogError> {
    for (key, node) in incoming {
        let path = join_path(prefix, &key);
        let Some(existing) = group.get_mut(&key) else {
            group.insert(key, node);
            continue;
        };
        match (existing, node) {
            (CatalogNode::Group(children), CatalogNode::Group(incoming)) => {
                merge_into(children, incoming, &path)?;
            }
            (CatalogNode::Leaf(_), CatalogNode::Leaf(_)) => {
                return Err(CatalogError::DuplicateKey { path });
            }
            _ => return Err(CatalogError::Conflict { path }),
        }
    }
    Ok(())
}

fn collect_entries<'a>(
    group: &'a BTreeMap<String, CatalogNode>,
    prefix: &str,
    out: &mut Vec<(String, &'a str)>,
) {
    for (key, node) in group {
        let path = join_path(prefix, key);
        match node {
            CatalogNode::Leaf(template) => out.push((path, template)),
            CatalogNode::Group(children) => collect_entries(children, &path, out),
        }
    }
}

fn count_leaves(group: &BTreeMap<String, CatalogNode>) -> usize {
    group
        .values()
        .map(|node| match node {
            CatalogNode::Leaf(_) => 1,
            CatalogNode::Group(children) => count_leaves(children),
        })
        .sum()
}
