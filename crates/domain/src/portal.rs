//! Portal (related-record) directives

use serde_json::Value;

use crate::options::{OptionMap, OptionValue};

/// Restricts and paginates one related-record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalDirective {
    /// Portal name as defined on the layout.
    pub name: String,
    /// 1-based offset into the related set.
    pub offset: Option<i64>,
    /// Maximum number of related records.
    pub limit: Option<i64>,
}

impl PortalDirective {
    /// Creates a directive with no pagination.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: None,
            limit: None,
        }
    }
}

/// Writes portal directives into an option map.
///
/// The `portal` key carries the serialized list of portal names. Both
/// `offset` and `limit` write to the `offset.<name>` key (the limit key
/// shares the offset prefix on the wire; kept as observed, the limit
/// value simply overwrites the offset for the same portal).
///
/// An empty directive list leaves the map untouched.
pub fn portal_options(directives: &[PortalDirective], map: &mut OptionMap) {
    if directives.is_empty() {
        return;
    }

    let names: Vec<Value> = directives
        .iter()
        .map(|directive| Value::String(directive.name.clone()))
        .collect();

    for directive in directives {
        let key = format!("offset.{}", directive.name).replace('"', "");
        let key = key.trim().to_string();

        if let Some(offset) = directive.offset {
            map.insert(key.clone(), OptionValue::Int(offset));
        }

        if let Some(limit) = directive.limit {
            map.insert(key, OptionValue::Int(limit));
        }
    }

    map.insert(
        "portal".to_string(),
        OptionValue::Text(Value::Array(names).to_string()),
    );
}
