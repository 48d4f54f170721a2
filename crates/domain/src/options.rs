//! Flat request option maps
//!
//! Every Data API call is parameterized through a flat `key -> value`
//! map that ends up either in the query string or in the JSON body.
//! The builders here translate the typed call arguments into that map.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// A single option value.
///
/// The wire format only ever carries strings and integers at the top
/// level; pre-serialized JSON documents travel as `Text` and are
/// embedded verbatim by the body encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Text value, possibly a pre-serialized JSON document.
    Text(String),
    /// Integer value, embedded unquoted.
    Int(i64),
}

impl OptionValue {
    /// Renders the value for use in a query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Int(int) => int.to_string(),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A flat option map with stable iteration order.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Sort order for a single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending order.
    Ascend,
    /// Descending order.
    Descend,
}

/// One field of a sort specification, in the API's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortField {
    /// The field to sort on.
    pub field_name: String,
    /// Direction of the sort.
    pub sort_order: SortOrder,
}

impl SortField {
    /// Creates an ascending sort field.
    #[must_use]
    pub fn ascend(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            sort_order: SortOrder::Ascend,
        }
    }

    /// Creates a descending sort field.
    #[must_use]
    pub fn descend(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            sort_order: SortOrder::Descend,
        }
    }
}

/// A sort argument: either an opaque expression passed through as-is,
/// or a typed field list serialized into the wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sort {
    /// A pre-formatted sort expression.
    Expr(String),
    /// A list of sort fields.
    Fields(Vec<SortField>),
}

/// Pagination and layout options shared by the list and find calls.
///
/// All fields default to "not set"; only set fields contribute keys.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// 1-based offset of the first record to return.
    pub offset: Option<i64>,
    /// Maximum number of records to return.
    pub limit: Option<i64>,
    /// Sort specification.
    pub sort: Option<Sort>,
    /// Layout to use for formatting the response.
    pub response_layout: Option<String>,
}

/// Writes list options into an option map.
///
/// The record-list endpoint names its parameters `_offset`, `_limit`
/// and `_sort`; the find endpoint uses the bare names. The underscore
/// prefix is applied when `underscore_prefix` is set. The response
/// layout key is `layout.response` on both.
pub fn list_options(options: &ListOptions, underscore_prefix: bool, map: &mut OptionMap) {
    let prefix = if underscore_prefix { "_" } else { "" };

    if let Some(offset) = options.offset {
        map.insert(format!("{prefix}offset"), OptionValue::Int(offset));
    }

    if let Some(limit) = options.limit {
        map.insert(format!("{prefix}limit"), OptionValue::Int(limit));
    }

    if let Some(sort) = &options.sort {
        let rendered = match sort {
            Sort::Expr(expr) => expr.clone(),
            Sort::Fields(fields) => {
                serde_json::to_string(fields).unwrap_or_else(|_| String::from("[]"))
            }
        };
        map.insert(format!("{prefix}sort"), OptionValue::Text(rendered));
    }

    if let Some(layout) = &options.response_layout {
        if !layout.is_empty() {
            map.insert(
                "layout.response".to_string(),
                OptionValue::Text(layout.clone()),
            );
        }
    }
}

/// Wraps record field data for embedding in a JSON body.
///
/// The value under `fieldData` is the serialized document itself; the
/// body encoder embeds it without re-escaping.
#[must_use]
pub fn field_data(record: &Map<String, Value>) -> OptionMap {
    let mut map = OptionMap::new();
    map.insert(
        "fieldData".to_string(),
        OptionValue::Text(Value::Object(record.clone()).to_string()),
    );
    map
}

/// Serializes related-record data for the `portalData` body key.
#[must_use]
pub fn portal_data(portal: &Map<String, Value>) -> String {
    Value::Object(portal.clone()).to_string()
}
