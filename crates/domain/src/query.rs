//! Find-request predicates

use serde_json::{Map, Value};

/// One field criterion inside a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// Field name; trimmed and stripped of quote characters on build.
    pub name: String,
    /// Match value, passed to the server verbatim.
    pub value: String,
}

impl FieldFilter {
    /// Creates a filter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One AND-clause of a find request.
///
/// The server ORs the predicates of a find request together. A
/// predicate without a field list terminates processing of everything
/// after it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPredicate {
    /// Field criteria, ANDed by the server. `None` short-circuits.
    pub fields: Option<Vec<FieldFilter>>,
    /// Excludes matching records instead of including them.
    pub omit: bool,
}

impl QueryPredicate {
    /// Creates a predicate from its field criteria.
    #[must_use]
    pub fn with_fields(fields: Vec<FieldFilter>) -> Self {
        Self {
            fields: Some(fields),
            omit: false,
        }
    }

    /// Marks the predicate as an omit clause.
    #[must_use]
    pub const fn omit(mut self) -> Self {
        self.omit = true;
        self
    }
}

/// Flattens predicates into the wire shape of the `query` body key.
///
/// Each predicate contributes one `{name: value}` object per field,
/// followed by `{"omit": true}` when flagged. A predicate with no field
/// list stops the walk; predicates after it are dropped.
#[must_use]
pub fn query_options(predicates: &[QueryPredicate]) -> Vec<Map<String, Value>> {
    let mut items = Vec::new();

    for predicate in predicates {
        let Some(fields) = &predicate.fields else {
            break;
        };

        for field in fields {
            let mut entry = Map::new();
            entry.insert(
                field.name.replace('"', "").trim().to_string(),
                Value::String(field.value.clone()),
            );
            items.push(entry);
        }

        if predicate.omit {
            let mut entry = Map::new();
            entry.insert("omit".to_string(), Value::Bool(true));
            items.push(entry);
        }
    }

    items
}
