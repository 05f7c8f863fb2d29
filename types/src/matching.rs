//! The incineration predicate.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{FieldPath, Record};

/// Identifier of an item selected for incineration.
///
/// Not deduplicated: the same id appearing in two records yields two dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects fully degraded items: `degradation_field` is the number `0` and
/// `id_field` is a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    pub id_field: FieldPath,
    pub degradation_field: FieldPath,
}

impl Default for MatchRule {
    fn default() -> Self {
        Self {
            id_field: FieldPath::parse(Self::DEFAULT_ID_FIELD),
            degradation_field: FieldPath::parse(Self::DEFAULT_DEGRADATION_FIELD),
        }
    }
}

impl MatchRule {
    pub const DEFAULT_ID_FIELD: &'static str = "item.id";
    pub const DEFAULT_DEGRADATION_FIELD: &'static str = "item.degradation";

    /// Evaluate the rule against one record.
    ///
    /// Absent fields and unexpected JSON types are non-matches, never errors.
    #[must_use]
    pub fn evaluate(&self, record: &Record) -> Option<ItemId> {
        let degradation = record.extract(&self.degradation_field)?;
        if !is_numeric_zero(degradation) {
            return None;
        }
        match record.extract(&self.id_field)? {
            Value::String(id) => Some(ItemId::new(id.clone())),
            _ => None,
        }
    }
}

// Integers, negative zero and `0.0` all count; numbers are compared as f64.
fn is_numeric_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Ids of every record matching `rule`, in record order.
#[must_use]
pub fn select_matches(records: &[Record], rule: &MatchRule) -> Vec<ItemId> {
    records.iter().filter_map(|r| rule.evaluate(r)).collect()
}
