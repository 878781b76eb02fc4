//! Value filters: `key===v1|v2;other===v3`.
//!
//! Values inside a clause are alternatives; clauses must all hold. Matching
//! is on the string form of the first field with the clause's key.

use records::{Item, display_string};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub key: String,
    pub values: Vec<String>,
}

impl FilterClause {
    pub fn matches(&self, item: &Item) -> bool {
        let Some(field) = item.field(&self.key) else {
            return false;
        };
        let actual = display_string(&field.value);
        self.values.iter().any(|v| *v == actual)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueFilter {
    clauses: Vec<FilterClause>,
}

impl ValueFilter {
    /// Parse a filter expression. Blank clauses are skipped, clauses without
    /// `===` are skipped with a warning; keys and values are trimmed.
    pub fn parse(expr: &str) -> Self {
        let mut clauses = Vec::new();
        for raw in expr.split(';') {
            if raw.trim().is_empty() {
                continue;
            }
            let Some((key, values)) = raw.split_once("===") else {
                warn!("Ignoring value filter clause without '===': {raw:?}");
                continue;
            };
            clauses.push(FilterClause {
                key: key.trim().to_string(),
                values: values.split('|').map(|v| v.trim().to_string()).collect(),
            });
        }
        Self { clauses }
    }

    pub fn from_setting(expr: Option<&str>) -> Self {
        expr.map(Self::parse).unwrap_or_default()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.clauses.iter().all(|c| c.matches(item))
    }

    pub fn apply(&self, items: Vec<Item>) -> Vec<Item> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}
