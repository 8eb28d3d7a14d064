//! Typed filters over the platform's SQL-ish view query dialect.

use serde::{Deserialize, Serialize};

use super::GatewayError;
use crate::models::{AnnotationValue, EntityId};

/// A conjunction of column equalities, optionally limited.
///
/// Filters are built in code and rendered to the wire dialect by the REST
/// gateway; the in-memory gateway evaluates them structurally. An empty
/// filter selects every row in the view.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    conditions: Vec<(String, AnnotationValue)>,
    limit: Option<u32>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn limit(mut self, rows: u32) -> Self {
        self.limit = Some(rows);
        self
    }

    pub fn conditions(&self) -> &[(String, AnnotationValue)] {
        &self.conditions
    }

    pub fn row_limit(&self) -> Option<u32> {
        self.limit
    }

    /// Render the filter as an ID query against `view_id`.
    pub fn to_sql(&self, view_id: &EntityId) -> Result<String, GatewayError> {
        let mut sql = format!("SELECT id FROM {view_id}");

        if !self.conditions.is_empty() {
            let clauses = self
                .conditions
                .iter()
                .map(|(column, value)| Ok(format!("{column}={}", quote_literal(value)?)))
                .collect::<Result<Vec<_>, GatewayError>>()?;
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if let Some(rows) = self.limit {
            sql.push_str(&format!(" LIMIT {rows}"));
        }

        Ok(sql)
    }
}

/// Quote a literal for the view query dialect.
///
/// Strings are single-quoted with embedded quotes doubled. Booleans are not
/// valid filter literals on the platform and are rejected.
pub fn quote_literal(value: &AnnotationValue) -> Result<String, GatewayError> {
    match value {
        AnnotationValue::Int(n) => Ok(n.to_string()),
        AnnotationValue::Float(x) => Ok(x.to_string()),
        AnnotationValue::Str(s) => Ok(format!("'{}'", s.replace('\'', "''"))),
        AnnotationValue::Bool(_) => Err(GatewayError::InvalidQuery(
            "boolean literals are not supported in view filters".to_string(),
        )),
    }
}

/// IDs matched by a view query, in result order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<EntityId>,
}
