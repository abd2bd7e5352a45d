use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<Value>,
}

impl FilterWhere {
    /// Render ANDed conditions against `alias`. Returns "1=1" when there are none.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        alias: &str,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self { param_values: vec![] };
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            validate_identifier(&condition.column).map_err(FilterError::InvalidColumn)?;
            sql_conditions.push(filter_where.build_sql_condition(condition, alias)?);
        }
        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(
        &mut self,
        condition: &FilterWhereInfo,
        alias: &str,
    ) -> Result<String, FilterError> {
        let quoted_column = format!("{}.\"{}\"", alias, condition.column);
        let data = &condition.data;
        Ok(match condition.operator {
            FilterOp::Eq if data.is_null() => format!("{} IS NULL", quoted_column),
            FilterOp::Eq => format!("{} = {}", quoted_column, self.param(data)),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(data)),
        })
    }

    fn param(&mut self, value: &Value) -> String {
        // Booleans are stored as integers
        let value = match value {
            Value::Bool(b) => Value::from(i64::from(*b)),
            other => other.clone(),
        };
        self.param_values.push(value);
        "?".to_string()
    }
}
