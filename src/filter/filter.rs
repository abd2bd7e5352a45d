use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterWhereInfo, SqlResult};

/// SQL fragments for one table: WHERE, ORDER BY and LIMIT/OFFSET.
/// Columns are rendered against the table alias so joins can be added by the caller.
pub struct Filter {
    table_name: String,
    alias: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>, alias: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            alias: alias.into(),
            conditions: vec![],
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn assign(&mut self, data: FilterData, max_limit: Option<i64>) -> Result<&mut Self, FilterError> {
        self.conditions = data.conditions;
        self.order_data = data.order;
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset, max_limit)?;
        } else if let Some(offset) = data.offset {
            if offset < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
            self.offset = Some(offset);
        }
        Ok(self)
    }

    /// Use `order` only when no explicit ordering was assigned
    pub fn default_order(&mut self, order: Vec<FilterOrderInfo>) -> &mut Self {
        if self.order_data.is_empty() {
            self.order_data = order;
        }
        self
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>, max_limit: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        let max_limit = max_limit.unwrap_or(i64::MAX);
        let applied_limit = if limit > max_limit {
            tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.conditions, &self.alias)?;
        Ok(SqlResult { query, params })
    }

    /// ORDER BY and LIMIT/OFFSET, space separated (may be empty)
    pub fn to_tail_sql(&self) -> Result<String, FilterError> {
        let order_clause = FilterOrder::generate(&self.order_data, &self.alias)?;
        let limit_clause = self.build_limit_clause();
        Ok([order_clause, limit_clause]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "))
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        Ok(SqlResult {
            query: format!(
                "SELECT COUNT(*) AS count FROM \"{}\" AS {} WHERE {}",
                self.table_name, self.alias, where_result.query
            ),
            params: where_result.params,
        })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            // SQLite needs a LIMIT before OFFSET
            (None, Some(o)) => format!("LIMIT -1 OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

/// Identifiers are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` passes
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid identifier format: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    #[test]
    fn limit_is_capped() {
        let mut filter = Filter::new("students", "t").unwrap();
        filter.assign(FilterData::new().limit(5000), Some(1000)).unwrap();
        assert_eq!(filter.to_tail_sql().unwrap(), "LIMIT 1000");
    }

    #[test]
    fn negative_limit_rejected() {
        let mut filter = Filter::new("students", "t").unwrap();
        assert!(filter.assign(FilterData::new().limit(-1), None).is_err());
    }

    #[test]
    fn explicit_order_wins_over_default() {
        let mut filter = Filter::new("decisions", "t").unwrap();
        filter
            .assign(FilterData::new().order_by("title", SortDirection::Asc), None)
            .unwrap();
        filter.default_order(vec![FilterOrderInfo {
            column: "decision_date".into(),
            sort: SortDirection::Desc,
        }]);
        assert_eq!(filter.to_tail_sql().unwrap(), "ORDER BY t.\"title\" ASC");
    }

    #[test]
    fn count_sql_uses_alias() {
        let mut filter = Filter::new("students", "t").unwrap();
        filter.assign(FilterData::new().where_eq("status", "active"), None).unwrap();
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) AS count FROM \"students\" AS t WHERE t.\"status\" = ?"
        );
    }

    #[test]
    fn rejects_invalid_table_names() {
        assert!(Filter::new("", "t").is_err());
        assert!(Filter::new("student-assignments", "t").is_err());
        assert!(Filter::new("student_assignments", "t").is_ok());
    }
}
