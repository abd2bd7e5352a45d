use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::{Executor, Row};

use crate::api::format;
use crate::database::manager::DatabaseError;
use crate::database::record::Record;
use crate::database::schema::{parse_decimal, EntitySchema, FieldKind};
use crate::filter::{Filter, FilterData, FilterOrderInfo, SqlResult};

/// Alias of the entity's own table in every generated query
pub const BASE: &str = "t";

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Reads for one entity: wire projection, joins, filter and aggregates
pub struct QueryBuilder {
    schema: &'static EntitySchema,
    filter: Filter,
}

impl QueryBuilder {
    pub fn new(schema: &'static EntitySchema) -> Result<Self, DatabaseError> {
        let filter = Filter::new(schema.table, BASE)?;
        Ok(Self { schema, filter })
    }

    pub fn filter(mut self, filter_data: FilterData, max_limit: Option<i64>) -> Result<Self, DatabaseError> {
        self.filter.assign(filter_data, max_limit)?;
        Ok(self)
    }

    pub fn select_sql(&mut self) -> Result<SqlResult, DatabaseError> {
        let default_order = self
            .schema
            .order
            .iter()
            .map(|o| FilterOrderInfo { column: o.column.to_string(), sort: o.sort })
            .collect();
        self.filter.default_order(default_order);

        let where_result = self.filter.to_where_sql()?;
        let tail = self.filter.to_tail_sql()?;
        let query = [
            format!("SELECT {} AS row", projection(self.schema)),
            format!("FROM \"{}\" AS {}", self.schema.table, BASE),
            join_clauses(self.schema),
            format!("WHERE {}", where_result.query),
            tail,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        Ok(SqlResult { query, params: where_result.params })
    }

    pub async fn select_all<'e, E>(mut self, executor: E) -> Result<Vec<Record>, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql_result = self.select_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(executor).await?;
        rows.iter().map(|row| decode_row(self.schema, row)).collect()
    }

    pub async fn select_optional<'e, E>(mut self, executor: E) -> Result<Option<Record>, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql_result = self.select_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        match q.fetch_optional(executor).await? {
            Some(row) => Ok(Some(decode_row(self.schema, &row)?)),
            None => Ok(None),
        }
    }

    pub async fn count<'e, E>(self, executor: E) -> Result<i64, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql_result = self.filter.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(executor).await?;
        Ok(row.try_get("count")?)
    }

    /// Mean of a numeric column over the filtered rows; 0 when there are none
    pub async fn average<'e, E>(self, column: &str, executor: E) -> Result<f64, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let expr = self.numeric_column(column)?;
        let where_result = self.filter.to_where_sql()?;
        let query = format!(
            "SELECT AVG(CAST({} AS REAL)) AS value FROM \"{}\" AS {} WHERE {}",
            expr, self.schema.table, BASE, where_result.query
        );
        let mut q = sqlx::query(&query);
        for p in where_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(executor).await?;
        let value: Option<f64> = row.try_get("value")?;
        Ok(value.unwrap_or(0.0))
    }

    /// Exact decimal sum of a column over the filtered rows; 0 when there are none
    pub async fn sum<'e, E>(self, column: &str, executor: E) -> Result<Decimal, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let expr = self.numeric_column(column)?;
        let where_result = self.filter.to_where_sql()?;
        let query = format!(
            "SELECT {} AS value FROM \"{}\" AS {} WHERE {} AND {} IS NOT NULL",
            expr, self.schema.table, BASE, where_result.query, expr
        );
        let mut q = sqlx::query(&query);
        for p in where_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(executor).await?;
        let mut total = Decimal::ZERO;
        for row in rows {
            let value: String = row.try_get("value")?;
            total += parse_decimal(&Value::String(value.clone()))
                .ok_or_else(|| DatabaseError::QueryError(format!("Stored value is not a decimal: {}", value)))?;
        }
        Ok(total)
    }

    /// Row counts grouped by a column or joined display field, as `[{<name>: key, count}]`
    pub async fn group_count<'e, E>(self, name: &str, executor: E) -> Result<Vec<Value>, DatabaseError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let expr = column_expr(self.schema, name)
            .ok_or_else(|| DatabaseError::QueryError(format!("Cannot group {} by {}", self.schema.table, name)))?;
        let where_result = self.filter.to_where_sql()?;
        let query = format!(
            "SELECT {expr} AS key, COUNT(*) AS count FROM \"{table}\" AS {base} {joins} WHERE {cond} GROUP BY {expr} ORDER BY {expr}",
            expr = expr,
            table = self.schema.table,
            base = BASE,
            joins = join_clauses(self.schema),
            cond = where_result.query,
        );
        let mut q = sqlx::query(&query);
        for p in where_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(executor).await?;
        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            let key: Option<String> = row.try_get("key")?;
            let count: i64 = row.try_get("count")?;
            let mut group = Map::new();
            group.insert(name.to_string(), key.map(Value::String).unwrap_or(Value::Null));
            group.insert("count".to_string(), Value::from(count));
            groups.push(Value::Object(group));
        }
        Ok(groups)
    }

    fn numeric_column(&self, column: &str) -> Result<String, DatabaseError> {
        match self.schema.field(column).map(|f| f.kind) {
            Some(FieldKind::Integer) | Some(FieldKind::Decimal { .. }) => {
                Ok(format!("{}.\"{}\"", BASE, column))
            }
            _ => Err(DatabaseError::QueryError(format!(
                "{}.{} is not a numeric column",
                self.schema.table, column
            ))),
        }
    }
}

/// `json_object(...)` over every stored, joined and counted field of the entity
pub fn projection(schema: &EntitySchema) -> String {
    let mut pairs = vec![format!("'id', {}.\"id\"", BASE)];

    for field in schema.fields {
        let expr = match field.kind {
            FieldKind::Json => format!("json({}.\"{}\")", BASE, field.name),
            FieldKind::RefList { junction, owner_column, target_column, .. } => format!(
                "json((SELECT json_group_array(m.\"{target}\") FROM \"{junction}\" AS m WHERE m.\"{owner}\" = {base}.\"id\"))",
                target = target_column,
                junction = junction,
                owner = owner_column,
                base = BASE,
            ),
            _ => format!("{}.\"{}\"", BASE, field.name),
        };
        pairs.push(format!("'{}', {}", field.name, expr));
    }

    for stamp in schema.stamps.columns() {
        pairs.push(format!("'{}', {}.\"{}\"", stamp, BASE, stamp));
    }

    for (i, join) in schema.joins.iter().enumerate() {
        pairs.push(format!("'{}', {}.\"{}\"", join.name, join_alias(i, join.path.len() - 1), join.column));
    }

    for count in schema.counts {
        pairs.push(format!(
            "'{}', (SELECT COUNT(*) FROM \"{}\" AS c WHERE c.\"{}\" = {}.\"id\")",
            count.name, count.table, count.column, BASE
        ));
    }

    format!("json_object({})", pairs.join(", "))
}

/// LEFT JOINs for every display join, one alias per hop
pub fn join_clauses(schema: &EntitySchema) -> String {
    let mut clauses = Vec::new();
    for (i, join) in schema.joins.iter().enumerate() {
        let mut previous = BASE.to_string();
        for (k, hop) in join.path.iter().enumerate() {
            let alias = join_alias(i, k);
            clauses.push(format!(
                "LEFT JOIN \"{}\" AS {} ON {}.\"id\" = {}.\"{}\"",
                hop.table, alias, alias, previous, hop.column
            ));
            previous = alias;
        }
    }
    clauses.join(" ")
}

/// SQL expression for a stored column or joined display field
pub fn column_expr(schema: &EntitySchema, name: &str) -> Option<String> {
    if schema.has_column(name) {
        return Some(format!("{}.\"{}\"", BASE, name));
    }
    schema
        .joins
        .iter()
        .enumerate()
        .find(|(_, j)| j.name == name)
        .map(|(i, j)| format!("{}.\"{}\"", join_alias(i, j.path.len() - 1), j.column))
}

fn join_alias(join: usize, hop: usize) -> String {
    format!("j{}_{}", join, hop)
}

fn decode_row(schema: &EntitySchema, row: &sqlx::sqlite::SqliteRow) -> Result<Record, DatabaseError> {
    let text: String = row.try_get("row")?;
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| DatabaseError::QueryError(format!("Malformed row from {}: {}", schema.table, e)))?;
    match value {
        Value::Object(map) => Ok(format::to_wire(schema, map)),
        _ => Err(DatabaseError::QueryError(format!("Malformed row from {}", schema.table))),
    }
}

pub(crate) fn bind_param_query<'q>(q: SqliteQuery<'q>, v: &'q Value) -> SqliteQuery<'q> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // JSON columns are stored as text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{courses, deanship, faculty, students};

    #[test]
    fn projection_covers_fields_joins_and_counts() {
        let sql = projection(&students::DEPARTMENT);
        assert!(sql.starts_with("json_object('id', t.\"id\""));
        assert!(sql.contains("'code', t.\"code\""));
        assert!(sql.contains("'student_count', (SELECT COUNT(*) FROM \"students\" AS c WHERE c.\"department\" = t.\"id\")"));
        assert!(sql.contains("'created_at', t.\"created_at\""));
    }

    #[test]
    fn multi_hop_joins_chain_aliases() {
        let joins = join_clauses(&deanship::DECISION);
        assert!(joins.contains("LEFT JOIN \"deans\" AS j0_0 ON j0_0.\"id\" = t.\"dean\""));
        assert!(joins.contains("LEFT JOIN \"faculty\" AS j0_1 ON j0_1.\"id\" = j0_0.\"faculty\""));
        let sql = projection(&deanship::DECISION);
        assert!(sql.contains("'dean_name', j0_1.\"first_name\""));
    }

    #[test]
    fn ref_lists_project_as_json_arrays() {
        let sql = projection(&courses::COURSE);
        assert!(sql.contains("'prerequisites', json((SELECT json_group_array(m.\"prerequisite_id\") FROM \"course_prerequisites\" AS m WHERE m.\"course_id\" = t.\"id\"))"));
    }

    #[test]
    fn column_expr_resolves_joins() {
        assert_eq!(column_expr(&faculty::FACULTY, "position").as_deref(), Some("t.\"position\""));
        assert_eq!(column_expr(&faculty::FACULTY, "department_name").as_deref(), Some("j0_0.\"name\""));
        assert_eq!(column_expr(&faculty::FACULTY, "nope"), None);
    }

    #[test]
    fn select_sql_applies_default_order() {
        let mut builder = QueryBuilder::new(&deanship::DECISION).unwrap();
        let sql = builder.select_sql().unwrap();
        assert!(sql.query.ends_with("ORDER BY t.\"decision_date\" DESC"));
        assert!(sql.query.contains("WHERE 1=1"));
    }
}
