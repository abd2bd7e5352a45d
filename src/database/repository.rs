use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{bind_param_query, QueryBuilder};
use crate::database::record::{Record, WriteSet};
use crate::database::schema::{now_timestamp, Entity, EntitySchema, FieldKind};
use crate::filter::FilterData;

/// Data access for one entity within one partition
pub struct Repository {
    schema: &'static EntitySchema,
    pool: SqlitePool,
    max_limit: Option<i64>,
}

impl Repository {
    pub fn new(schema: &'static EntitySchema, pool: SqlitePool) -> Self {
        Self { schema, pool, max_limit: None }
    }

    pub fn of<E: Entity>(pool: SqlitePool) -> Self {
        Self::new(E::schema(), pool)
    }

    /// Upper bound for an explicit `limit`
    pub fn with_max_limit(mut self, max_limit: Option<i64>) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    fn query(&self, filter_data: FilterData) -> Result<QueryBuilder, DatabaseError> {
        QueryBuilder::new(self.schema)?.filter(filter_data, self.max_limit)
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<Record>, DatabaseError> {
        self.query(filter_data)?.select_all(&self.pool).await
    }

    pub async fn select_one(&self, filter_data: FilterData) -> Result<Option<Record>, DatabaseError> {
        self.query(filter_data.limit(1))?.select_optional(&self.pool).await
    }

    pub async fn select_404(&self, id: &str) -> Result<Record, DatabaseError> {
        self.select_one(FilterData::new().where_eq("id", id))
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn count(&self, filter_data: FilterData) -> Result<i64, DatabaseError> {
        self.query(filter_data)?.count(&self.pool).await
    }

    pub async fn average(&self, column: &str, filter_data: FilterData) -> Result<f64, DatabaseError> {
        self.query(filter_data)?.average(column, &self.pool).await
    }

    pub async fn sum(&self, column: &str, filter_data: FilterData) -> Result<Decimal, DatabaseError> {
        self.query(filter_data)?.sum(column, &self.pool).await
    }

    pub async fn group_count(&self, name: &str, filter_data: FilterData) -> Result<Vec<Value>, DatabaseError> {
        self.query(filter_data)?.group_count(name, &self.pool).await
    }

    /// Validate and insert a new row. Identity and timestamps are always server-assigned.
    pub async fn create(&self, input: &Record) -> Result<Record, DatabaseError> {
        let write = input.prepare_create(self.schema)?;
        let id = Uuid::new_v4().to_string();
        let now = now_timestamp();

        let mut tx = self.pool.begin().await?;
        self.check_constraints(&mut tx, &write, None).await?;

        let mut columns: Vec<&str> = vec!["id"];
        let mut values: Vec<Value> = vec![Value::String(id.clone())];
        for (field, value) in &write.columns {
            columns.push(field.name);
            values.push(value.clone());
        }
        for stamp in self.schema.stamps.columns() {
            columns.push(stamp);
            values.push(Value::String(now.clone()));
        }

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.schema.table,
            columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        debug!("Insert into {}: {}", self.schema.table, id);
        let mut q = sqlx::query(&sql);
        for v in &values {
            q = bind_param_query(q, v);
        }
        q.execute(&mut *tx).await.map_err(constraint_error)?;

        self.write_lists(&mut tx, &id, &write).await?;

        if let Some(hook) = self.schema.hook {
            let row = self.fetch_in(&mut tx, &id).await?;
            hook.after_create(&mut tx, row.to_map()).await?;
        }

        tx.commit().await?;
        self.select_404(&id).await
    }

    /// Apply a full (`partial = false`) or partial update from client input
    pub async fn update(&self, id: &str, input: &Record, partial: bool) -> Result<Record, DatabaseError> {
        let existing = self.select_404(id).await?;
        let write = input.prepare_update(self.schema, partial)?;
        self.check_immutable(&existing, &write)?;
        self.apply_update(existing, write).await
    }

    /// Server-side field changes for named actions, bypassing the read-only guard.
    /// All changes land in one UPDATE statement.
    pub async fn set_fields(&self, id: &str, changes: Vec<(&str, Value)>) -> Result<Record, DatabaseError> {
        let existing = self.select_404(id).await?;
        let mut write = WriteSet::default();
        let mut errors = HashMap::new();
        for (name, value) in changes {
            let field = self.schema.field(name).ok_or_else(|| {
                DatabaseError::QueryError(format!("{} has no field {}", self.schema.table, name))
            })?;
            match field.normalize(&value) {
                Ok(normalized) => write.push(field, normalized),
                Err(message) => {
                    errors.insert(name.to_string(), message);
                }
            }
        }
        if !errors.is_empty() {
            return Err(DatabaseError::Validation(errors));
        }
        self.apply_update(existing, write).await
    }

    async fn apply_update(&self, existing: Record, write: WriteSet) -> Result<Record, DatabaseError> {
        let id = existing
            .id()
            .map(str::to_string)
            .ok_or_else(|| DatabaseError::QueryError("Record without id".to_string()))?;

        let mut assignments: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        for (field, value) in &write.columns {
            assignments.push(format!("\"{}\" = ?", field.name));
            values.push(value.clone());
        }
        if let Some(updated) = self.schema.stamps.updated {
            assignments.push(format!("\"{}\" = ?", updated));
            values.push(Value::String(now_timestamp()));
        }
        if assignments.is_empty() && write.lists.is_empty() {
            return Ok(existing);
        }

        let mut tx = self.pool.begin().await?;
        self.check_constraints(&mut tx, &write, Some(&existing)).await?;

        if !assignments.is_empty() {
            let sql = format!(
                "UPDATE \"{}\" SET {} WHERE \"id\" = ?",
                self.schema.table,
                assignments.join(", ")
            );
            values.push(Value::String(id.clone()));
            let mut q = sqlx::query(&sql);
            for v in &values {
                q = bind_param_query(q, v);
            }
            let result = q.execute(&mut *tx).await.map_err(constraint_error)?;
            if result.rows_affected() == 0 {
                return Err(self.not_found(&id));
            }
        }

        self.write_lists(&mut tx, &id, &write).await?;

        if let Some(hook) = self.schema.hook {
            let row = self.fetch_in(&mut tx, &id).await?;
            hook.after_update(&mut tx, existing.to_map(), row.to_map()).await?;
        }

        tx.commit().await?;
        self.select_404(&id).await
    }

    /// Delete one row; dependents follow their foreign-key policy
    pub async fn delete(&self, id: &str) -> Result<Record, DatabaseError> {
        let existing = self.select_404(id).await?;

        let mut tx = self.pool.begin().await?;
        if let Some(hook) = self.schema.hook {
            hook.before_delete(&mut tx, existing.to_map()).await?;
        }
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = ?", self.schema.table);
        let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(self.not_found(id));
        }
        tx.commit().await?;

        debug!("Deleted {} {}", self.schema.name, id);
        Ok(existing)
    }

    async fn fetch_in(&self, conn: &mut SqliteConnection, id: &str) -> Result<Record, DatabaseError> {
        QueryBuilder::new(self.schema)?
            .filter(FilterData::new().where_eq("id", id), None)?
            .select_optional(&mut *conn)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    async fn write_lists(&self, conn: &mut SqliteConnection, id: &str, write: &WriteSet) -> Result<(), DatabaseError> {
        for (field, ids) in &write.lists {
            let FieldKind::RefList { junction, owner_column, target_column, .. } = field.kind else {
                continue;
            };
            sqlx::query(&format!("DELETE FROM \"{}\" WHERE \"{}\" = ?", junction, owner_column))
                .bind(id)
                .execute(&mut *conn)
                .await?;
            let insert = format!(
                "INSERT INTO \"{}\" (\"{}\", \"{}\") VALUES (?, ?)",
                junction, owner_column, target_column
            );
            for target in ids {
                sqlx::query(&insert)
                    .bind(id)
                    .bind(target)
                    .execute(&mut *conn)
                    .await
                    .map_err(constraint_error)?;
            }
        }
        Ok(())
    }

    /// Foreign keys must resolve and unique values must stay unique. Every problem is
    /// reported at once, keyed by field.
    async fn check_constraints(
        &self,
        conn: &mut SqliteConnection,
        write: &WriteSet,
        existing: Option<&Record>,
    ) -> Result<(), DatabaseError> {
        let mut errors: HashMap<String, String> = HashMap::new();
        let exclude_id = existing.and_then(Record::id);

        for (field, value) in &write.columns {
            let Some(text) = value.as_str() else {
                continue;
            };
            if let FieldKind::Ref { table, .. } = field.kind {
                if !row_exists(conn, table, text).await? {
                    errors.insert(field.name.to_string(), missing_reference(text));
                    continue;
                }
            }
            if field.unique && self.value_taken(conn, &[(field.name, value)], exclude_id).await? {
                errors.insert(
                    field.name.to_string(),
                    format!("{} with this {} already exists.", self.schema.name, field.name.replace('_', " ")),
                );
            }
        }

        for (field, ids) in &write.lists {
            let FieldKind::RefList { table, .. } = field.kind else {
                continue;
            };
            for target in ids {
                if !row_exists(conn, table, target).await? {
                    errors.insert(field.name.to_string(), missing_reference(target));
                    break;
                }
            }
        }

        for group in self.schema.unique_together {
            let touched = group.iter().any(|c| write.value(c).is_some());
            if !touched {
                continue;
            }
            let mut pairs = Vec::with_capacity(group.len());
            for column in group.iter() {
                match write.value(column).or_else(|| existing.and_then(|r| r.get(column))) {
                    Some(value) if !value.is_null() => pairs.push((*column, value)),
                    _ => break,
                }
            }
            if pairs.len() == group.len() && self.value_taken(conn, &pairs, exclude_id).await? {
                errors.insert(
                    "non_field_errors".to_string(),
                    format!("The fields {} must make a unique set.", group.join(", ")),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DatabaseError::Validation(errors))
        }
    }

    async fn value_taken(
        &self,
        conn: &mut SqliteConnection,
        pairs: &[(&str, &Value)],
        exclude_id: Option<&str>,
    ) -> Result<bool, DatabaseError> {
        let mut conditions: Vec<String> = pairs.iter().map(|(c, _)| format!("\"{}\" = ?", c)).collect();
        if exclude_id.is_some() {
            conditions.push("\"id\" <> ?".to_string());
        }
        let sql = format!(
            "SELECT 1 FROM \"{}\" WHERE {} LIMIT 1",
            self.schema.table,
            conditions.join(" AND ")
        );
        let mut q = sqlx::query(&sql);
        for (_, value) in pairs {
            q = bind_param_query(q, value);
        }
        if let Some(id) = exclude_id {
            q = q.bind(id);
        }
        Ok(q.fetch_optional(&mut *conn).await?.is_some())
    }

    fn check_immutable(&self, existing: &Record, write: &WriteSet) -> Result<(), DatabaseError> {
        let mut errors = HashMap::new();
        for (field, value) in &write.columns {
            if field.immutable && existing.get(field.name) != Some(value) {
                errors.insert(field.name.to_string(), "This field cannot be changed once set.".to_string());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DatabaseError::Validation(errors))
        }
    }

    fn not_found(&self, id: &str) -> DatabaseError {
        DatabaseError::NotFound(format!("No {} matches id '{}'", self.schema.name, id))
    }
}

async fn row_exists(conn: &mut SqliteConnection, table: &str, id: &str) -> Result<bool, DatabaseError> {
    let sql = format!("SELECT 1 FROM \"{}\" WHERE \"id\" = ?", table);
    Ok(sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?.is_some())
}

fn missing_reference(id: &str) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

/// Constraint violations that slipped past the pre-checks (e.g. a concurrent writer)
fn constraint_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return DatabaseError::field("non_field_errors", "A record with these values already exists.");
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return DatabaseError::field("non_field_errors", "Referenced object does not exist.");
            }
            _ => {}
        }
    }
    DatabaseError::Sqlx(err)
}
