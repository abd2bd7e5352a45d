// Table provisioning: CREATE TABLE statements generated from entity definitions
use sqlx::SqlitePool;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models;
use crate::database::schema::{DefaultValue, EntitySchema, FieldDef, FieldKind, OnDelete, Presence};

/// Create the registry tables (tenants, domains) if they are missing
pub async fn create_registry_tables(pool: &SqlitePool) -> Result<(), DatabaseError> {
    execute_all(pool, models::REGISTRY_SCHEMAS).await
}

/// Create every tenant partition table if it is missing
pub async fn create_tenant_tables(pool: &SqlitePool) -> Result<(), DatabaseError> {
    execute_all(pool, models::TENANT_SCHEMAS).await
}

async fn execute_all(pool: &SqlitePool, schemas: &[&EntitySchema]) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for schema in schemas {
        for statement in table_ddl(schema) {
            debug!("DDL: {}", statement);
            sqlx::query(&statement).execute(&mut *tx).await.map_err(|e| {
                DatabaseError::QueryError(format!("Failed to create table {}: {}", schema.table, e))
            })?;
        }
    }
    tx.commit().await?;
    Ok(())
}

/// All statements needed for one entity: its table, junction tables, foreign-key indexes
/// and triggers
pub fn table_ddl(schema: &EntitySchema) -> Vec<String> {
    let mut statements = Vec::new();

    let mut columns = vec!["    \"id\" TEXT PRIMARY KEY NOT NULL".to_string()];
    for field in schema.column_fields() {
        columns.push(format!("    {}", column_ddl(field)));
    }
    for stamp in schema.stamps.columns() {
        columns.push(format!("    \"{}\" TEXT NOT NULL", stamp));
    }
    for group in schema.unique_together {
        let list = group.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ");
        columns.push(format!("    UNIQUE ({})", list));
    }

    statements.push(format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n)",
        schema.table,
        columns.join(",\n")
    ));

    for field in schema.column_fields() {
        if let FieldKind::Ref { .. } = field.kind {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS \"idx_{table}_{column}\" ON \"{table}\" (\"{column}\")",
                table = schema.table,
                column = field.name
            ));
        }
    }

    for field in schema.list_fields() {
        if let FieldKind::RefList { table, junction, owner_column, target_column } = field.kind {
            statements.push(format!(
                "CREATE TABLE IF NOT EXISTS \"{junction}\" (\n    \"{owner_column}\" TEXT NOT NULL REFERENCES \"{owner}\" (\"id\") ON DELETE CASCADE,\n    \"{target_column}\" TEXT NOT NULL REFERENCES \"{table}\" (\"id\") ON DELETE CASCADE,\n    PRIMARY KEY (\"{owner_column}\", \"{target_column}\")\n)",
                owner = schema.table,
            ));
        }
    }

    statements.extend(schema.triggers.iter().map(|t| t.to_string()));
    statements
}

fn column_ddl(field: &FieldDef) -> String {
    let sql_type = match field.kind {
        FieldKind::Integer | FieldKind::Bool => "INTEGER",
        _ => "TEXT",
    };

    let mut ddl = format!("\"{}\" {}", field.name, sql_type);
    if field.presence != Presence::Nullable {
        ddl += " NOT NULL";
    }
    if field.unique {
        ddl += " UNIQUE";
    }

    match field.presence {
        Presence::Blank => ddl += " DEFAULT ''",
        Presence::Default(default) => ddl += &format!(" DEFAULT {}", default_sql(default)),
        _ => {}
    }

    if let FieldKind::Ref { table, on_delete } = field.kind {
        let action = match on_delete {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
        };
        ddl += &format!(" REFERENCES \"{}\" (\"id\") ON DELETE {}", table, action);
    }

    ddl
}

fn default_sql(default: DefaultValue) -> String {
    match default {
        DefaultValue::Str(s) | DefaultValue::Decimal(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Int(i) => i.to_string(),
        DefaultValue::Bool(b) => if b { "1" } else { "0" }.to_string(),
        DefaultValue::EmptyObject => "'{}'".to_string(),
    }
}
