// Registry entities: universities and the host names that route to them
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqliteConnection;

use super::entity;
use crate::database::manager::DatabaseError;
use crate::database::schema::{
    EntitySchema, FieldDef, FilterDef, Hop, JoinDef, OrderDef, Partition, Stamps, WriteHook,
};

pub const UNIVERSITY_TYPES: &[&str] = &["public", "private", "technical", "medical", "arts"];

pub static TENANT: EntitySchema = EntitySchema {
    name: "tenant",
    table: "tenants",
    partition: Partition::Registry,
    fields: &[
        FieldDef::text("name", 100),
        FieldDef::long_text("description").blank(),
        FieldDef::slug("schema_name", 63).unique().immutable(),
        FieldDef::text("university_code", 20).unique().immutable(),
        FieldDef::choice("university_type", UNIVERSITY_TYPES).default_str("public"),
        FieldDef::boolean("is_active").default_bool(true),
    ],
    stamps: Stamps { created: Some("created_on"), updated: Some("updated_on") },
    unique_together: &[],
    joins: &[],
    counts: &[],
    filters: &[FilterDef::exact("university_type"), FilterDef::boolean("is_active")],
    order: &[OrderDef::asc("name")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static DOMAIN: EntitySchema = EntitySchema {
    name: "domain",
    table: "domains",
    partition: Partition::Registry,
    fields: &[
        FieldDef::host("domain").unique(),
        FieldDef::owner("tenant", "tenants"),
        FieldDef::boolean("is_primary").default_bool(true),
    ],
    stamps: Stamps { created: None, updated: None },
    unique_together: &[],
    joins: &[JoinDef {
        name: "tenant_name",
        path: &[Hop { column: "tenant", table: "tenants" }],
        column: "name",
    }],
    counts: &[],
    filters: &[FilterDef::exact("tenant"), FilterDef::boolean("is_primary")],
    order: &[OrderDef::asc("domain")],
    computed: None,
    hook: Some(&PrimaryDomainHook),
    triggers: &[],
};

entity!(Tenants, TENANT);
entity!(Domains, DOMAIN);

/// Keeps at most one primary domain per tenant: saving a primary domain demotes the others
pub struct PrimaryDomainHook;

impl PrimaryDomainHook {
    async fn demote_others(conn: &mut SqliteConnection, row: &Map<String, Value>) -> Result<(), DatabaseError> {
        if row.get("is_primary") != Some(&Value::Bool(true)) {
            return Ok(());
        }
        let (Some(id), Some(tenant)) = (
            row.get("id").and_then(Value::as_str),
            row.get("tenant").and_then(Value::as_str),
        ) else {
            return Ok(());
        };
        sqlx::query("UPDATE \"domains\" SET \"is_primary\" = 0 WHERE \"tenant\" = ? AND \"id\" <> ? AND \"is_primary\" = 1")
            .bind(tenant)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WriteHook for PrimaryDomainHook {
    async fn after_create(&self, conn: &mut SqliteConnection, row: &Map<String, Value>) -> Result<(), DatabaseError> {
        Self::demote_others(conn, row).await
    }

    async fn after_update(
        &self,
        conn: &mut SqliteConnection,
        _before: &Map<String, Value>,
        after: &Map<String, Value>,
    ) -> Result<(), DatabaseError> {
        Self::demote_others(conn, after).await
    }
}
