use super::entity;
use crate::database::schema::{EntitySchema, FieldDef, FilterDef, OrderDef, Partition, Stamps};

/// Partition-local account rows. Callers are materialised here on first request so that
/// `graded_by`, `approved_by` and meeting attendees can reference them.
pub static USER: EntitySchema = EntitySchema {
    name: "user",
    table: "users",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::text("username", 150).unique(),
        FieldDef::email("email").blank(),
        FieldDef::text("first_name", 150).blank(),
        FieldDef::text("last_name", 150).blank(),
    ],
    stamps: Stamps::CREATED_ONLY,
    unique_together: &[],
    joins: &[],
    counts: &[],
    filters: &[FilterDef::exact("username")],
    order: &[OrderDef::asc("username")],
    computed: None,
    hook: None,
    triggers: &[],
};

entity!(Users, USER);
