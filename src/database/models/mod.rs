//! Entity catalogue. One module per domain; every entity is a static [`EntitySchema`]
//! plus a marker type used to route generic handlers.

pub mod courses;
pub mod deanship;
pub mod faculty;
pub mod students;
pub mod tenancy;
pub mod users;

use crate::database::schema::EntitySchema;

/// Registry tables, in creation order
pub static REGISTRY_SCHEMAS: &[&EntitySchema] = &[&tenancy::TENANT, &tenancy::DOMAIN];

/// Tenant partition tables, in creation order
pub static TENANT_SCHEMAS: &[&EntitySchema] = &[
    &users::USER,
    &students::DEPARTMENT,
    &students::STUDENT,
    &students::ACADEMIC_RECORD,
    &faculty::FACULTY,
    &faculty::QUALIFICATION,
    &faculty::LEAVE,
    &courses::COURSE,
    &courses::OFFERING,
    &courses::ENROLLMENT,
    &courses::ASSIGNMENT,
    &courses::STUDENT_ASSIGNMENT,
    &deanship::DEAN,
    &deanship::DECISION,
    &deanship::MEETING,
    &deanship::BUDGET,
    &deanship::REPORT,
];

macro_rules! entity {
    ($marker:ident, $schema:path) => {
        pub struct $marker;

        impl $crate::database::schema::Entity for $marker {
            fn schema() -> &'static $crate::database::schema::EntitySchema {
                &$schema
            }
        }
    };
}
pub(crate) use entity;

/// Every entity definition, registry first
pub fn all_schemas() -> impl Iterator<Item = &'static EntitySchema> {
    REGISTRY_SCHEMAS.iter().chain(TENANT_SCHEMAS.iter()).copied()
}
