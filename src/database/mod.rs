pub mod manager;
pub mod migrations;
pub mod models;
pub mod query_builder;
pub mod record;
pub mod repository;
pub mod schema;

pub use manager::{DatabaseError, DatabaseManager};
pub use record::{Record, RecordError};
pub use repository::Repository;
pub use schema::{Entity, EntitySchema};
