// HTTP handlers. `resource` carries the generic five operations; the domain modules add
// named sub-resources and workflow actions.
pub mod context;
pub mod courses;
pub mod deanship;
pub mod faculty;
pub mod resource;
pub mod students;
pub mod tenants;

pub use context::RequestContext;

use serde_json::{json, Map, Value};

/// `{status: "success", message}` body returned by every workflow action
pub(crate) fn action_success(message: &str) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("status".to_string(), json!("success"));
    body.insert("message".to_string(), json!(message));
    body
}

/// Optional string input of an action body, defaulting to empty
pub(crate) fn text_input(body: &Value, key: &str) -> Value {
    match body.get(key) {
        Some(Value::Null) | None => Value::String(String::new()),
        Some(value) => value.clone(),
    }
}
