// Command feedback for `unierp`. JSON output uses the same `status`/`message`/`code`
// vocabulary as the API's action bodies and errors.
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// `✓ message` as text, `{"status": "success", "message", ...details}` as JSON
pub fn report_done(output_format: &OutputFormat, message: &str, details: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(&status_body("success", message, details)),
        OutputFormat::Text => {
            println!("✓ {}", message);
            Ok(())
        }
    }
}

/// Report a failed check and fail the command, so `unierp` exits non-zero.
/// Text output is left to the binary's error line.
pub fn report_failure(output_format: &OutputFormat, message: &str, code: &str) -> anyhow::Result<()> {
    if let OutputFormat::Json = output_format {
        print_json(&status_body("error", message, Some(json!({ "code": code }))))?;
    }
    anyhow::bail!("{}", message)
}

/// `{<collection>: []}` as JSON, the message as text
pub fn report_empty(output_format: &OutputFormat, collection: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(&json!({ collection: [] })),
        OutputFormat::Text => {
            println!("{}", message);
            Ok(())
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status_body(status: &str, message: &str, details: Option<Value>) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), json!(status));
    body.insert("message".to_string(), json!(message));
    if let Some(Value::Object(extra)) = details {
        body.extend(extra);
    }
    Value::Object(body)
}
