use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::report_done;
use crate::cli::OutputFormat;
use crate::config::config;

pub fn handle(username: String, user_id: Option<Uuid>, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let user_id = user_id.unwrap_or_else(Uuid::new_v4);
    let claims = Claims::new(user_id, username.clone(), security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => report_done(
            &output_format,
            &format!("Token issued for {}", username),
            Some(json!({
                "token": token,
                "user_id": user_id,
                "expires_at": claims.exp,
            })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
