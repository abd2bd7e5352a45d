use axum::body::Bytes;
use axum::extract::Path;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Value};

use crate::database::models::deanship::{Budgets, Deans, Decisions, Meetings, Reports};
use crate::database::schema::{now_timestamp, parse_decimal};
use crate::error::ApiError;
use crate::filter::{FilterData, FilterOp};
use crate::middleware::{ApiResponse, ApiResult};

use super::resource::{action_body, related};
use super::{action_success, text_input, RequestContext};

/// GET /api/deans/{id}/decisions
pub async fn dean_decisions(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Deans, Decisions>(&ctx, &id, "dean").await
}

/// GET /api/deans/{id}/meetings
pub async fn dean_meetings(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Deans, Meetings>(&ctx, &id, "dean").await
}

/// GET /api/deans/{id}/budgets
pub async fn dean_budgets(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Deans, Budgets>(&ctx, &id, "dean").await
}

/// GET /api/deans/{id}/dashboard
pub async fn dashboard(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    ctx.repo::<Deans>().await?.select_404(&id).await?;
    let by_dean = || FilterData::new().where_eq("dean", id.as_str());

    let decisions = ctx.repo::<Decisions>().await?;
    let total_decisions = decisions.count(by_dean()).await?;
    let pending_decisions = decisions.count(by_dean().where_eq("status", "pending")).await?;

    let upcoming_meetings = ctx
        .repo::<Meetings>()
        .await?
        .count(by_dean().where_op("meeting_date", FilterOp::Gte, json!(now_timestamp())))
        .await?;

    let budgets = ctx.repo::<Budgets>().await?;
    let approved = || by_dean().where_eq("status", "approved");
    let total_budget = budgets.sum("approved_amount", approved()).await?;
    let spent_budget = budgets.sum("spent_amount", approved()).await?;

    Ok(ApiResponse::success(json!({
        "total_decisions": total_decisions,
        "pending_decisions": pending_decisions,
        "upcoming_meetings": upcoming_meetings,
        "total_budget": total_budget.to_f64().unwrap_or(0.0),
        "spent_budget": spent_budget.to_f64().unwrap_or(0.0),
    })))
}

/// POST /api/decisions/{id}/approve
pub async fn approve_decision(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    ctx.repo::<Decisions>()
        .await?
        .set_fields(&id, vec![("status", json!("approved"))])
        .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Decision approved"))))
}

/// POST /api/decisions/{id}/implement
pub async fn implement_decision(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    ctx.repo::<Decisions>()
        .await?
        .set_fields(
            &id,
            vec![
                ("status", json!("implemented")),
                ("implementation_date", json!(now_timestamp())),
            ],
        )
        .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Decision marked as implemented"))))
}

/// POST /api/meetings/{id}/start_meeting
pub async fn start_meeting(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    ctx.repo::<Meetings>()
        .await?
        .set_fields(&id, vec![("status", json!("in_progress"))])
        .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Meeting started"))))
}

/// POST /api/meetings/{id}/complete_meeting {minutes?, action_items?}
pub async fn complete_meeting(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    ctx.repo::<Meetings>()
        .await?
        .set_fields(
            &id,
            vec![
                ("status", json!("completed")),
                ("minutes", text_input(&body, "minutes")),
                ("action_items", text_input(&body, "action_items")),
            ],
        )
        .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Meeting completed"))))
}

/// POST /api/budgets/{id}/approve {approved_amount}
///
/// An absent, empty or zero amount is refused before anything is written.
pub async fn approve_budget(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    let repo = ctx.repo::<Budgets>().await?;
    repo.select_404(&id).await?;

    let amount = body
        .get("approved_amount")
        .filter(|v| amount_given(v))
        .cloned()
        .ok_or_else(|| ApiError::precondition_failed("Approved amount required"))?;

    repo.set_fields(
        &id,
        vec![
            ("approved_amount", amount),
            ("status", json!("approved")),
            ("approved_by", json!(ctx.user.user_id.to_string())),
            ("approved_date", json!(now_timestamp())),
        ],
    )
    .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Budget approved"))))
}

fn amount_given(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) if s.trim().is_empty() => false,
        // Malformed amounts fall through to field validation
        other => parse_decimal(other).map_or(true, |d| !d.is_zero()),
    }
}

/// POST /api/reports/{id}/submit {submitted_to?}
pub async fn submit_report(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    ctx.repo::<Reports>()
        .await?
        .set_fields(
            &id,
            vec![
                ("submitted_to", text_input(&body, "submitted_to")),
                ("submission_date", json!(now_timestamp())),
            ],
        )
        .await?;
    Ok(ApiResponse::success(Value::Object(action_success("Report submitted"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_missing_amounts_are_not_an_approval() {
        assert!(!amount_given(&json!(null)));
        assert!(!amount_given(&json!("")));
        assert!(!amount_given(&json!(0)));
        assert!(!amount_given(&json!("0.00")));
        assert!(amount_given(&json!("700.00")));
        assert!(amount_given(&json!(12.5)));
        assert!(amount_given(&json!("abc")));
    }
}
