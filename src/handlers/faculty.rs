use axum::body::Bytes;
use axum::extract::Path;
use serde_json::{json, Value};

use crate::database::models::faculty::{FacultyMembers, Leaves, Qualifications};
use crate::database::schema::now_timestamp;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};

use super::resource::{action_body, related};
use super::{action_success, text_input, RequestContext};

/// GET /api/faculty/{id}/qualifications
pub async fn qualifications(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<FacultyMembers, Qualifications>(&ctx, &id, "faculty").await
}

/// GET /api/faculty/{id}/leaves - most recent application first
pub async fn leaves(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<FacultyMembers, Leaves>(&ctx, &id, "faculty").await
}

/// GET /api/faculty/statistics - across the whole partition
pub async fn statistics(ctx: RequestContext) -> ApiResult<Value> {
    let faculty = ctx.repo::<FacultyMembers>().await?;

    let total_faculty = faculty.count(FilterData::new()).await?;
    let active_faculty = faculty.count(FilterData::new().where_eq("status", "active")).await?;
    let faculty_by_position = faculty.group_count("position", FilterData::new()).await?;
    let faculty_by_department = faculty.group_count("department_name", FilterData::new()).await?;
    let average_experience = faculty.average("experience_years", FilterData::new()).await?;

    Ok(ApiResponse::success(json!({
        "total_faculty": total_faculty,
        "active_faculty": active_faculty,
        "faculty_by_position": faculty_by_position,
        "faculty_by_department": faculty_by_department,
        "average_experience": average_experience,
    })))
}

/// POST /api/leaves/{id}/approve
pub async fn approve_leave(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    decide_leave(&ctx, &id, "approved", None).await?;
    Ok(ApiResponse::success(Value::Object(action_success("Leave approved"))))
}

/// POST /api/leaves/{id}/reject {remarks?}
pub async fn reject_leave(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    decide_leave(&ctx, &id, "rejected", Some(text_input(&body, "remarks"))).await?;
    Ok(ApiResponse::success(Value::Object(action_success("Leave rejected"))))
}

async fn decide_leave(
    ctx: &RequestContext,
    id: &str,
    status: &str,
    remarks: Option<Value>,
) -> Result<(), crate::error::ApiError> {
    let mut changes = vec![
        ("status", json!(status)),
        ("approved_by", json!(ctx.user.user_id.to_string())),
        ("approved_on", json!(now_timestamp())),
    ];
    if let Some(remarks) = remarks {
        changes.push(("remarks", remarks));
    }
    ctx.repo::<Leaves>().await?.set_fields(id, changes).await?;
    Ok(())
}
