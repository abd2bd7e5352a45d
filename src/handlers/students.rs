use axum::body::Bytes;
use axum::extract::Path;
use serde_json::{json, Value};

use crate::database::models::students::{AcademicRecords, Departments, Students, STUDENT_STATUSES};
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult};

use super::resource::{action_body, related};
use super::{action_success, RequestContext};

/// GET /api/departments/{id}/students
pub async fn department_students(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Departments, Students>(&ctx, &id, "department").await
}

/// GET /api/departments/{id}/statistics
pub async fn department_statistics(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    ctx.repo::<Departments>().await?.select_404(&id).await?;

    let students = ctx.repo::<Students>().await?;
    let in_department = || FilterData::new().where_eq("department", id.as_str());

    let total_students = students.count(in_department()).await?;
    let active_students = students.count(in_department().where_eq("status", "active")).await?;
    let average_gpa = students.average("gpa", in_department()).await?;
    let students_by_level = students.group_count("academic_level", in_department()).await?;

    Ok(ApiResponse::success(json!({
        "total_students": total_students,
        "active_students": active_students,
        "average_gpa": average_gpa,
        "students_by_level": students_by_level,
    })))
}

/// GET /api/students/{id}/academic_records - newest term first
pub async fn academic_records(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Students, AcademicRecords>(&ctx, &id, "student").await
}

/// POST /api/students/{id}/update_status {status}
pub async fn update_status(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    let new_status = body
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| STUDENT_STATUSES.contains(s))
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?
        .to_string();

    ctx.repo::<Students>()
        .await?
        .set_fields(&id, vec![("status", json!(new_status))])
        .await?;

    let mut response = action_success("Student status updated");
    response.insert("new_status".to_string(), json!(new_status));
    Ok(ApiResponse::success(Value::Object(response)))
}
