use axum::body::Bytes;
use axum::extract::Path;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::models::courses::{
    Assignments, Courses, Enrollments, Offerings, StudentAssignments,
};
use crate::database::schema::now_timestamp;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::resource::{action_body, related};
use super::{action_success, text_input, RequestContext};

/// GET /api/courses/{id}/offerings
pub async fn course_offerings(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Courses, Offerings>(&ctx, &id, "course").await
}

/// GET /api/offerings/{id}/enrollments
pub async fn offering_enrollments(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Offerings, Enrollments>(&ctx, &id, "course_offering").await
}

/// GET /api/offerings/{id}/assignments
pub async fn offering_assignments(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Offerings, Assignments>(&ctx, &id, "course_offering").await
}

/// GET /api/assignments/{id}/submissions
pub async fn assignment_submissions(ctx: RequestContext, Path(id): Path<String>) -> ApiResult<Value> {
    related::<Assignments, StudentAssignments>(&ctx, &id, "assignment").await
}

/// POST /api/enrollments/{id}/grade {final_grade, grade_points?}
///
/// Closes the enrollment: records the final grade and sets status `completed`. No grader is
/// recorded; per-submission grading lives on `student-assignments/{id}/grade`.
pub async fn grade_enrollment(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    let final_grade = body
        .get("final_grade")
        .filter(|v| v.as_str().map_or(!v.is_null(), |s| !s.trim().is_empty()))
        .cloned()
        .ok_or_else(|| required("final_grade", "Final grade required"))?;

    let mut changes = vec![("final_grade", final_grade), ("status", json!("completed"))];
    if let Some(points) = body.get("grade_points").filter(|v| !v.is_null()) {
        changes.push(("grade_points", points.clone()));
    }
    ctx.repo::<Enrollments>().await?.set_fields(&id, changes).await?;

    Ok(ApiResponse::success(Value::Object(action_success("Enrollment graded"))))
}

/// POST /api/student-assignments/{id}/grade {marks_obtained, feedback?}
///
/// Marks, feedback, status, grader and timestamp land in a single UPDATE so a reader never
/// sees a half-graded submission.
pub async fn grade_submission(ctx: RequestContext, Path(id): Path<String>, body: Bytes) -> ApiResult<Value> {
    let body = action_body(&body)?;
    let marks = body
        .get("marks_obtained")
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or_else(|| required("marks_obtained", "Marks required"))?;

    ctx.repo::<StudentAssignments>()
        .await?
        .set_fields(
            &id,
            vec![
                ("marks_obtained", marks),
                ("feedback", text_input(&body, "feedback")),
                ("status", json!("graded")),
                ("graded_by", json!(ctx.user.user_id.to_string())),
                ("graded_on", json!(now_timestamp())),
            ],
        )
        .await?;

    Ok(ApiResponse::success(Value::Object(action_success("Assignment graded"))))
}

fn required(field: &str, message: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert(field.to_string(), "This field is required.".to_string());
    ApiError::validation_error(message, Some(field_errors))
}
