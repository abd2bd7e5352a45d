mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, YPU_HOST};
use serde_json::{json, Value};

struct Office {
    dean: String,
}

async fn office(app: &TestApp) -> Result<Office> {
    let department = app.department(YPU_HOST, "CS").await?;
    let faculty = app.faculty(YPU_HOST, &department, "F-1").await?;
    let dean = app.dean(YPU_HOST, &faculty, &department).await?;
    Ok(Office { dean })
}

async fn meeting(app: &TestApp, dean: &str, when: &str, attendees: Value) -> Result<String> {
    app.create(
        YPU_HOST,
        "meetings",
        json!({
            "dean": dean,
            "meeting_type": "academic_council",
            "title": "Council",
            "description": "Term planning",
            "meeting_date": when,
            "location": "Hall B",
            "agenda": "Timetable",
            "attendees": attendees
        }),
    )
    .await
}

#[tokio::test]
async fn dean_joins_through_faculty_and_department() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;

    let res = app.get(YPU_HOST, &format!("/api/deans/{}", o.dean)).await?;
    assert_eq!(res.body["faculty_name"], "Huda");
    assert_eq!(res.body["department_name"], "Department CS");
    assert_eq!(res.body["status"], "active");

    let budget = app.budget(YPU_HOST, &o.dean, "1000").await?;
    let res = app.get(YPU_HOST, &format!("/api/budgets/{}", budget)).await?;
    assert_eq!(res.body["dean_name"], "Huda");
    assert_eq!(res.body["requested_amount"], "1000.00");
    assert_eq!(res.body["spent_amount"], "0.00");
    assert_eq!(res.body["remaining_amount"], "0.00");
    assert_eq!(res.body["status"], "draft");
    Ok(())
}

#[tokio::test]
async fn budget_approval_needs_an_amount() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;
    let budget = app.budget(YPU_HOST, &o.dean, "1500.00").await?;
    let uri = format!("/api/budgets/{}/approve", budget);

    for body in [json!({}), json!({"approved_amount": ""}), json!({"approved_amount": 0})] {
        let res = app.post(YPU_HOST, &uri, body).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Approved amount required");
    }
    let res = app.get(YPU_HOST, &format!("/api/budgets/{}", budget)).await?;
    assert_eq!(res.body["status"], "draft");
    assert!(res.body["approved_amount"].is_null());

    let res = app.post(YPU_HOST, &uri, json!({"approved_amount": "1000"})).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Budget approved");

    app.patch(YPU_HOST, &format!("/api/budgets/{}", budget), json!({"spent_amount": "300.00"}))
        .await?;
    let res = app.get(YPU_HOST, &format!("/api/budgets/{}", budget)).await?;
    assert_eq!(res.body["status"], "approved");
    assert_eq!(res.body["approved_amount"], "1000.00");
    assert_eq!(res.body["remaining_amount"], "700.00");
    assert_eq!(res.body["approved_by"], app.user_id.to_string());
    assert_eq!(res.body["approved_by_name"], "registrar");
    assert!(res.body["approved_date"].is_string());

    let res = app
        .post(YPU_HOST, &format!("/api/budgets/{}/approve", uuid::Uuid::new_v4()), json!({"approved_amount": 5}))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn removing_a_user_clears_their_approvals() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;
    let budget = app.budget(YPU_HOST, &o.dean, "1000").await?;
    app.post(YPU_HOST, &format!("/api/budgets/{}/approve", budget), json!({"approved_amount": 800}))
        .await?;

    let res = app.delete(YPU_HOST, &format!("/api/users/{}", app.user_id)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(YPU_HOST, &format!("/api/budgets/{}", budget)).await?;
    assert!(res.body["approved_by"].is_null());
    assert!(res.body["approved_by_name"].is_null());
    assert_eq!(res.body["approved_amount"], "800.00");
    Ok(())
}

#[tokio::test]
async fn dashboard_summarises_the_office() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;

    for title in ["Curriculum review", "Lab hours"] {
        app.create(
            YPU_HOST,
            "decisions",
            json!({
                "dean": o.dean,
                "decision_type": "academic",
                "title": title,
                "description": "Adopted by council",
                "decision_date": "2024-05-01T10:00:00Z"
            }),
        )
        .await?;
    }
    meeting(&app, &o.dean, "2099-01-10T09:00:00Z", json!([])).await?;
    meeting(&app, &o.dean, "2001-01-10T09:00:00Z", json!([])).await?;

    let approved = app.budget(YPU_HOST, &o.dean, "2000").await?;
    app.post(YPU_HOST, &format!("/api/budgets/{}/approve", approved), json!({"approved_amount": "1200.50"}))
        .await?;
    app.patch(YPU_HOST, &format!("/api/budgets/{}", approved), json!({"spent_amount": 200}))
        .await?;
    app.budget(YPU_HOST, &o.dean, "999").await?;

    let res = app.get(YPU_HOST, &format!("/api/deans/{}/dashboard", o.dean)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({
            "total_decisions": 2,
            "pending_decisions": 2,
            "upcoming_meetings": 1,
            "total_budget": 1200.5,
            "spent_budget": 200.0
        })
    );

    let res = app.get(YPU_HOST, &format!("/api/deans/{}/budgets", o.dean)).await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(2));

    let res = app.get(YPU_HOST, &format!("/api/deans/{}/dashboard", uuid::Uuid::new_v4())).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn decisions_move_through_approval_and_implementation() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;
    let decision = app
        .create(
            YPU_HOST,
            "decisions",
            json!({
                "dean": o.dean,
                "decision_type": "budget",
                "title": "New lab",
                "description": "Fund a second lab",
                "decision_date": "2024-05-01T10:00:00Z",
                "budget_impact": "25000"
            }),
        )
        .await?;

    let res = app.action(YPU_HOST, &format!("/api/decisions/{}/approve", decision)).await?;
    assert_eq!(res.body, json!({"status": "success", "message": "Decision approved"}));
    let res = app.get(YPU_HOST, &format!("/api/decisions/{}", decision)).await?;
    assert_eq!(res.body["status"], "approved");
    assert!(res.body["implementation_date"].is_null());

    app.action(YPU_HOST, &format!("/api/decisions/{}/implement", decision)).await?;
    let res = app.get(YPU_HOST, &format!("/api/decisions/{}", decision)).await?;
    assert_eq!(res.body["status"], "implemented");
    assert!(res.body["implementation_date"].is_string());
    assert_eq!(res.body["budget_impact"], "25000.00");

    let res = app.get(YPU_HOST, "/api/decisions?status=implemented").await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn meetings_start_and_complete_with_minutes() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;
    let secretary = app
        .create(YPU_HOST, "users", json!({"username": "secretary", "email": "sec@ypu.edu.ye"}))
        .await?;
    let caller = app.user_id.to_string();
    let id = meeting(&app, &o.dean, "2099-01-10T09:00:00Z", json!([caller, secretary])).await?;

    let res = app.get(YPU_HOST, &format!("/api/meetings/{}", id)).await?;
    let attendees = res.body["attendees"].as_array().cloned().unwrap_or_default();
    assert_eq!(attendees.len(), 2);
    assert!(attendees.contains(&json!(secretary)));
    assert!(attendees.contains(&json!(caller)));

    app.action(YPU_HOST, &format!("/api/meetings/{}/start_meeting", id)).await?;
    let res = app.get(YPU_HOST, &format!("/api/meetings/{}", id)).await?;
    assert_eq!(res.body["status"], "in_progress");

    let res = app
        .post(YPU_HOST, &format!("/api/meetings/{}/complete_meeting", id), json!({"minutes": "Timetable agreed"}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get(YPU_HOST, &format!("/api/meetings/{}", id)).await?;
    assert_eq!(res.body["status"], "completed");
    assert_eq!(res.body["minutes"], "Timetable agreed");
    assert_eq!(res.body["action_items"], "");

    let res = app.delete(YPU_HOST, &format!("/api/users/{}", secretary)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = app.get(YPU_HOST, &format!("/api/meetings/{}", id)).await?;
    assert_eq!(res.body["attendees"], json!([caller]));
    Ok(())
}

#[tokio::test]
async fn reports_keep_structured_statistics() -> Result<()> {
    let app = TestApp::spawn().await?;
    let o = office(&app).await?;
    let statistics = json!({"graduates": 120, "retention": 0.91, "by_level": {"phd": 4}});
    let report = app
        .create(
            YPU_HOST,
            "reports",
            json!({
                "dean": o.dean,
                "report_type": "annual",
                "title": "Annual report",
                "report_period": "2023-2024",
                "content": "Summary of the year",
                "statistics": statistics
            }),
        )
        .await?;

    let res = app.get(YPU_HOST, &format!("/api/reports/{}", report)).await?;
    assert_eq!(res.body["statistics"], statistics);
    assert!(res.body["submission_date"].is_null());

    let res = app
        .post(YPU_HOST, &format!("/api/reports/{}/submit", report), json!({"submitted_to": "University Council"}))
        .await?;
    assert_eq!(res.body["message"], "Report submitted");

    let res = app.get(YPU_HOST, &format!("/api/reports/{}", report)).await?;
    assert_eq!(res.body["submitted_to"], "University Council");
    assert!(res.body["submission_date"].is_string());
    Ok(())
}

#[tokio::test]
async fn a_faculty_member_heads_one_office() -> Result<()> {
    let app = TestApp::spawn().await?;
    let department = app.department(YPU_HOST, "CS").await?;
    let faculty = app.faculty(YPU_HOST, &department, "F-1").await?;
    app.dean(YPU_HOST, &faculty, &department).await?;

    let res = app
        .post(YPU_HOST, "/api/deans", json!({"faculty": faculty, "department": department, "appointed_date": "2024-01-01"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field_errors"]["faculty"], "dean with this faculty already exists.");
    Ok(())
}
