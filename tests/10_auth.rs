mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{TestApp, PUBLIC_HOST, YPU_HOST};
use serde_json::json;
use university_erp_api::auth::{generate_jwt, Claims};
use uuid::Uuid;

#[tokio::test]
async fn root_and_health_are_anonymous() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.send(Method::GET, PUBLIC_HOST, "/", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "University ERP API");

    let res = app.send(Method::GET, "nowhere.example", "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK, "health: {}", res.body);
    assert_eq!(res.body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.send(Method::GET, YPU_HOST, "/api/students", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    assert!(res.body["error"].is_string());

    let res = app.send(Method::GET, PUBLIC_HOST, "/api/tenants", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let claims = Claims::new(Uuid::new_v4(), "intruder", 1);
    let forged = generate_jwt(&claims, "not-the-secret")?;

    let res = app
        .send(Method::GET, YPU_HOST, "/api/students", None, Some(&forged))
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_host_is_not_found() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("unknown.localhost:8000", "/api/students").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "No tenant for host 'unknown.localhost'");
    Ok(())
}

#[tokio::test]
async fn caller_is_registered_in_the_partition() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get(YPU_HOST, "/api/users?username=registrar").await?;
    assert_eq!(res.status, StatusCode::OK);
    let users = res.body.as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], app.user_id.to_string());
    Ok(())
}

#[tokio::test]
async fn a_reissued_token_acts_as_the_existing_user() -> Result<()> {
    let app = TestApp::spawn().await?;
    let department = app.department(YPU_HOST, "CS").await?;
    let faculty = app.faculty(YPU_HOST, &department, "F-1").await?;
    let dean = app.dean(YPU_HOST, &faculty, &department).await?;
    let budget = app.budget(YPU_HOST, &dean, "1000").await?;

    let reissued = generate_jwt(
        &Claims::new(Uuid::new_v4(), "registrar", 1),
        &app.state.config.security.jwt_secret,
    )?;
    let res = app
        .send(
            Method::POST,
            YPU_HOST,
            &format!("/api/budgets/{}/approve", budget),
            Some(json!({"approved_amount": "900"})),
            Some(&reissued),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK, "approve: {}", res.body);

    let res = app.get(YPU_HOST, &format!("/api/budgets/{}", budget)).await?;
    assert_eq!(res.body["approved_by"], app.user_id.to_string());

    let res = app.get(YPU_HOST, "/api/users?username=registrar").await?;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn a_token_for_a_created_user_acts_as_that_row() -> Result<()> {
    let app = TestApp::spawn().await?;
    let clerk = app
        .create(YPU_HOST, "users", json!({"username": "clerk", "email": "clerk@ypu.edu.ye"}))
        .await?;
    let department = app.department(YPU_HOST, "CS").await?;
    let faculty = app.faculty(YPU_HOST, &department, "F-1").await?;
    let leave = app
        .create(
            YPU_HOST,
            "leaves",
            json!({
                "faculty": faculty,
                "leave_type": "sick",
                "start_date": "2024-03-01",
                "end_date": "2024-03-03",
                "reason": "Flu"
            }),
        )
        .await?;

    let token = generate_jwt(
        &Claims::new(Uuid::new_v4(), "clerk", 1),
        &app.state.config.security.jwt_secret,
    )?;
    let res = app
        .send(Method::POST, YPU_HOST, &format!("/api/leaves/{}/approve", leave), None, Some(&token))
        .await?;
    assert_eq!(res.status, StatusCode::OK, "approve: {}", res.body);

    let res = app.get(YPU_HOST, &format!("/api/leaves/{}", leave)).await?;
    assert_eq!(res.body["approved_by"], clerk);
    assert_eq!(res.body["approved_by_name"], "clerk");
    Ok(())
}
