mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{TestApp, PUBLIC_HOST, YPU_HOST};
use serde_json::{json, Value};

async fn tenant_id(app: &TestApp, code: &str) -> Result<String> {
    let res = app.get(PUBLIC_HOST, "/api/tenants").await?;
    let tenants = res.body.as_array().cloned().unwrap_or_default();
    let tenant = tenants
        .iter()
        .find(|t| t["university_code"] == code)
        .ok_or_else(|| anyhow::anyhow!("tenant {} not seeded", code))?;
    Ok(tenant["id"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn seeded_tenants_are_listed_in_name_order() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get(PUBLIC_HOST, "/api/tenants").await?;
    assert_eq!(res.status, StatusCode::OK);
    let names: Vec<&str> = res
        .body
        .as_array()
        .map(|t| t.iter().filter_map(|t| t["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["Amran Islamic University", "Public", "Yemen Public University"]);
    assert_eq!(res.body[0]["is_active"], true);
    Ok(())
}

#[tokio::test]
async fn toggle_status_flips_activity_and_host_resolution() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ypu = tenant_id(&app, "YPU").await?;

    let res = app.action(PUBLIC_HOST, &format!("/api/tenants/{}/toggle_status", ypu)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "success");
    assert_eq!(res.body["is_active"], false);

    let active = app.get(PUBLIC_HOST, "/api/tenants/active_tenants").await?;
    assert!(active.body.as_array().map_or(false, |t| t.iter().all(|t| t["university_code"] != "YPU")));

    let res = app.get(YPU_HOST, "/api/students").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.action(PUBLIC_HOST, &format!("/api/tenants/{}/toggle_status", ypu)).await?;
    assert_eq!(res.body["is_active"], true);
    assert_eq!(app.get(YPU_HOST, "/api/students").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn domains_by_tenant_requires_tenant_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get(PUBLIC_HOST, "/api/domains/by_tenant").await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "tenant_id parameter required");

    let ypu = tenant_id(&app, "YPU").await?;
    let res = app.get(PUBLIC_HOST, &format!("/api/domains/by_tenant?tenant_id={}", ypu)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body[0]["domain"], "ypu.localhost");
    assert_eq!(res.body[0]["tenant_name"], "Yemen Public University");
    Ok(())
}

#[tokio::test]
async fn a_new_primary_domain_demotes_the_old_one() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ypu = tenant_id(&app, "YPU").await?;

    let created = app
        .create(PUBLIC_HOST, "domains", json!({"domain": "YPU.edu.ye", "tenant": ypu}))
        .await?;

    let res = app.get(PUBLIC_HOST, &format!("/api/domains?tenant={}", ypu)).await?;
    let domains = res.body.as_array().cloned().unwrap_or_default();
    let primaries: Vec<&Value> = domains.iter().filter(|d| d["is_primary"] == true).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0]["id"], created.as_str());
    assert_eq!(primaries[0]["domain"], "ypu.edu.ye");

    // Both hosts still route to the tenant
    assert_eq!(app.get("ypu.edu.ye", "/api/departments").await?.status, StatusCode::OK);
    assert_eq!(app.get(YPU_HOST, "/api/departments").await?.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_hosts_and_codes_are_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ypu = tenant_id(&app, "YPU").await?;

    let res = app
        .post(PUBLIC_HOST, "/api/domains", json!({"domain": "aiu.localhost", "tenant": ypu}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(res.body["field_errors"]["domain"].is_string());

    let res = app
        .post(
            PUBLIC_HOST,
            "/api/tenants",
            json!({"name": "Copy", "schema_name": "copy", "university_code": "YPU"}),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["university_code"].is_string());
    Ok(())
}

#[tokio::test]
async fn schema_name_cannot_change() -> Result<()> {
    let app = TestApp::spawn().await?;
    let ypu = tenant_id(&app, "YPU").await?;

    let res = app
        .patch(PUBLIC_HOST, &format!("/api/tenants/{}", ypu), json!({"schema_name": "other"}))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["schema_name"].is_string());

    let res = app
        .patch(PUBLIC_HOST, &format!("/api/tenants/{}", ypu), json!({"description": "Sana'a campus"}))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["description"], "Sana'a campus");
    assert_eq!(res.body["schema_name"], "ypu");
    Ok(())
}

#[tokio::test]
async fn deleting_a_tenant_removes_its_domains() -> Result<()> {
    let app = TestApp::spawn().await?;
    let aiu = tenant_id(&app, "AIU").await?;

    let res = app.delete(PUBLIC_HOST, &format!("/api/tenants/{}", aiu)).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(PUBLIC_HOST, &format!("/api/domains?tenant={}", aiu)).await?;
    assert_eq!(res.body, json!([]));
    assert_eq!(app.get("aiu.localhost", "/api/students").await?.status, StatusCode::NOT_FOUND);
    Ok(())
}
