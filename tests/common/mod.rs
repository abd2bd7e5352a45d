#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use university_erp_api::app;
use university_erp_api::auth::{generate_jwt, Claims};
use university_erp_api::config::AppConfig;
use university_erp_api::services::TenantService;
use university_erp_api::state::AppState;

/// Registry host (the shared public tenant)
pub const PUBLIC_HOST: &str = "localhost";
/// Tenant host used by most tests
pub const YPU_HOST: &str = "ypu.localhost";
pub const AIU_HOST: &str = "aiu.localhost";

/// In-process application over in-memory partitions, seeded with the default tenants
pub struct TestApp {
    pub state: AppState,
    pub token: String,
    pub user_id: Uuid,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let state = AppState::new(AppConfig::for_tests());
        TenantService::new(state.db.clone())
            .seed(&TenantService::default_seeds())
            .await?;

        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "registrar", 1);
        let token = generate_jwt(&claims, &state.config.security.jwt_secret)?;

        Ok(Self { state, token, user_id })
    }

    pub async fn send(
        &self,
        method: Method,
        host: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri).header(header::HOST, host);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = app::service(self.state.clone()).oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, host: &str, uri: &str) -> Result<TestResponse> {
        self.send(Method::GET, host, uri, None, Some(&self.token)).await
    }

    pub async fn post(&self, host: &str, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, host, uri, Some(body), Some(&self.token)).await
    }

    /// POST without a body, as workflow actions are usually called
    pub async fn action(&self, host: &str, uri: &str) -> Result<TestResponse> {
        self.send(Method::POST, host, uri, None, Some(&self.token)).await
    }

    pub async fn patch(&self, host: &str, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PATCH, host, uri, Some(body), Some(&self.token)).await
    }

    pub async fn put(&self, host: &str, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PUT, host, uri, Some(body), Some(&self.token)).await
    }

    pub async fn delete(&self, host: &str, uri: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, host, uri, None, Some(&self.token)).await
    }

    /// Create a record and return its id, failing loudly on anything but 201
    pub async fn create(&self, host: &str, resource: &str, body: Value) -> Result<String> {
        let res = self.post(host, &format!("/api/{}", resource), body).await?;
        anyhow::ensure!(
            res.status == StatusCode::CREATED,
            "create {} failed with {}: {}",
            resource,
            res.status,
            res.body
        );
        Ok(res.body["id"].as_str().unwrap_or_default().to_string())
    }

    pub async fn department(&self, host: &str, code: &str) -> Result<String> {
        self.create(host, "departments", json!({"name": format!("Department {}", code), "code": code}))
            .await
    }

    pub async fn student(&self, host: &str, department: &str, student_id: &str) -> Result<String> {
        self.create(
            host,
            "students",
            json!({
                "student_id": student_id,
                "department": department,
                "first_name": "Amal",
                "last_name": "Saleh",
                "date_of_birth": "2003-04-12",
                "gender": "female",
                "phone": "+967-1-555000",
                "email": format!("{}@ypu.edu.ye", student_id.to_lowercase()),
                "address": "Sana'a",
                "academic_level": "undergraduate",
                "enrollment_date": "2022-09-01",
                "emergency_contact_name": "Ali Saleh",
                "emergency_contact_phone": "+967-1-555001",
                "emergency_contact_relationship": "father"
            }),
        )
        .await
    }

    pub async fn faculty(&self, host: &str, department: &str, faculty_id: &str) -> Result<String> {
        self.create(
            host,
            "faculty",
            json!({
                "faculty_id": faculty_id,
                "department": department,
                "first_name": "Huda",
                "last_name": "Nasser",
                "date_of_birth": "1980-01-20",
                "gender": "female",
                "phone": "+967-1-555100",
                "email": format!("{}@ypu.edu.ye", faculty_id.to_lowercase()),
                "address": "Aden",
                "position": "professor",
                "hire_date": "2010-09-01",
                "specialization": "Databases",
                "education_qualifications": "PhD Computer Science",
                "experience_years": 14
            }),
        )
        .await
    }

    pub async fn course(&self, host: &str, department: &str, code: &str) -> Result<String> {
        self.create(
            host,
            "courses",
            json!({
                "course_code": code,
                "course_name": format!("Course {}", code),
                "department": department,
                "course_type": "core",
                "credit_hours": 3,
                "contact_hours": 4,
                "description": "Core course"
            }),
        )
        .await
    }

    pub async fn offering(&self, host: &str, course: &str, instructor: &str, max_enrollment: i64) -> Result<String> {
        self.create(
            host,
            "offerings",
            json!({
                "course": course,
                "instructor": instructor,
                "semester": "fall",
                "year": 2024,
                "section": "A",
                "max_enrollment": max_enrollment
            }),
        )
        .await
    }

    pub async fn dean(&self, host: &str, faculty: &str, department: &str) -> Result<String> {
        self.create(
            host,
            "deans",
            json!({"faculty": faculty, "department": department, "appointed_date": "2023-01-01"}),
        )
        .await
    }

    pub async fn budget(&self, host: &str, dean: &str, requested: &str) -> Result<String> {
        self.create(
            host,
            "budgets",
            json!({
                "dean": dean,
                "budget_type": "operational",
                "fiscal_year": "2024-2025",
                "title": "Lab equipment",
                "description": "Replacement of lab machines",
                "requested_amount": requested,
                "justification": "End of life hardware"
            }),
        )
        .await
    }
}
