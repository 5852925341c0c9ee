#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use machinatrack_api::{create_app, AppState};
use machinatrack_config::AppConfig;
use machinatrack_domain::FixedClock;
use machinatrack_infrastructure::DatabaseManager;
use machinatrack_testing_utils::clock_on;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use tower::ServiceExt;

pub const ROLE_HEADER: &str = "x-machinatrack-role";
pub const USER_HEADER: &str = "x-machinatrack-user";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseManager,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    /// 内存数据库 + 固定在 2024-01-02 的时钟
    pub async fn spawn() -> TestApp {
        Self::spawn_with(None).await
    }

    pub async fn spawn_with(prometheus: Option<PrometheusHandle>) -> TestApp {
        let db = DatabaseManager::in_memory()
            .await
            .expect("Failed to create in-memory database");
        let clock = clock_on(2024, 1, 2);
        let state = AppState::new(db.clone(), AppConfig::default(), clock.clone(), prometheus);
        TestApp {
            router: create_app(state),
            db,
            clock,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        role: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder.header(ROLE_HEADER, role).header(USER_HEADER, "test-user");
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, role: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(role), None).await
    }

    pub async fn post(&self, uri: &str, role: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(role), Some(body)).await
    }

    pub async fn put(&self, uri: &str, role: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(role), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, role: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(role), None).await
    }

    /// 以管理员身份创建资源并返回其 id
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, json) = self.post(uri, "admin", body).await;
        assert_eq!(status, StatusCode::CREATED, "create {uri} failed: {json}");
        json["data"]["id"].as_str().unwrap().to_string()
    }
}
