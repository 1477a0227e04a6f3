use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use product_catalog_api::{
    api_routes, config::AppConfig, store::InMemoryProductStore, AppState,
};

/// Helper harness driving the real router against the in-memory store.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Construct a new test application with fresh store state.
    pub fn new() -> Self {
        let cfg = AppConfig::new(
            "mongodb://localhost:27017".to_string(),
            "catalog_test".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let state = AppState {
            store: Arc::new(InMemoryProductStore::new()),
            config: cfg,
        };

        Self {
            router: api_routes().with_state(state),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        self.router.clone().oneshot(request).await.expect("response")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
