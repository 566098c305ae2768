#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

use townsquare::app::comments::CommentService;
use townsquare::app::posts::PostService;
use townsquare::http::{self, HttpOptions};
use townsquare::infra::db::Db;
use townsquare::infra::store::memory::MemoryStore;
use townsquare::infra::store::StoreClient;
use townsquare::AppState;

pub const SECRET_KEY: &str = "correct horse battery staple";

// ---------------------------------------------------------------------------
// TestApp: an in-memory store per test, or a shared Postgres database
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    memory: Option<MemoryStore>,
    pub client: StoreClient,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub fn app() -> TestApp {
    let store = MemoryStore::new();
    TestApp::with_client(StoreClient::memory(store.clone()), Some(store))
}

static SCHEMA: OnceCell<()> = OnceCell::const_new();

/// A TestApp over the database named by `TEST_DATABASE_URL` (falling back
/// to `DATABASE_URL`). Returns `None` when neither is set so the Postgres
/// suite is skipped on machines without a database.
///
/// Tests share the database and run concurrently, so assertions must be
/// scoped to the rows a test created itself.
pub async fn pg_app() -> Option<TestApp> {
    let Some(database_url) = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
    else {
        eprintln!("skipping: TEST_DATABASE_URL / DATABASE_URL not set");
        return None;
    };

    // One pool per test: each #[tokio::test] has its own runtime.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("cannot connect to test database");
    let db = Db::from_pool(pool);

    SCHEMA
        .get_or_init(|| async {
            db.migrate().await.expect("migration failed");
        })
        .await;

    Some(TestApp::with_client(StoreClient::postgres(db), None))
}

impl TestApp {
    fn with_client(client: StoreClient, memory: Option<MemoryStore>) -> Self {
        let router = http::service(
            AppState {
                store: client.clone(),
            },
            HttpOptions {
                cors_allow_origin: None,
                max_body_bytes: 64 * 1024,
            },
        );

        Self {
            router,
            memory,
            client,
        }
    }

    /// The in-memory backend, for outage switching.
    pub fn store(&self) -> &MemoryStore {
        self.memory.as_ref().expect("not a memory-backed TestApp")
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.client.clone())
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.client.clone())
    }

    // ------------------------------------------------------------------
    // Raw request
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, &[]).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn patch_json(&self, path: &str, body: Value, secret_key: Option<&str>) -> TestResponse {
        let mut headers = vec![];
        if let Some(key) = secret_key {
            headers.push(("x-secret-key", key));
        }
        self.request(Method::PATCH, path, Some(body), &headers).await
    }

    pub async fn delete(&self, path: &str, secret_key: Option<&str>) -> TestResponse {
        let mut headers = vec![];
        if let Some(key) = secret_key {
            headers.push(("x-secret-key", key));
        }
        self.request(Method::DELETE, path, None, &headers).await
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    /// Creates a post through the API and returns its id.
    pub async fn create_post(&self, title: &str, community: &str) -> Uuid {
        let resp = self
            .post_json(
                "/posts",
                json!({
                    "title": title,
                    "community": community,
                    "secret_key": SECRET_KEY,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create failed: {}", resp.json());
        resp.json()["id"].as_str().unwrap().parse().unwrap()
    }
}
