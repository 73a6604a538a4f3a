#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use talent_api::auth::{generate_jwt, Claims, Role};
use talent_api::config::AppConfig;
use talent_api::database::postgres::schema;
use talent_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use talent_api::{app, AppState};

/// Matches `AppConfig::for_testing`
pub const SECRET: &str = "test-secret";

// Concurrent CREATE TABLE IF NOT EXISTS can still collide in the catalog
static MIGRATE: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

/// The full router on a free local port, backed by a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub upload_dir: PathBuf,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
    _uploads: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let mut config = AppConfig::for_testing(uploads.path());
        configure(&mut config);
        Self::start_on(Arc::new(MemoryStore::new()), config, uploads).await
    }

    /// Same router backed by Postgres. `None` when `DATABASE_URL` is unset,
    /// so callers skip instead of failing.
    pub async fn start_postgres(configure: impl FnOnce(&mut AppConfig)) -> Result<Option<Self>> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return Ok(None);
        }

        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let mut config = AppConfig::for_testing(uploads.path());
        configure(&mut config);

        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to DATABASE_URL")?;
        {
            let _guard = MIGRATE.lock().await;
            schema::migrate(&pool).await.context("failed to migrate schema")?;
        }

        Self::start_on(Arc::new(PgStore::new(pool)), config, uploads).await.map(Some)
    }

    async fn start_on(store: Arc<dyn Store>, config: AppConfig, uploads: TempDir) -> Result<Self> {
        let upload_dir = config.server.upload_dir.clone();

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        let router = app(AppState::new(store, config));
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            upload_dir,
            client: reqwest::Client::new(),
            handle,
            _uploads: uploads,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request without credentials
    pub fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub fn authed(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.anonymous(method, path).bearer_auth(token)
    }

    /// Register a user through the API and return the `data` payload
    pub async fn register(&self, token: &str, user_id: i64, name: &str, email: &str) -> Result<Value> {
        let res = self
            .authed(Method::POST, "/api/users/register", token)
            .json(&json!({ "userId": user_id, "fullName": name, "email": email, "phone": "555-0100" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
        data(res).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fresh positive id, so rows left in a shared database never collide
pub fn unique_id() -> i64 {
    (uuid::Uuid::new_v4().as_u128() % 1_000_000_000_000) as i64 + 1
}

/// Valid HS256 session token
pub fn token(user_id: i64, role: Role) -> String {
    generate_jwt(&Claims::new(user_id, role, 1), SECRET).expect("token")
}

/// Signed with the wrong secret and already expired
pub fn forged_token(user_id: i64, role: Role) -> String {
    generate_jwt(&Claims::new(user_id, role, -2), "not-the-server-secret").expect("token")
}

pub async fn body(res: reqwest::Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}

/// Unwrap the `{ "success": true, "data": ... }` envelope
pub async fn data(res: reqwest::Response) -> Result<Value> {
    let body = body(res).await?;
    anyhow::ensure!(body["success"] == json!(true), "success flag false or missing: {}", body);
    Ok(body["data"].clone())
}
