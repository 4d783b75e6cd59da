/// Shared helpers for server integration tests
use axum::Router;
use cadence_core::{CreateTrack, Role, Track, User};
use cadence_server::{create_router, services::AuthService, state::AppState};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestContext {
    pub app: Router,
    pub auth_service: Arc<AuthService>,
    pub pool: SqlitePool,
    // Held so the database file outlives the test
    _temp_dir: TempDir,
}

/// Spin up a full application over a fresh temp database
pub async fn create_test_app() -> TestContext {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite://{}", db_path.display());

    let pool = cadence_storage::create_pool(&database_url).await.unwrap();
    cadence_storage::run_migrations(&pool).await.unwrap();

    let auth_service = Arc::new(AuthService::new("test-secret-key".to_string()));
    let app_state = AppState::new(pool.clone(), Arc::clone(&auth_service));
    let app = create_router(app_state, Arc::clone(&auth_service));

    TestContext {
        app,
        auth_service,
        pool,
        _temp_dir: temp_dir,
    }
}

impl TestContext {
    /// Insert a user record and mint a token for it
    pub async fn create_user(&self, name: &str, role: Role) -> (User, String) {
        let user = User::new(name, role);
        cadence_storage::users::create(&self.pool, &user)
            .await
            .unwrap();

        let token = self
            .auth_service
            .create_access_token(&user.id, role)
            .unwrap();

        (user, token)
    }

    /// Insert a track directly through the storage layer
    pub async fn create_track(&self, title: &str) -> Track {
        cadence_storage::tracks::create(
            &self.pool,
            CreateTrack {
                title: title.to_string(),
                artist: Some("Test Artist".to_string()),
                album: None,
                duration_ms: Some(180_000),
            },
        )
        .await
        .unwrap()
    }
}
