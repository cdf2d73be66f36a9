use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use cityinfo_core::{
    AuthenticatedUser, City, CredentialValidator, DemoCredentials, SeedData, SeedStore,
};
use cityinfo_server::config::AuthConfig;
use cityinfo_server::files::FileStorage;
use cityinfo_server::routes;
use cityinfo_server::state::{AppState, CityBackend};
use cityinfo_server::token::TokenService;

pub const TEST_SECRET: &str = "Y2l0eWluZm8tdGVzdC1zaWduaW5nLWtleS0wMTIzNDU2Nzg5";
pub const TEST_ISSUER: &str = "https://localhost:7169";
pub const TEST_AUDIENCE: &str = "cityinfoapi";

pub struct TestApp {
    pub router: Router,
    pub tokens: TokenService,
    pub files_dir: TempDir,
    pub upload_dir: TempDir,
}

impl TestApp {
    /// A token signed with the test secret for the demo user.
    pub fn bearer(&self) -> String {
        let user = AuthenticatedUser {
            user_id: 1,
            username: "tester".to_string(),
            first_name: "Kevi".to_string(),
            last_name: "Docx".to_string(),
            city: "Antwer".to_string(),
        };
        format!("Bearer {}", self.tokens.issue(&user).unwrap())
    }

    /// Send an authenticated GET request.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::get(uri)
                    .header("authorization", self.bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Files currently present in the upload directory.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Rejects every credential pair.
pub struct RejectAll;

impl CredentialValidator for RejectAll {
    fn validate(&self, _username: Option<&str>, _password: Option<&str>) -> Option<AuthenticatedUser> {
        None
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: TEST_SECRET.to_string(),
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
    }
}

/// Router over the demo seed with the always-accepting credential stub.
pub fn setup_test_app() -> TestApp {
    build_app(SeedData::demo().unwrap(), Arc::new(DemoCredentials))
}

/// Router over `count` generated cities, ids 1..=count.
pub fn setup_test_app_with_cities(count: i32) -> TestApp {
    let cities = (1..=count)
        .map(|i| City::new(i, format!("City {i}"), Some("Generated")))
        .collect();
    build_app(SeedData::new(cities).unwrap(), Arc::new(DemoCredentials))
}

/// Router whose credential check always fails.
pub fn setup_test_app_rejecting_credentials() -> TestApp {
    build_app(SeedData::demo().unwrap(), Arc::new(RejectAll))
}

fn build_app(seed: SeedData, credentials: Arc<dyn CredentialValidator>) -> TestApp {
    let files_dir = TempDir::new().expect("Failed to create files dir");
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    let tokens = TokenService::new(&auth_config()).expect("Failed to build token service");

    let state = Arc::new(AppState {
        cities: CityBackend::Seed(SeedStore::new(seed)),
        tokens: tokens.clone(),
        credentials,
        files: FileStorage::new(files_dir.path(), upload_dir.path()),
    });

    TestApp {
        router: routes::router(state),
        tokens,
        files_dir,
        upload_dir,
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
