//! HTTP tests driving the router in-process.
//!
//! Tokens are signed with the development key checked into casting-auth and
//! verified against its JWKS fixture, so no identity provider is needed.
//!
//! Run with: cargo test --package casting-server --test api

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use casting_auth::{
    Authorizer, Claims, KeySetCache, StaticKeySource, TokenIssuer, TokenVerifier,
    VerifierSettings,
};
use casting_core::{AppConfig, RolePreset};
use casting_server::{AppState, create_router};
use casting_store::{CastingStore, SqliteStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const ISSUER: &str = "https://casting-test.auth0.com/";
const AUDIENCE: &str = "casting";
const JWKS: &str = include_str!("../../casting-auth/testdata/jwks.json");
const DEV_KEY: &[u8] = include_bytes!("../../casting-auth/testdata/dev_signing_key.pem");

struct TestApp {
    app: Router,
    store: Arc<SqliteStore>,
    issuer: TokenIssuer,
}

impl TestApp {
    async fn new() -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let keys = KeySetCache::new(
            Arc::new(StaticKeySource::from_json(JWKS).unwrap()),
            Duration::from_secs(600),
        );
        let authorizer = Authorizer::new(TokenVerifier::new(
            VerifierSettings::new(ISSUER, AUDIENCE),
            Arc::new(keys),
        ));

        let state = AppState::new(AppConfig::default(), store.clone(), Arc::new(authorizer));

        Self {
            app: create_router(Arc::new(state)),
            store,
            issuer: TokenIssuer::from_rsa_pem(DEV_KEY, "casting-dev-1", ISSUER, AUDIENCE)
                .unwrap(),
        }
    }

    fn token(&self, role: RolePreset) -> String {
        self.issuer
            .mint(
                &format!("auth0|{}", role.name()),
                role.permission_strings(),
                Duration::from_secs(3600),
            )
            .unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, role: RolePreset) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(&self.token(role)), None).await
    }

    async fn send_json(
        &self,
        method: Method,
        uri: &str,
        role: RolePreset,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(
            method,
            uri,
            Some(&self.token(role)),
            Some(Body::from(body.to_string())),
        )
        .await
    }

    async fn create_actor(&self, name: &str) -> i64 {
        let (status, body) = self
            .send_json(
                Method::POST,
                "/actors",
                RolePreset::Director,
                json!({"name": name, "age": 40, "gender": "male"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["created"].as_i64().unwrap()
    }

    async fn create_movie(&self, title: &str, roles: Value) -> i64 {
        let (status, body) = self
            .send_json(
                Method::POST,
                "/movies",
                RolePreset::Producer,
                json!({"title": title, "release_date": "2021-06-07", "roles": roles}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["created"].as_i64().unwrap()
    }
}

fn assert_auth_error(body: &Value, status: u16, code: &str) {
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], status);
    assert_eq!(body["message"]["code"], code, "{body}");
}

// ---------------------------------------------------------------------------
// Service surface
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_healthz_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "service": "casting-server"}));
}

#[tokio::test]
async fn test_unknown_route_and_wrong_method() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/directors", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");

    let (status, body) = app.send(Method::PUT, "/movies", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], 405);
    assert_eq!(body["message"], "method not allowed");
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/movies/abc", RolePreset::Producer).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_token_is_401() {
    let app = TestApp::new().await;
    let (status, body) = app.send(Method::GET, "/movies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_auth_error(&body, 401, "authorization_header_missing");
    assert_eq!(body["message"]["description"], "Authorization header is expected.");
}

#[tokio::test]
async fn test_non_bearer_header_is_401() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/actors")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_401() {
    let app = TestApp::new().await;
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = Claims::new(ISSUER, "auth0|late", AUDIENCE, now - 60)
        .with_permissions(RolePreset::Producer.permission_strings());
    let token = app.issuer.mint_claims(&claims).unwrap();

    let (status, body) = app.send(Method::GET, "/movies", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_auth_error(&body, 401, "token_expired");
}

#[tokio::test]
async fn test_token_without_permissions_is_401() {
    let app = TestApp::new().await;
    let now = chrono::Utc::now().timestamp() as u64;
    let token = app
        .issuer
        .mint_claims(&Claims::new(ISSUER, "auth0|bare", AUDIENCE, now + 600))
        .unwrap();

    let (status, body) = app.send(Method::GET, "/actors", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_auth_error(&body, 401, "invalid_claims");
    assert_eq!(body["message"]["description"], "Permissions not included in JWT.");
}

/// An assistant can list movies but not create them.
#[tokio::test]
async fn test_assistant_is_read_only() {
    let app = TestApp::new().await;
    app.create_movie("Listed", json!([])).await;

    let (status, body) = app.get("/movies", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .send_json(Method::POST, "/movies", RolePreset::Assistant, json!({"title": "Nope"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_auth_error(&body, 403, "unauthorized");
    assert_eq!(body["message"]["description"], "Permission not found.");

    let (status, _) = app
        .send_json(
            Method::POST,
            "/actors",
            RolePreset::Assistant,
            json!({"name": "Nope", "age": 20, "gender": "female"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

/// A director manages actors and edits movies but cannot create or delete them.
#[tokio::test]
async fn test_director_permissions() {
    let app = TestApp::new().await;
    let movie = app.create_movie("Directed", json!([])).await;

    let (status, _) = app
        .send_json(Method::POST, "/movies", RolePreset::Director, json!({"title": "Nope"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/movies/{movie}"),
            Some(&app.token(RolePreset::Director)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send_json(
            Method::PATCH,
            &format!("/movies/{movie}"),
            RolePreset::Director,
            json!({"description": "Recut"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie"]["description"], "Recut");

    app.create_actor("Directed Actor").await;
}

/// Fetching a single record requires the edit permission.
#[tokio::test]
async fn test_single_record_reads_require_patch_permission() {
    let app = TestApp::new().await;
    let movie = app.create_movie("Guarded", json!([])).await;
    let actor = app.create_actor("Guarded Actor").await;

    let (status, _) = app.get(&format!("/movies/{movie}"), RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/actors/{actor}"), RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/movies/{movie}"), RolePreset::Director).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/actors/{actor}"), RolePreset::Director).await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_movie_lifecycle() {
    let app = TestApp::new().await;
    let lead = app.create_actor("Lead").await;

    let (status, body) = app
        .send_json(
            Method::POST,
            "/movies",
            RolePreset::Producer,
            json!({
                "title": "First Movie",
                "release_date": "2021/06/07",
                "image_url": "https://example.com/poster.jpg",
                "description": "Opening night",
                "roles": [{"actor_id": lead, "role": "Hero"}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["total_movies"], 1);
    let id = body["created"].as_i64().unwrap();
    assert_eq!(body["movies"][0]["id"], id);
    assert_eq!(body["movies"][0]["release_date"], "2021-06-07");

    let (status, body) = app.get(&format!("/movies/{id}"), RolePreset::Producer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie"]["title"], "First Movie");
    assert_eq!(body["roles"][0]["actor_id"], lead);
    assert_eq!(body["roles"][0]["role"], "Hero");

    let (status, body) = app
        .send_json(
            Method::PATCH,
            &format!("/movies/{id}"),
            RolePreset::Producer,
            json!({"title": "Updated Movie", "image_url": null}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movie"]["title"], "Updated Movie");
    assert_eq!(body["movie"]["image_url"], Value::Null);
    assert_eq!(body["movie"]["description"], "Opening night");

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/movies/{id}"),
            Some(&app.token(RolePreset::Producer)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], id);
    assert_eq!(body["total_movies"], 0);
    assert_eq!(body["movies"], json!([]));

    // Role rows went with the movie; the actor stays.
    assert!(app.store.actor_roles(lead).await.unwrap().is_empty());
    assert!(app.store.get_actor(lead).await.is_ok());

    let (status, _) = app.get(&format!("/movies/{id}"), RolePreset::Producer).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_pagination() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/movies", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");

    for i in 1..=12 {
        app.create_movie(&format!("Movie {i}"), json!([])).await;
    }

    let (status, body) = app.get("/movies", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["movies"].as_array().unwrap().len(), 10);

    let (status, body) = app.get("/movies?page=2", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::OK);
    let page = body["movies"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[1]["title"], "Movie 12");

    let (status, _) = app.get("/movies?page=3", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/movies?page=0", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "bad request");

    let (status, _) = app.get("/movies?page=two", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_movie_body_errors() {
    let app = TestApp::new().await;

    // Wrong types.
    let (status, body) = app
        .send_json(
            Method::POST,
            "/movies",
            RolePreset::Producer,
            json!({"title": 42, "release_date": true}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);

    // Missing title.
    let (status, body) = app
        .send_json(Method::POST, "/movies", RolePreset::Producer, json!({"description": "x"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "unprocessable entity");

    // Not JSON at all.
    let (status, body) = app
        .send(
            Method::POST,
            "/movies",
            Some(&app.token(RolePreset::Producer)),
            Some(Body::from("{not json")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "bad request");

    // Casting an actor that does not exist.
    let (status, body) = app
        .send_json(
            Method::POST,
            "/movies",
            RolePreset::Producer,
            json!({"title": "Ghost", "roles": [{"actor_id": 777, "role": "Nobody"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "resource conflict");
    assert_eq!(app.store.count_movies().await.unwrap(), 0);
}

#[tokio::test]
async fn test_patch_and_delete_missing_movie() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send_json(Method::PATCH, "/movies/99", RolePreset::Producer, json!({"title": "x"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::DELETE,
            "/movies/99",
            Some(&app.token(RolePreset::Producer)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_actor_lifecycle() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send_json(
            Method::POST,
            "/actors",
            RolePreset::Director,
            json!({"name": "Actor One", "age": 30, "gender": "female"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_actors"], 1);
    let id = body["created"].as_i64().unwrap();

    let movie = app
        .create_movie("Showcase", json!([{"actor_id": id, "role": "Lead"}]))
        .await;

    let (status, body) = app.get(&format!("/actors/{id}"), RolePreset::Director).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actor"]["name"], "Actor One");
    assert_eq!(body["roles"][0]["movie_id"], movie);

    // Changing only the picture leaves gender alone.
    let (status, body) = app
        .send_json(
            Method::PATCH,
            &format!("/actors/{id}"),
            RolePreset::Director,
            json!({"image_url": "https://example.com/headshot.jpg"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actor"]["image_url"], "https://example.com/headshot.jpg");
    assert_eq!(body["actor"]["gender"], "female");

    let (status, body) = app
        .send_json(
            Method::PATCH,
            &format!("/actors/{id}"),
            RolePreset::Director,
            json!({"age": -4}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"].as_str().map(|d| d.contains("age")), Some(true));

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/actors/{id}"),
            Some(&app.token(RolePreset::Director)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], id);
    assert_eq!(body["total_actors"], 0);

    assert!(app.store.movie_roles(movie).await.unwrap().is_empty());

    let (status, _) = app.get("/actors", RolePreset::Assistant).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_actor_body_errors() {
    let app = TestApp::new().await;

    let (status, _) = app
        .send_json(
            Method::POST,
            "/actors",
            RolePreset::Director,
            json!({"name": "Actor", "age": "thirty", "gender": "male"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .send_json(Method::POST, "/actors", RolePreset::Director, json!({"name": "Actor"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "unprocessable entity");
}
