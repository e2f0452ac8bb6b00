use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use nickbase_api::app::{self, AppServices};
use nickbase_auth::{TokenIssuer, TokenLifetimes};
use nickbase_core::{Nickname, User};
use nickbase_infra::{StoreError, UserStore};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        Self::spawn_with(AppServices::in_memory(JWT_SECRET)).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        let app = app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> reqwest::Response {
    client.post(srv.url("/data/")).json(&body).send().await.unwrap()
}

fn decode_claims(token: &str) -> Value {
    jsonwebtoken::decode::<Value>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("token should verify with the server secret")
    .claims
}

#[tokio::test]
async fn user_lifecycle_create_read_update_delete() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Create
    let submitted = json!({"user_nickname": "alice", "name": "Alice"});
    let res = create(&client, &srv, submitted.clone()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed, submitted);

    // Read by path key
    let res = client.get(srv.url("/user/alice")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, submitted);

    // Update by path key
    let res = client
        .put(srv.url("/user/alice"))
        .json(&json!({"name": "Alicia"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let fetched: Value = client
        .get(srv.url("/user/alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Alicia");

    // Delete by body key
    let res = client
        .delete(srv.url("/data/"))
        .json(&json!({"user_nickname": "alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/user/alice")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_returns_every_user() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: Vec<Value> = res.json().await.unwrap();
    assert!(users.is_empty());

    for nick in ["ana", "bia", "caio"] {
        let res = create(&client, &srv, json!({"user_nickname": nick, "name": nick})).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let users: Vec<Value> = client.get(srv.url("/")).send().await.unwrap().json().await.unwrap();
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn unknown_keys_are_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/user/nobody")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Not even a valid nickname: still 404, never 5xx.
    let res = client.get(srv.url("/user/no%20body")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/data/?user=nobody")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .put(srv.url("/user/nobody"))
        .json(&json!({"name": "Ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_lookup_requires_user_parameter() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, json!({"user_nickname": "dora", "name": "Dora", "user_age": 41})).await;

    let res = client.get(srv.url("/data/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/data/?user=")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/data/?user=dora")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"user_nickname": "dora", "name": "Dora", "user_age": 41}));

    // Trailing slash is optional.
    let res = client.get(srv.url("/data?user=dora")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_creation_payloads_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(&client, &srv, json!({"name": "No Nick", "user_age": -3})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"user_nickname"));
    assert!(fields.contains(&"user_age"));

    let res = client
        .post(srv.url("/data/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Duplicate primary key.
    let res = create(&client, &srv, json!({"user_nickname": "eve", "name": "Eve"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = create(&client, &srv, json!({"user_nickname": "eve", "name": "Impostor"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let kept: Value = client.get(srv.url("/user/eve")).send().await.unwrap().json().await.unwrap();
    assert_eq!(kept["name"], "Eve");
}

#[tokio::test]
async fn body_keyed_update_echoes_and_preserves_other_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, json!({"user_nickname": "fabio", "name": "Fabio", "user_age": 23})).await;

    // Missing key in body.
    let res = client
        .put(srv.url("/data/"))
        .json(&json!({"name": "Nobody"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown key.
    let res = client
        .put(srv.url("/data/"))
        .json(&json!({"user_nickname": "ghost", "name": "Ghost"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // A key that cannot be a nickname is just as unknown.
    let res = client
        .put(srv.url("/data/"))
        .json(&json!({"user_nickname": "no body", "name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Invalid value.
    let res = client
        .put(srv.url("/data/"))
        .json(&json!({"user_nickname": "fabio", "user_age": "old"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Partial update.
    let res = client
        .put(srv.url("/data/"))
        .json(&json!({"user_nickname": "fabio", "name": "Fábio"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"user_nickname": "fabio", "name": "Fábio", "user_age": 23}));
}

#[tokio::test]
async fn path_update_cannot_change_primary_key() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, json!({"user_nickname": "gabi", "name": "Gabi"})).await;

    let res = client
        .put(srv.url("/user/gabi"))
        .json(&json!({"user_nickname": "someone.else"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/user/gabi")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_failures_are_plain_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .delete(srv.url("/data/"))
        .json(&json!({"user_nickname": "nobody"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.delete(srv.url("/data/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(srv.url("/data/"))
        .json(&json!({"name": "no key"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_verbs_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.delete(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(srv.url("/user/alice")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.patch(srv.url("/data/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.get(srv.url("/token/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_pair_carries_name_and_refreshes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = create(
        &client,
        &srv,
        json!({"user_nickname": "helena", "name": "Helena", "password": "hunter2hunter2"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let echoed: Value = res.json().await.unwrap();
    assert!(echoed.get("password").is_none());

    let res = client
        .post(srv.url("/token/"))
        .json(&json!({"user_nickname": "helena", "password": "hunter2hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let pair: Value = res.json().await.unwrap();
    let access = pair["access"].as_str().unwrap();
    let refresh = pair["refresh"].as_str().unwrap();

    let claims = decode_claims(access);
    assert_eq!(claims["name"], "Helena");
    assert_eq!(claims["user_id"], "helena");
    assert_eq!(claims["token_type"], "access");

    let res = client
        .post(srv.url("/token/refresh"))
        .json(&json!({"refresh": refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let refreshed = decode_claims(body["access"].as_str().unwrap());
    assert_eq!(refreshed["name"], "Helena");
    assert_eq!(refreshed["token_type"], "access");

    // An access token is not a refresh token.
    let res = client
        .post(srv.url("/token/refresh"))
        .json(&json!({"refresh": access}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_rejects_bad_credentials() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(
        &client,
        &srv,
        json!({"user_nickname": "igor", "name": "Igor", "password": "correct-horse"}),
    )
    .await;
    create(&client, &srv, json!({"user_nickname": "julia", "name": "Julia"})).await;

    for (nick, password) in [("igor", "battery-staple"), ("nobody", "whatever1"), ("julia", "anything1")] {
        let res = client
            .post(srv.url("/token/"))
            .json(&json!({"user_nickname": nick, "password": password}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{nick}");
    }

    let res = client
        .post(srv.url("/token/"))
        .json(&json!({"user_nickname": "igor"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(srv.url("/token/refresh"))
        .json(&json!({"refresh": "not.a.jwt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_can_be_set_through_update() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create(&client, &srv, json!({"user_nickname": "karla", "name": "Karla"})).await;

    let res = client
        .put(srv.url("/user/karla"))
        .json(&json!({"password": "new-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = client
        .post(srv.url("/token/"))
        .json(&json!({"user_nickname": "karla", "password": "new-password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

/// A store whose backend is always down.
struct UnreachableStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl UserStore for UnreachableStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(down())
    }

    async fn get(&self, _nickname: &Nickname) -> Result<User, StoreError> {
        Err(down())
    }

    async fn insert(&self, _user: User) -> Result<(), StoreError> {
        Err(down())
    }

    async fn update(&self, _user: User) -> Result<(), StoreError> {
        Err(down())
    }

    async fn delete(&self, _nickname: &Nickname) -> Result<(), StoreError> {
        Err(down())
    }
}

#[tokio::test]
async fn storage_outage_is_service_unavailable_on_every_route() {
    let services = AppServices::new(
        Arc::new(UnreachableStore),
        TokenIssuer::new(JWT_SECRET.as_bytes(), TokenLifetimes::default()),
    );
    let srv = TestServer::spawn_with(services).await;
    let client = reqwest::Client::new();

    let requests = vec![
        client.get(srv.url("/")),
        client.get(srv.url("/user/alice")),
        client.put(srv.url("/user/alice")).json(&json!({"name": "Alice"})),
        client.get(srv.url("/data/?user=alice")),
        client
            .post(srv.url("/data/"))
            .json(&json!({"user_nickname": "alice", "name": "Alice"})),
        client
            .put(srv.url("/data/"))
            .json(&json!({"user_nickname": "alice", "name": "Alice"})),
        // Delete collapses every client-side failure to 400, but not this one.
        client.delete(srv.url("/data/")).json(&json!({"user_nickname": "alice"})),
    ];

    for req in requests {
        let res = req.send().await.unwrap();
        let url = res.url().to_string();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE, "{url}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "storage_unavailable", "{url}");
    }
}
