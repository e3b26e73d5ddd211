//! Shared harness: in-memory store, mocked JWKS endpoint and token minting

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use coffee_shop_api::{
    api::auth::TokenValidator,
    config::{AuthConfig, Config},
    server::{AppState, Server},
    store::{DrinkRepository, SqliteDrinkStore},
};
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const AUDIENCE: &str = "coffeeshop";
pub const ISSUER: &str = "https://coffee-shop.test/";
pub const KID: &str = "test-key-1";

const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

pub const ALL_PERMISSIONS: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteDrinkStore>,
    _jwks: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let jwks = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(JWKS, "application/json"))
            .mount(&jwks)
            .await;

        let config = Config {
            auth: AuthConfig {
                domain: "coffee-shop.test".to_string(),
                audience: AUDIENCE.to_string(),
                issuer: ISSUER.to_string(),
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks.uri())),
                ..AuthConfig::default()
            },
            ..Config::default()
        };

        let store = Arc::new(SqliteDrinkStore::in_memory().await.unwrap());
        let validator = Arc::new(TokenValidator::new(&config.auth).unwrap());
        let state = AppState::new(Arc::new(config), store.clone(), validator);

        Self {
            router: Server::build_router(state),
            store,
            _jwks: jwks,
        }
    }

    /// Token for a subject holding `permissions`
    pub fn token(&self, permissions: &[&str]) -> String {
        self.sign(json!({
            "sub": "auth0|tester",
            "aud": AUDIENCE,
            "iss": ISSUER,
            "iat": get_current_timestamp(),
            "exp": get_current_timestamp() + 3600,
            "permissions": permissions,
        }))
    }

    pub fn sign(&self, claims: Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(KID.to_string());
        encode(
            &header,
            &claims,
            &EncodingKey::from_rsa_pem(SIGNING_KEY).unwrap(),
        )
        .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Send with a bearer token holding `permissions`
    pub async fn send_as(
        &self,
        permissions: &[&str],
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let bearer = format!("Bearer {}", self.token(permissions));
        self.send(method, uri, Some(&bearer), body).await
    }

    pub async fn store_is_empty(&self) -> bool {
        self.store.list().await.unwrap().is_empty()
    }

    pub async fn create_water(&self) -> Value {
        let (status, body) = self
            .send_as(
                &["post:drinks"],
                Method::POST,
                "/drinks",
                Some(water()),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body["drinks"].clone()
    }
}

pub fn water() -> Value {
    json!({
        "title": "Water",
        "recipe": [{"color": "blue", "name": "water", "parts": 1}]
    })
}
