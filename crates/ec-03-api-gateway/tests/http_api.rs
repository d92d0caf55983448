//! End-to-end tests for the REST surface.
//!
//! Each test builds the real services over in-memory stores and a manual
//! clock, then drives the fully layered router with `oneshot`.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration as ChronoDuration;
use ec_01_wallet_auth::{InMemoryNonceRepository, WalletAuthService};
use ec_02_kyc_sessions::{InMemoryLedger, InMemorySessionRepository, KycService};
use ec_03_api_gateway::{codes, ApiGatewayService, GatewayConfig};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use shared_types::{Clock, Credential, CredentialStatus, CredentialType, ManualClock, WalletAddress};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    app: Router,
    clock: Arc<ManualClock>,
    admin: SigningKey,
}

fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.token_secret = "c3".repeat(32);
    config
}

fn harness() -> Harness {
    harness_with(test_config(), |_| Vec::new())
}

/// Build a harness, seeding the ledger from the clock's start time.
fn harness_with(
    mut config: GatewayConfig,
    seed_ledger: impl FnOnce(i64) -> Vec<Credential>,
) -> Harness {
    let clock = Arc::new(ManualClock::default());
    let shared_clock: Arc<dyn Clock> = clock.clone();

    let admin = new_key();
    config.auth.admin_wallets = vec![wallet_of(&admin).to_string()];

    let auth = WalletAuthService::new(
        InMemoryNonceRepository::new(),
        Arc::clone(&shared_clock),
        config.wallet_auth_config().unwrap(),
    )
    .unwrap();
    let kyc = KycService::new(
        InMemorySessionRepository::new(),
        InMemoryLedger::with_credentials(seed_ledger(clock.now().timestamp())),
        shared_clock,
        config.sessions.session_ttl(),
    )
    .unwrap();

    let gateway = ApiGatewayService::new(config, Arc::new(auth), Arc::new(kyc)).unwrap();

    Harness {
        app: gateway.router(),
        clock,
        admin,
    }
}

fn new_key() -> SigningKey {
    SigningKey::generate(&mut rand::rngs::OsRng)
}

fn wallet_of(key: &SigningKey) -> WalletAddress {
    WalletAddress::from_public_key(key.verifying_key().to_bytes())
}

fn sign(key: &SigningKey, message: &str) -> String {
    bs58::encode(key.sign(message.as_bytes()).to_bytes()).into_string()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// A request as it arrives from a socket peer at `peer`.
fn connected_request(method: Method, uri: &str, peer: [u8; 4]) -> Request<Body> {
    let mut request = empty_request(method, uri);
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 51_000))));
    request
}

fn with_token(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn request_nonce(app: &Router, wallet: &WalletAddress) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/auth/nonce",
            json!({ "walletAddress": wallet.as_str() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["nonce"].as_str().unwrap().to_string()
}

async fn verify(app: &Router, key: &SigningKey, nonce: &str, signature: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/auth/verify",
            json!({
                "walletAddress": wallet_of(key).as_str(),
                "signature": signature,
                "nonce": nonce,
            }),
        ),
    )
    .await
}

async fn login(app: &Router, key: &SigningKey) -> String {
    let nonce = request_nonce(app, &wallet_of(key)).await;
    let (status, body) = verify(app, key, &nonce, &sign(key, &nonce)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_session(app: &Router, wallet: &WalletAddress, credential_type: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/kyc/session",
            json!({ "walletAddress": wallet.as_str(), "credentialType": credential_type }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["sessionId"].as_str().unwrap().to_string()
}

fn credential(holder: &WalletAddress, status: CredentialStatus, expires_at: i64) -> Credential {
    Credential {
        holder: holder.clone(),
        issuer: WalletAddress::from_public_key([0xEE; 32]),
        credential_type: CredentialType::KycBasic,
        status,
        issued_at: expires_at - 86_400,
        expires_at,
        metadata_uri: "ipfs://credential".into(),
        revocation_reason: None,
    }
}

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected body: {body}");
    assert!(body["error"]["message"].is_string());
}

// =============================================================================
// Health and routing
// =============================================================================

#[tokio::test]
async fn test_health() {
    let h = harness();

    let (status, body) = send(&h.app, empty_request(Method::GET, "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_error_body() {
    let h = harness();

    let (status, body) = send(&h.app, empty_request(Method::GET, "/nope")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, codes::NOT_FOUND);
}

// =============================================================================
// Wallet authentication
// =============================================================================

#[tokio::test]
async fn test_wallet_login_flow() {
    let h = harness();
    let key = new_key();
    let wallet = wallet_of(&key);

    let nonce = request_nonce(&h.app, &wallet).await;
    let (status, body) = verify(&h.app, &key, &nonce, &sign(&key, &nonce)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["walletAddress"], wallet.as_str());
    assert_eq!(body["isAdmin"], false);

    // The challenge is single use
    let (status, body) = verify(&h.app, &key, &nonce, &sign(&key, &nonce)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::NONCE_NOT_FOUND);
}

#[tokio::test]
async fn test_admin_wallet_flagged() {
    let h = harness();
    let admin = h.admin.clone();

    let nonce = request_nonce(&h.app, &wallet_of(&admin)).await;
    let (status, body) = verify(&h.app, &admin, &nonce, &sign(&admin, &nonce)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);
}

#[tokio::test]
async fn test_bad_signature_is_unauthorized_and_burns_nonce() {
    let h = harness();
    let key = new_key();
    let nonce = request_nonce(&h.app, &wallet_of(&key)).await;

    let forged = sign(&new_key(), &nonce);
    let (status, body) = verify(&h.app, &key, &nonce, &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, codes::INVALID_SIGNATURE);

    let (status, body) = verify(&h.app, &key, &nonce, &sign(&key, &nonce)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::NONCE_NOT_FOUND);
}

#[tokio::test]
async fn test_reissued_nonce_replaces_previous() {
    let h = harness();
    let key = new_key();
    let wallet = wallet_of(&key);

    let first = request_nonce(&h.app, &wallet).await;
    let second = request_nonce(&h.app, &wallet).await;
    assert_ne!(first, second);

    let (status, body) = verify(&h.app, &key, &first, &sign(&key, &first)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::NONCE_MISMATCH);
}

#[tokio::test]
async fn test_expired_nonce_rejected() {
    let h = harness();
    let key = new_key();
    let nonce = request_nonce(&h.app, &wallet_of(&key)).await;

    h.clock.advance(ChronoDuration::minutes(10));

    let (status, body) = verify(&h.app, &key, &nonce, &sign(&key, &nonce)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::NONCE_EXPIRED);

    // A fresh challenge works afterwards
    let fresh = request_nonce(&h.app, &wallet_of(&key)).await;
    assert_ne!(fresh, nonce);
}

#[tokio::test]
async fn test_invalid_wallet_address() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/auth/nonce",
            json!({ "walletAddress": "0OIl-not-base58" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::VALIDATION_ERROR);
    assert_eq!(body["error"]["field"], "walletAddress");
}

#[tokio::test]
async fn test_malformed_body() {
    let h = harness();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/nonce")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, codes::MALFORMED_BODY);
}

// =============================================================================
// KYC sessions
// =============================================================================

#[tokio::test]
async fn test_kyc_session_lifecycle() {
    let h = harness();
    let wallet = wallet_of(&new_key());
    let id = create_session(&h.app, &wallet, "kycBasic").await;
    let path = format!("/kyc/session/{id}");

    let (status, body) = send(&h.app, empty_request(Method::GET, &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["credentialType"], "kycBasic");

    // Submitting with nothing collected fails with reasons
    let submit = format!("{path}/submit");
    let (status, body) = send(&h.app, empty_request(Method::POST, &submit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["verificationResult"]["passed"], false);
    assert!(!body["verificationResult"]["reasons"]
        .as_array()
        .unwrap()
        .is_empty());

    // Collecting fields does not move the status
    let (status, body) = send(
        &h.app,
        json_request(
            Method::PUT,
            &path,
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "dateOfBirth": "1990-12-10",
                "nationality": "GB",
                "email": "ada@example.com",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["collectedFields"]["firstName"], "Ada");

    let (status, body) = send(&h.app, empty_request(Method::POST, &submit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["verificationResult"]["passed"], true);

    // Completed sessions are closed
    let (status, body) = send(&h.app, empty_request(Method::POST, &submit)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&body, codes::SESSION_COMPLETED);

    let (status, _) = send(
        &h.app,
        json_request(Method::PUT, &path, json!({ "firstName": "Augusta" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&h.app, empty_request(Method::DELETE, &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = send(&h.app, empty_request(Method::GET, &path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, codes::SESSION_NOT_FOUND);

    let (status, body) = send(&h.app, empty_request(Method::DELETE, &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], false);
}

#[tokio::test]
async fn test_session_expires() {
    let h = harness();
    let id = create_session(&h.app, &wallet_of(&new_key()), "international").await;

    h.clock.advance(ChronoDuration::minutes(31));

    let (status, body) = send(&h.app, empty_request(Method::GET, &format!("/kyc/session/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, codes::SESSION_NOT_FOUND);
}

#[tokio::test]
async fn test_session_input_validation() {
    let h = harness();
    let wallet = wallet_of(&new_key());

    let (status, body) = send(
        &h.app,
        json_request(
            Method::POST,
            "/kyc/session",
            json!({ "walletAddress": wallet.as_str(), "credentialType": "platinum" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "credentialType");

    let (status, body) = send(&h.app, empty_request(Method::GET, "/kyc/session/123")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "sessionId");
}

#[tokio::test]
async fn test_list_sessions_requires_token() {
    let h = harness();
    let key = new_key();
    let wallet = wallet_of(&key);
    let other = wallet_of(&new_key());

    create_session(&h.app, &wallet, "kycBasic").await;
    create_session(&h.app, &wallet, "kycEnhanced").await;
    create_session(&h.app, &other, "kycBasic").await;

    let (status, body) = send(&h.app, empty_request(Method::GET, "/kyc/sessions")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, codes::UNAUTHORIZED);

    let (status, _) = send(
        &h.app,
        with_token(empty_request(Method::GET, "/kyc/sessions"), "garbage.token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&h.app, &key).await;
    let (status, body) = send(
        &h.app,
        with_token(empty_request(Method::GET, "/kyc/sessions"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    for session in body["sessions"].as_array().unwrap() {
        assert_eq!(session["walletAddress"], wallet.as_str());
    }
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_credential_status() {
    let active = WalletAddress::from_public_key([1; 32]);
    let lapsed = WalletAddress::from_public_key([2; 32]);
    let revoked = WalletAddress::from_public_key([3; 32]);
    let h = harness_with(test_config(), |now| {
        vec![
            credential(&active, CredentialStatus::Active, now + 3_600),
            credential(&lapsed, CredentialStatus::Active, now - 1),
            credential(&revoked, CredentialStatus::Revoked, now + 3_600),
        ]
    });

    let (status, body) = send(
        &h.app,
        empty_request(Method::GET, &format!("/credentials/{active}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], true);
    assert_eq!(body["effectiveStatus"], "active");
    assert_eq!(body["credential"]["holder"], active.as_str());

    let (_, body) = send(
        &h.app,
        empty_request(Method::GET, &format!("/credentials/{lapsed}")),
    )
    .await;
    assert_eq!(body["isValid"], false);
    assert_eq!(body["effectiveStatus"], "expired");

    let (_, body) = send(
        &h.app,
        empty_request(Method::GET, &format!("/credentials/{revoked}")),
    )
    .await;
    assert_eq!(body["isValid"], false);
    assert_eq!(body["effectiveStatus"], "revoked");

    let unknown = WalletAddress::from_public_key([4; 32]);
    let (status, body) = send(
        &h.app,
        empty_request(Method::GET, &format!("/credentials/{unknown}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, codes::CREDENTIAL_NOT_FOUND);

    let (status, _) = send(&h.app, empty_request(Method::GET, "/credentials/xyz0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Operations
// =============================================================================

#[tokio::test]
async fn test_metrics_requires_admin_token() {
    let h = harness();

    let (status, _) = send(&h.app, empty_request(Method::GET, "/metrics")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user_token = login(&h.app, &new_key()).await;
    let (status, body) = send(
        &h.app,
        with_token(empty_request(Method::GET, "/metrics"), &user_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&body, codes::FORBIDDEN);

    let admin = h.admin.clone();
    let admin_token = login(&h.app, &admin).await;
    let (status, body) = send(
        &h.app,
        with_token(empty_request(Method::GET, "/metrics"), &admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auth"]["wallets_verified"], 2);
    assert_eq!(body["rejections"]["unauthorized"], 2);
    assert!(body["requests"]["total"].as_u64().unwrap() >= 6);
}

#[tokio::test]
async fn test_rate_limit_rejects_burst() {
    let mut config = test_config();
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.writes_per_second = 1;
    config.rate_limit.burst_size = 1;
    let h = harness_with(config, |_| Vec::new());

    let from_client = || connected_request(Method::GET, "/health", [198, 51, 100, 20]);

    let (status, _) = send(&h.app, from_client()).await;
    assert_eq!(status, StatusCode::OK);

    let response = h.app.clone().oneshot(from_client()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // Localhost is whitelisted by default
    let (status, _) = send(&h.app, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_ignores_spoofed_forwarding_headers() {
    let mut config = test_config();
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.writes_per_second = 1;
    config.rate_limit.burst_size = 1;
    let h = harness_with(config, |_| Vec::new());
    let wallet = wallet_of(&new_key());

    let nonce_request = |forged: Option<&str>| {
        let mut request = json_request(
            Method::POST,
            "/auth/nonce",
            json!({ "walletAddress": wallet.as_str() }),
        );
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 30], 51_000))));
        if let Some(forged) = forged {
            request
                .headers_mut()
                .insert("x-forwarded-for", forged.parse().unwrap());
            request
                .headers_mut()
                .insert("x-real-ip", forged.parse().unwrap());
        }
        request
    };

    let (status, body) = send(&h.app, nonce_request(None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Neither a fresh forwarded address nor a whitelisted one escapes the
    // bucket of the connecting peer
    for forged in ["203.0.113.1", "203.0.113.2", "127.0.0.1"] {
        let (status, _) = send(&h.app, nonce_request(Some(forged))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS, "forged {forged}");
    }
}

#[tokio::test]
async fn test_rate_limit_keys_on_forwarded_client_behind_trusted_proxy() {
    let mut config = test_config();
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.writes_per_second = 1;
    config.rate_limit.burst_size = 1;
    config.rate_limit.trusted_proxies = vec!["10.9.0.1".parse().unwrap()];
    let h = harness_with(config, |_| Vec::new());

    let via_proxy = |client: &str| {
        let mut request = connected_request(Method::GET, "/health", [10, 9, 0, 1]);
        request
            .headers_mut()
            .insert("x-forwarded-for", client.parse().unwrap());
        request
    };

    let (status, _) = send(&h.app, via_proxy("203.0.113.40")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&h.app, via_proxy("203.0.113.40")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // A different client behind the same proxy has its own budget
    let (status, _) = send(&h.app, via_proxy("203.0.113.41")).await;
    assert_eq!(status, StatusCode::OK);
}
