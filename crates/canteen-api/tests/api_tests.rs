//! API Integration Tests
//!
//! Every test runs the full router over in-memory stores; no database or
//! Redis is required.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use canteen_api::auth::{hash_password, RoleDirectory};
use canteen_api::create_router_for_testing;
use canteen_api::repository::OwnerRepository;
use canteen_api::testing::TestApp;
use canteen_core::config::AppConfig;
use canteen_core::{ids, Owner, ROLE_ADMIN, ROLE_OWNER, ROLE_USER};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper to create a test request
fn create_json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn create_shop(app: &TestApp, name: &str) -> String {
    let token = app.admin_token(ROLE_ADMIN);
    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/shops",
            Some(&token),
            Some(json!({
                "shop_name": name,
                "shop_description": "Rice and noodles",
                "shop_photo_link": "https://img.example/shop.png"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["shop_id"].as_str().unwrap().to_string()
}

async fn create_menu(app: &TestApp, shop_id: &str) -> String {
    let token = app.admin_token(ROLE_OWNER);
    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/menus",
            Some(&token),
            Some(json!({
                "menu_name": "Nasi Goreng",
                "shop_id": shop_id,
                "menu_price": 15000,
                "menu_status": "available"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["menu_id"].as_str().unwrap().to_string()
}

async fn create_owner(app: &TestApp, username: &str) -> String {
    let token = app.admin_token(ROLE_ADMIN);
    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/owners",
            Some(&token),
            Some(json!({
                "fullname": "Kantin Owner",
                "wa_number": "081234567890",
                "username": username,
                "password": "warung-secret"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["owner_id"].as_str().unwrap().to_string()
}

async fn place_order(app: &TestApp, token: &str, menu_id: &str) -> (StatusCode, Value) {
    send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/orders",
            Some(token),
            Some(json!({"menu_id": menu_id, "payment_method": "cash"})),
        ),
    )
    .await
}

async fn login(app: &TestApp, username: &str, password: &str) -> StatusCode {
    let (status, _) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": username, "password": password})),
        ),
    )
    .await;
    status
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = TestApp::new();

    let (status, json) = send(
        &app.router,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);

    app.revocation.set_failing(true);
    let (status, json) = send(
        &app.router,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["checks"]["revocation_store"], false);
}

#[tokio::test]
async fn test_openapi_spec_available() {
    let app = create_router_for_testing();

    let (status, json) = send(
        &app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["openapi"].is_string());
    assert!(json["components"]["securitySchemes"]["bearer_auth"].is_object());
}

// =============================================================================
// Authentication Gate Tests
// =============================================================================

#[tokio::test]
async fn test_valid_token_is_admitted() {
    let app = TestApp::new();
    let token = app.user_token(Uuid::new_v4());

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(app.revocation.call_count(), 1);
}

#[tokio::test]
async fn test_missing_header_is_bad_request_without_store_access() {
    let app = TestApp::new();

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "fail");
    assert_eq!(json["code"], 400);
    assert_eq!(app.revocation.call_count(), 0);
}

#[tokio::test]
async fn test_header_without_token_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/v1/orders")
        .header("Authorization", "Bearer")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.revocation.call_count(), 0);
}

#[tokio::test]
async fn test_any_scheme_name_is_accepted() {
    let app = TestApp::new();
    let token = app.user_token(Uuid::new_v4());

    let request = Request::builder()
        .uri("/api/v1/orders")
        .header("Authorization", format!("Token {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = TestApp::new();
    let token = app.user_token(Uuid::new_v4());
    // Swap the first signature character
    let sig_start = token.rfind('.').unwrap() + 1;
    let replacement = if token[sig_start..].starts_with('A') { "B" } else { "A" };
    let token = format!(
        "{}{}{}",
        &token[..sig_start],
        replacement,
        &token[sig_start + 1..]
    );

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "failed to authenticate user");
    assert_eq!(app.revocation.call_count(), 0);
}

#[tokio::test]
async fn test_token_signed_with_other_algorithm_is_rejected() {
    let app = TestApp::new();
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = json!({
        "userId": Uuid::new_v4().to_string(),
        "iss": app.state.config.auth.user_role_class,
        "role": ROLE_USER,
        "iat": now,
        "exp": now + 600,
    });
    let token = encode(
        &Header::new(Algorithm::HS384),
        &claims,
        &EncodingKey::from_secret(app.state.config.auth.jwt_secret.as_bytes()),
    )
    .unwrap();

    let (status, _) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_role_class_is_rejected() {
    let app = TestApp::new();
    let token = app.token_for(Uuid::new_v4(), "someone-else", ROLE_ADMIN);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "invalid token");
    assert_eq!(app.revocation.call_count(), 0);
}

#[tokio::test]
async fn test_non_uuid_subject_is_bad_request() {
    let app = TestApp::new();
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = json!({
        "userId": "not-a-uuid",
        "iss": app.state.config.auth.user_role_class,
        "role": ROLE_USER,
        "iat": now,
        "exp": now + 600,
    });
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(app.state.config.auth.jwt_secret.as_bytes()),
    )
    .unwrap();

    let (status, _) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revoked_token_is_expired() {
    let app = TestApp::new();
    let token = app.user_token(Uuid::new_v4());

    let (status, _) = send(
        &app.router,
        create_json_request("POST", "/api/v1/auth/logout", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "token expired");
}

#[tokio::test]
async fn test_store_outage_fails_closed() {
    let app = TestApp::new();
    let token = app.user_token(Uuid::new_v4());
    app.revocation.set_failing(true);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "internal server error");
    assert!(json.get("data").is_none());
}

// =============================================================================
// Authorization Gate Tests
// =============================================================================

#[tokio::test]
async fn test_owner_cannot_reach_admin_only_route() {
    let app = TestApp::new();
    let token = app.admin_token(ROLE_OWNER);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/shops", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "failed to authorize user");
}

#[tokio::test]
async fn test_owner_can_reach_admin_or_owner_route() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Warung Bu Tini").await;
    let token = app.admin_token(ROLE_OWNER);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/shops/{shop_id}"), Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["shop_name"], "Warung Bu Tini");
}

#[tokio::test]
async fn test_user_role_cannot_manage_menus() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Kantin Sehat").await;
    let token = app.user_token(Uuid::new_v4());

    let (status, _) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/menus",
            Some(&token),
            Some(json!({
                "menu_name": "Es Teh",
                "shop_id": shop_id,
                "menu_price": 3000,
                "menu_status": "available"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_role_is_forbidden() {
    let app = TestApp::new();
    let token = app.admin_token(&Uuid::new_v4().to_string());

    let (status, _) = send(
        &app.router,
        create_json_request("GET", "/api/v1/shops", Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Login and Logout Tests
// =============================================================================

#[tokio::test]
async fn test_login_then_logout_revokes_session() {
    let app = TestApp::new();
    let admin = app.admin_token(ROLE_ADMIN);

    let (status, _) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/owners",
            Some(&admin),
            Some(json!({
                "fullname": "Tini Suryani",
                "wa_number": "081234567890",
                "username": "tini",
                "password": "warung-secret"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "tini", "password": "warung-secret"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["token_type"], "Bearer");
    let token = json["data"]["access_token"].as_str().unwrap().to_string();

    // The session carries the Owner role
    let (status, _) = send(
        &app.router,
        create_json_request("GET", "/api/v1/shops", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &app.router,
        create_json_request("POST", "/api/v1/auth/logout", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "successfully logged out");

    let (status, _) = send(
        &app.router,
        create_json_request("POST", "/api/v1/auth/logout", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_unknown_user_is_forbidden() {
    let app = TestApp::new();

    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "nobody", "password": "whatever"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "invalid username or password");
}

#[tokio::test]
async fn test_login_with_malformed_body_is_bad_request() {
    let app = TestApp::new();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "fail");
}

// =============================================================================
// Resource Tests
// =============================================================================

#[tokio::test]
async fn test_created_shop_id_is_encoded() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Kedai Kopi").await;

    let decoded = canteen_core::ids::decode_uuid(&shop_id).unwrap();
    assert_ne!(shop_id, decoded.to_string());
}

#[tokio::test]
async fn test_raw_uuid_in_path_is_bad_request() {
    let app = TestApp::new();
    let token = app.admin_token(ROLE_ADMIN);

    let (status, _) = send(
        &app.router,
        create_json_request(
            "GET",
            &format!("/api/v1/shops/{}", Uuid::new_v4()),
            Some(&token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_shop_is_not_found() {
    let app = TestApp::new();
    let token = app.admin_token(ROLE_ADMIN);
    let id = canteen_core::ids::encode(&Uuid::new_v4());

    let (status, json) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/shops/{id}"), Some(&token), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "item not found");
}

#[tokio::test]
async fn test_public_menu_listing_needs_no_token() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Kantin Tengah").await;
    let menu_id = create_menu(&app, &shop_id).await;

    let (status, json) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/menus?shop_id={shop_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/menus/{menu_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["menu_name"], "Nasi Goreng");
    assert_eq!(json["data"]["menu_price"], 15000);
    assert_eq!(json["data"]["menu_status"], "available");
}

#[tokio::test]
async fn test_menu_for_unknown_shop_is_bad_request() {
    let app = TestApp::new();
    let token = app.admin_token(ROLE_ADMIN);
    let shop_id = canteen_core::ids::encode(&Uuid::new_v4());

    let (status, _) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/menus",
            Some(&token),
            Some(json!({
                "menu_name": "Soto",
                "shop_id": shop_id,
                "menu_price": 12000,
                "menu_status": "available"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_is_placed_for_token_subject() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Kantin Timur").await;
    let menu_id = create_menu(&app, &shop_id).await;
    let user_id = Uuid::new_v4();
    let token = app.user_token(user_id);

    let (status, json) = send(
        &app.router,
        create_json_request(
            "POST",
            "/api/v1/orders",
            Some(&token),
            Some(json!({"menu_id": menu_id, "payment_method": "qris"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(
        json["data"]["user_id"],
        canteen_core::ids::encode(&user_id).as_str()
    );
    let order_id = json["data"]["order_id"].as_str().unwrap().to_string();

    // Only staff may move an order along
    let update = json!({"status": "paid", "payment_method": "qris"});
    let (status, _) = send(
        &app.router,
        create_json_request(
            "PUT",
            &format!("/api/v1/orders/{order_id}"),
            Some(&token),
            Some(update.clone()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let owner = app.admin_token(ROLE_OWNER);
    let (status, _) = send(
        &app.router,
        create_json_request(
            "PUT",
            &format!("/api/v1/orders/{order_id}"),
            Some(&owner),
            Some(update),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/orders/{order_id}"), Some(&token), None),
    )
    .await;
    assert_eq!(json["data"]["status"], "paid");
}

#[tokio::test]
async fn test_duplicate_owner_username_conflicts() {
    let app = TestApp::new();
    let admin = app.admin_token(ROLE_ADMIN);
    let body = json!({
        "fullname": "Budi",
        "wa_number": "0811111111",
        "username": "budi",
        "password": "kantin-budi-1"
    });

    let (status, json) = send(
        &app.router,
        create_json_request("POST", "/api/v1/owners", Some(&admin), Some(body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["data"].get("password").is_none());

    let (status, _) = send(
        &app.router,
        create_json_request("POST", "/api/v1/owners", Some(&admin), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_owner_manages_only_own_profile() {
    let app = TestApp::new();
    let sri_id = create_owner(&app, "bu-sri").await;
    let budi_id = create_owner(&app, "pak-budi").await;
    let sri = app.token_for(
        ids::decode_uuid(&sri_id).unwrap(),
        &app.state.config.auth.admin_role_class,
        ROLE_OWNER,
    );
    let profile = json!({
        "fullname": "Sri Wahyuni",
        "wa_number": "081234567890",
        "username": "bu-sri",
        "password": ""
    });

    let (status, _) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/owners/{sri_id}"), Some(&sri), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        create_json_request(
            "PUT",
            &format!("/api/v1/owners/{sri_id}"),
            Some(&sri),
            Some(profile),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        create_json_request("GET", &format!("/api/v1/owners/{budi_id}"), Some(&sri), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        create_json_request(
            "PUT",
            &format!("/api/v1/owners/{budi_id}"),
            Some(&sri),
            Some(json!({
                "fullname": "Budi",
                "wa_number": "081234567890",
                "username": "pak-budi",
                "password": "dibajak-sri-1"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(login(&app, "pak-budi", "warung-secret").await, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_account_cannot_be_overwritten_through_owner_routes() {
    let app = TestApp::new();
    let admin_role = app.state.roles.find_by_name(ROLE_ADMIN).await.unwrap();
    let root = Owner::new(
        "Root",
        "080000000000",
        "root",
        hash_password("root-password").unwrap(),
    )
    .with_role(admin_role.id);
    app.state.repos.owners.insert(&root).await.unwrap();
    let root_id = ids::encode(&root.id);
    let takeover = json!({
        "fullname": "Mallory",
        "wa_number": "081234567890",
        "username": "root",
        "password": "taken-over-1"
    });

    let owner = app.admin_token(ROLE_OWNER);
    let (status, _) = send(
        &app.router,
        create_json_request(
            "PUT",
            &format!("/api/v1/owners/{root_id}"),
            Some(&owner),
            Some(takeover.clone()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin accounts are not owner records, even for an admin caller
    let admin = app.admin_token(ROLE_ADMIN);
    for (method, body) in [("PUT", Some(takeover)), ("DELETE", None)] {
        let (status, _) = send(
            &app.router,
            create_json_request(method, &format!("/api/v1/owners/{root_id}"), Some(&admin), body),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/owners", Some(&admin), None),
    )
    .await;
    assert!(json["data"].as_array().unwrap().is_empty());

    assert_eq!(login(&app, "root", "taken-over-1").await, StatusCode::FORBIDDEN);
    assert_eq!(login(&app, "root", "root-password").await, StatusCode::OK);
}

#[tokio::test]
async fn test_orders_are_scoped_to_their_user() {
    let app = TestApp::new();
    let shop_id = create_shop(&app, "Kantin Barat").await;
    let other_shop_id = create_shop(&app, "Kantin Utara").await;
    let menu_id = create_menu(&app, &shop_id).await;
    let alice = app.user_token(Uuid::new_v4());
    let bob = app.user_token(Uuid::new_v4());

    let (status, json) = place_order(&app, &alice, &menu_id).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = json["data"]["order_id"].as_str().unwrap().to_string();
    let order_uri = format!("/api/v1/orders/{order_id}");

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].as_array().unwrap().is_empty());

    let (_, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&alice), None),
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    for method in ["GET", "DELETE"] {
        let (status, _) = send(
            &app.router,
            create_json_request(method, &order_uri, Some(&bob), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // Staff see every order and may narrow by shop
    let owner = app.admin_token(ROLE_OWNER);
    for (uri, expected) in [
        ("/api/v1/orders".to_string(), 1),
        (format!("/api/v1/orders?shop_id={shop_id}"), 1),
        (format!("/api/v1/orders?shop_id={other_shop_id}"), 0),
    ] {
        let (status, json) = send(
            &app.router,
            create_json_request("GET", &uri, Some(&owner), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), expected, "{uri}");
    }

    let (status, _) = send(
        &app.router,
        create_json_request("DELETE", &order_uri, Some(&alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_placement_is_rate_limited_per_user() {
    let app = TestApp::new();
    let limit = app.state.config.server.order_rate_limit_per_hour;
    assert_eq!(limit, 50);
    let shop_id = create_shop(&app, "Kantin Ramai").await;
    let menu_id = create_menu(&app, &shop_id).await;
    let alice = app.user_token(Uuid::new_v4());

    for _ in 0..limit {
        let (status, _) = place_order(&app, &alice, &menu_id).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app
        .router
        .clone()
        .oneshot(create_json_request(
            "POST",
            "/api/v1/orders",
            Some(&alice),
            Some(json!({"menu_id": menu_id, "payment_method": "cash"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // The budget is per user, and reading is not limited
    let bob = app.user_token(Uuid::new_v4());
    let (status, _) = place_order(&app, &bob, &menu_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/orders", Some(&alice), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), limit as usize);
}

#[tokio::test]
async fn test_order_rate_limit_can_be_disabled() {
    let mut config = AppConfig::default();
    config.server.order_rate_limit_per_hour = 0;
    let app = TestApp::with_config(config);
    let shop_id = create_shop(&app, "Kantin Sepi").await;
    let menu_id = create_menu(&app, &shop_id).await;
    let alice = app.user_token(Uuid::new_v4());

    for _ in 0..60 {
        let (status, _) = place_order(&app, &alice, &menu_id).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

// =============================================================================
// API Key Gate Tests
// =============================================================================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let mut config = AppConfig::default();
    config.auth.api_key = Some("kantin-key".to_string());
    let app = TestApp::with_config(config);

    let (status, json) = send(
        &app.router,
        create_json_request("GET", "/api/v1/menus", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid api key");

    let request = Request::builder()
        .uri("/api/v1/menus")
        .header("x-api-key", "Key kantin-key")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    // Health probes sit outside the gate
    let (status, _) = send(
        &app.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
