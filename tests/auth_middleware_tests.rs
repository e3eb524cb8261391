//! Tests for the plain access-token middleware.
//!
//! The middleware only verifies the bearer token: it never consults the user
//! store and never renews an expired token.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{
    Chain, TestState, body_json, expired_access_token, foreign_token_service, new_access_token,
    request, test_router, user,
};
use storefront::db::UserRole;
use tower::ServiceExt;

#[tokio::test]
async fn test_valid_access_token_attaches_principal() {
    let state = TestState::new();
    let access = state.tokens.issue_access_token(&user(7)).unwrap();

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(new_access_token(&response).is_none());

    let json = body_json(response).await;
    assert_eq!(json["id"], 7);
    assert_eq!(json["role"], "user");

    assert_eq!(state.handled(), 1);
    assert_eq!(state.users.lookups(), 0);
}

#[tokio::test]
async fn test_admin_role_is_carried() {
    let state = TestState::new();
    let admin = storefront::auth::Principal {
        id: 1,
        role: UserRole::Admin,
    };
    let access = state.tokens.issue_access_token(&admin).unwrap();

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "admin");
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let state = TestState::new();

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NO_ACCESS_TOKEN");
    assert_eq!(json["message"], "Token no proporcionado");

    assert_eq!(state.handled(), 0);
    assert_eq!(state.users.lookups(), 0);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_missing_token() {
    let state = TestState::new();
    let access = state.tokens.issue_access_token(&user(7)).unwrap();

    for value in [
        format!("Basic {}", access),
        format!("bearer {}", access),
        access.clone(),
    ] {
        let response = test_router(&state, Chain::Auth)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("authorization", value)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "NO_ACCESS_TOKEN");
    }

    assert_eq!(state.handled(), 0);
}

#[tokio::test]
async fn test_expired_token_is_not_refreshed() {
    let state = TestState::new();
    let refresh = state.tokens.issue_refresh_token(&user(7)).unwrap();
    state.users.insert(7, UserRole::User, Some(&refresh));
    let access = expired_access_token(&state.tokens, &user(7));

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&access), Some(&refresh)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(new_access_token(&response).is_none());
    assert_eq!(body_json(response).await["code"], "TOKEN_EXPIRED");

    assert_eq!(state.handled(), 0);
    assert_eq!(state.users.lookups(), 0);
}

#[tokio::test]
async fn test_wrong_secret_is_invalid() {
    let state = TestState::new();
    let access = foreign_token_service().issue_access_token(&user(7)).unwrap();

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_expired_token_with_wrong_secret_is_invalid_not_expired() {
    let state = TestState::new();
    let access = expired_access_token(&foreign_token_service(), &user(7));

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_malformed_tokens_are_invalid() {
    let state = TestState::new();

    for token in ["", "not-a-jwt", "a.b.c"] {
        let response = test_router(&state, Chain::Auth)
            .oneshot(request("GET", "/whoami", Some(token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{token:?}");
        assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
    }

    assert_eq!(state.handled(), 0);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let state = TestState::new();
    let refresh = state.tokens.issue_refresh_token(&user(7)).unwrap();

    let response = test_router(&state, Chain::Auth)
        .oneshot(request("GET", "/whoami", Some(&refresh), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_same_token_twice_yields_same_principal() {
    let state = TestState::new();
    let access = state.tokens.issue_access_token(&user(7)).unwrap();
    let app = test_router(&state, Chain::Auth);

    let first = app
        .clone()
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();
    let second = app
        .oneshot(request("GET", "/whoami", Some(&access), None))
        .await
        .unwrap();

    assert_eq!(body_json(first).await, body_json(second).await);
    assert_eq!(state.handled(), 2);
}
