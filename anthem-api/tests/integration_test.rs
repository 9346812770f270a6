/// Integration tests for the Anthem API
///
/// These tests drive the router end-to-end against a real database:
/// - Registration, login, and token flows
/// - Temporal token redemption (email verification, password reset)
/// - CRUD contracts (create returns the entity, missing ids answer 404,
///   duplicates answer 409, soft deletes flip flags)
/// - Authorization guards (admin, self, church, band)

mod common;

use anthem_shared::models::membership::Membership;
use anthem_shared::models::temporal_token::{TemporalToken, TokenPurpose};
use anthem_shared::models::user::{User, UserStatus};
use axum::http::StatusCode;
use common::{bare_request, body_json, json_request, TestContext};
use serde_json::json;
use tower::Service as _;

#[tokio::test]
async fn test_register_login_refresh() {
    let ctx = TestContext::new().await.unwrap();
    let email = format!("register-{}@example.com", uuid::Uuid::new_v4());

    // Register
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/register")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({
                        "email": email,
                        "password": "Test-P@ssw0rd",
                        "name": "New User"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let registered = body_json(response).await;
    assert!(registered["access_token"].is_string());
    assert!(registered["refresh_token"].is_string());

    // Login
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "email": email, "password": "Test-P@ssw0rd" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let logged_in = body_json(response).await;
    let refresh_token = logged_in["refresh_token"].as_str().unwrap().to_string();

    // Refresh
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/refresh")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "refresh_token": refresh_token }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Cleanup the registered user
    let user_id: uuid::Uuid = registered["user_id"].as_str().unwrap().parse().unwrap();
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_wrong_password_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "email": ctx.member.email, "password": "Wrong-P@ss1" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let ctx = TestContext::new().await.unwrap();

    // An access token is not a refresh token
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/refresh")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "refresh_token": ctx.member_token }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_email_verification_token_is_single_use() {
    let ctx = TestContext::new().await.unwrap();

    let (secret, _) =
        TemporalToken::issue(&ctx.db, ctx.member.id, TokenPurpose::EmailVerification)
            .await
            .unwrap();

    // First redemption verifies the email
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/verify-email")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(json!({ "token": secret }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let user = User::find_by_id(&ctx.db, ctx.member.id).await.unwrap().unwrap();
    assert!(user.email_verified);

    // Second redemption fails
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/verify-email")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(json!({ "token": secret }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new().await.unwrap();

    // Request: always 200, even for unknown emails
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/password-reset/request")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "email": "nobody@example.com" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Confirm with a real token
    let (secret, _) = TemporalToken::issue(&ctx.db, ctx.member.id, TokenPurpose::PasswordReset)
        .await
        .unwrap();

    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/password-reset/confirm")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "token": secret, "new_password": "Fresh-P@ssw0rd1" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The new password logs in
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "email": ctx.member.email, "password": "Fresh-P@ssw0rd1" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_get_missing_church_returns_404() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "GET",
            &format!("/v1/churches/{}", uuid::Uuid::new_v4()),
            &ctx.member_auth(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_church_crud_requires_admin() {
    let ctx = TestContext::new().await.unwrap();

    // Member cannot create a church
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/churches",
            &ctx.member_auth(),
            json!({ "name": "Forbidden Church" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin can
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            "/v1/churches",
            &ctx.admin_auth(),
            json!({ "name": "New Life Chapel", "city": "Springfield" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let church = body_json(response).await;
    assert_eq!(church["name"], "New Life Chapel");

    // And fetch it back
    let church_id = church["id"].as_str().unwrap();
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "GET",
            &format!("/v1/churches/{}", church_id),
            &ctx.member_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("DELETE FROM churches WHERE id = $1::uuid")
        .bind(church_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("GET")
                .uri("/v1/churches")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_band_lifecycle_and_duplicate_name_conflict() {
    let ctx = TestContext::new().await.unwrap();
    let uri = format!("/v1/churches/{}/bands", ctx.church.id);

    // Church member creates a band
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &uri,
            &ctx.member_auth(),
            json!({ "name": "Sunday Worship" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let band = body_json(response).await;
    let band_id = band["id"].as_str().unwrap().to_string();

    // Same name in the same church conflicts
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &uri,
            &ctx.member_auth(),
            json!({ "name": "Sunday Worship" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The creator is the first member
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "GET",
            &format!("/v1/bands/{}/members", band_id),
            &ctx.member_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let members = body_json(response).await;
    assert_eq!(members.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_lyric_position_conflict() {
    let ctx = TestContext::new().await.unwrap();

    // Build a band and a song
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &format!("/v1/churches/{}/bands", ctx.church.id),
            &ctx.member_auth(),
            json!({ "name": "Lyric Testers" }),
        ))
        .await
        .unwrap();
    let band = body_json(response).await;
    let band_id = band["id"].as_str().unwrap();

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &format!("/v1/bands/{}/songs", band_id),
            &ctx.member_auth(),
            json!({ "title": "Amazing Grace", "musical_key": "G" }),
        ))
        .await
        .unwrap();
    let song = body_json(response).await;
    let song_id = song["id"].as_str().unwrap();

    // First section lands at position 1
    let lyrics_uri = format!("/v1/songs/{}/lyrics", song_id);
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &lyrics_uri,
            &ctx.member_auth(),
            json!({ "position": 1, "heading": "Verse 1", "body": "Amazing grace..." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second section at the same position conflicts
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &lyrics_uri,
            &ctx.member_auth(),
            json!({ "position": 1, "body": "...how sweet the sound" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A free position is fine
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &lyrics_uri,
            &ctx.member_auth(),
            json!({ "position": 2, "body": "...how sweet the sound" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_user_soft_delete_blocks_login() {
    let ctx = TestContext::new().await.unwrap();

    // Soft-delete the member account (self)
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "DELETE",
            &format!("/v1/users/{}", ctx.member.id),
            &ctx.member_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The row survives with status inactive
    let user = User::find_by_id(&ctx.db, ctx.member.id).await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Inactive);

    // And can no longer log in
    let response = ctx
        .app
        .clone()
        .call(
            axum::http::Request::builder()
                .method("POST")
                .uri("/v1/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({ "email": ctx.member.email, "password": "Test-P@ssw0rd" })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_member_cannot_read_other_users() {
    let ctx = TestContext::new().await.unwrap();

    // Member reading the admin's account is forbidden
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "GET",
            &format!("/v1/users/{}", ctx.admin.id),
            &ctx.member_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin reading the member's account is fine
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "GET",
            &format!("/v1/users/{}", ctx.member.id),
            &ctx.admin_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_membership_soft_delete() {
    let ctx = TestContext::new().await.unwrap();

    let membership =
        Membership::find_by_church_and_user(&ctx.db, ctx.church.id, ctx.member.id)
            .await
            .unwrap()
            .unwrap();
    assert!(membership.active);
    assert!(membership.until.is_none());

    // Admin removes the member (pastor-or-admin guard)
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "DELETE",
            &format!("/v1/churches/{}/members/{}", ctx.church.id, membership.id),
            &ctx.admin_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The row survives, deactivated and closed
    let membership = Membership::find_by_id(&ctx.db, membership.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!membership.active);
    assert!(membership.until.is_some());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_subscription_reactivates_on_resubscribe() {
    let ctx = TestContext::new().await.unwrap();

    // Build a band to follow
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &format!("/v1/churches/{}/bands", ctx.church.id),
            &ctx.member_auth(),
            json!({ "name": "Subscribable" }),
        ))
        .await
        .unwrap();
    let band = body_json(response).await;
    let band_id = band["id"].as_str().unwrap().to_string();
    let sub_uri = format!("/v1/bands/{}/subscriptions", band_id);

    // Subscribe
    let response = ctx
        .app
        .clone()
        .call(bare_request("POST", &sub_uri, &ctx.member_auth()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;

    // Unsubscribe
    let response = ctx
        .app
        .clone()
        .call(bare_request("DELETE", &sub_uri, &ctx.member_auth()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Unsubscribing twice answers 404
    let response = ctx
        .app
        .clone()
        .call(bare_request("DELETE", &sub_uri, &ctx.member_auth()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Re-subscribing reuses the original row
    let response = ctx
        .app
        .clone()
        .call(bare_request("POST", &sub_uri, &ctx.member_auth()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["active"], true);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_member_role_assignment_conflict() {
    let ctx = TestContext::new().await.unwrap();

    let membership =
        Membership::find_by_church_and_user(&ctx.db, ctx.church.id, ctx.member.id)
            .await
            .unwrap()
            .unwrap();
    let roles_uri = format!(
        "/v1/churches/{}/members/{}/roles",
        ctx.church.id, membership.id
    );

    // Admin assigns the musician role
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &roles_uri,
            &ctx.admin_auth(),
            json!({ "role": "musician" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let assignment = body_json(response).await;
    let role_id = assignment["id"].as_str().unwrap();

    // A second open assignment of the same role conflicts
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &roles_uri,
            &ctx.admin_auth(),
            json!({ "role": "musician" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Ending the assignment frees the role for re-assignment
    let response = ctx
        .app
        .clone()
        .call(bare_request(
            "DELETE",
            &format!("{}/{}", roles_uri, role_id),
            &ctx.admin_auth(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .clone()
        .call(json_request(
            "POST",
            &roles_uri,
            &ctx.admin_auth(),
            json!({ "role": "musician" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}
