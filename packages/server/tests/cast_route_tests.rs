//! Cast routes over HTTP: authorization statuses, redirect notices and the
//! manager-roster rules.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use test_context::test_context;

use crate::common::{TestClient, TestHarness};
use rollcall_core::domains::casts::actions;
use rollcall_core::domains::casts::models::CastMembership;

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_pages_require_login(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Private ", &founder).await;
    let anonymous = TestClient::new(ctx.app());

    let response = anonymous
        .get(&format!("/casts/{}/admin/managers", cast.slug))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = anonymous
        .post(
            &format!("/casts/{}/admin/members", cast.slug),
            json!({ "username": founder.username() }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.error().is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_pages_refuse_non_managers(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let member = ctx.account("member").await;
    let cast = ctx.cast("Guarded ", &founder).await;
    actions::add_member(&cast, Some(founder.profile.id), member.username(), &ctx.db_pool)
        .await
        .unwrap();

    let client = TestClient::with_token(ctx.app(), &member.token);

    let response = client.get(&format!("/casts/{}/admin/requests", cast.slug)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = client
        .post(
            &format!("/casts/{}/admin/blocked/{}", cast.slug, founder.profile.id),
            json!({}),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let standing = CastMembership::standing(cast.id, founder.profile.id, &ctx.db_pool)
        .await
        .unwrap();
    assert!(!standing.blocked);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn invalid_token_is_treated_as_anonymous(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Forged ", &founder).await;

    let client = TestClient::with_token(ctx.app(), "not-a-token");
    let response = client.post(&format!("/casts/{}/join", cast.slug), json!({})).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = client.get(&format!("/casts/{}", cast.slug)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["viewer"]["show_management"], false);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn last_manager_cannot_be_removed(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Lonely ", &founder).await;
    let client = TestClient::with_token(ctx.app(), &founder.token);

    let response = client
        .post(
            &format!(
                "/casts/{}/admin/managers/{}/delete",
                cast.slug, founder.profile.id
            ),
            json!({}),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/casts/{}/admin/managers", cast.slug).as_str())
    );
    assert_eq!(response.notice_level(), Some("error"));
    assert_eq!(
        response.notice(),
        Some("Casts must have at least one manager")
    );

    let standing = CastMembership::standing(cast.id, founder.profile.id, &ctx.db_pool)
        .await
        .unwrap();
    assert!(standing.manager);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn managers_cannot_remove_themselves(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let second = ctx.account("second").await;
    let cast = ctx.cast("Pair ", &founder).await;
    let client = TestClient::with_token(ctx.app(), &founder.token);

    let response = client
        .post(
            &format!("/casts/{}/admin/members", cast.slug),
            json!({ "username": second.username() }),
        )
        .await;
    assert_eq!(response.notice_level(), Some("success"));

    let response = client
        .post(
            &format!("/casts/{}/admin/managers", cast.slug),
            json!({ "username": second.username() }),
        )
        .await;
    assert_eq!(response.notice_level(), Some("success"));

    let response = client
        .post(
            &format!(
                "/casts/{}/admin/managers/{}/delete",
                cast.slug, founder.profile.id
            ),
            json!({}),
        )
        .await;
    assert_eq!(response.notice(), Some("You cannot remove yourself"));

    // The other manager can do it
    let second_client = TestClient::with_token(ctx.app(), &second.token);
    let response = second_client
        .post(
            &format!(
                "/casts/{}/admin/managers/{}/delete",
                cast.slug, founder.profile.id
            ),
            json!({}),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.notice_level(), Some("success"));

    let managers = actions::list_managers(&cast, Some(second.profile.id), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(managers.len(), 1);
    assert_eq!(managers[0].id, second.profile.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_username_is_reported(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Typos ", &founder).await;
    let client = TestClient::with_token(ctx.app(), &founder.token);

    let response = client
        .post(
            &format!("/casts/{}/admin/members", cast.slug),
            json!({ "username": "nobody-by-this-name" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.notice_level(), Some("error"));
    assert!(response.notice().unwrap().contains("nobody-by-this-name"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn join_request_round_trip(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let fan = ctx.account("fan").await;
    let cast = ctx.cast("Open Doors ", &founder).await;

    let fan_client = TestClient::with_token(ctx.app(), &fan.token);
    let response = fan_client
        .post(&format!("/casts/{}/join", cast.slug), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(
        response.location.as_deref(),
        Some(format!("/casts/{}", cast.slug).as_str())
    );
    assert_eq!(response.notice_level(), Some("success"));

    let home = fan_client.get(&format!("/casts/{}", cast.slug)).await;
    assert_eq!(home.body["viewer"]["has_requested_membership"], true);

    let manager_client = TestClient::with_token(ctx.app(), &founder.token);
    let requests = manager_client
        .get(&format!("/casts/{}/admin/requests", cast.slug))
        .await;
    assert_eq!(requests.status, StatusCode::OK);
    assert_eq!(requests.body.as_array().unwrap().len(), 1);

    let response = manager_client
        .post(
            &format!(
                "/casts/{}/admin/requests/{}/approve",
                cast.slug, fan.profile.id
            ),
            json!({}),
        )
        .await;
    assert_eq!(response.notice_level(), Some("success"));

    let roster = fan_client
        .get(&format!("/casts/{}/members", cast.slug))
        .await;
    assert_eq!(roster.status, StatusCode::OK);
    assert_eq!(roster.body["total"], 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn blocked_profile_sees_blocked_notice(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let troll = ctx.account("troll").await;
    let cast = ctx.cast("No Trolls ", &founder).await;

    let manager_client = TestClient::with_token(ctx.app(), &founder.token);
    let response = manager_client
        .post(
            &format!("/casts/{}/admin/blocked/{}", cast.slug, troll.profile.id),
            json!({}),
        )
        .await;
    assert_eq!(response.notice_level(), Some("success"));

    let troll_client = TestClient::with_token(ctx.app(), &troll.token);
    let response = troll_client
        .post(&format!("/casts/{}/join", cast.slug), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.notice_level(), Some("error"));
    assert!(response.notice().unwrap().contains("blocked"));

    let home = troll_client.get(&format!("/casts/{}", cast.slug)).await;
    assert_eq!(home.body["viewer"]["is_blocked"], true);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_cast_is_not_found(ctx: &TestHarness) {
    let client = TestClient::new(ctx.app());
    let response = client.get("/casts/no-such-cast-anywhere").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), Some("Cast not found"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn roster_refuses_unreachable_pages(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Paged ", &founder).await;
    let client = TestClient::new(ctx.app());

    let response = client
        .get(&format!("/casts/{}/members?page={}", cast.slug, i64::MAX))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), Some("page must be 1 or greater"));
}
