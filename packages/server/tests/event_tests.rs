//! Event management, the upcoming calendar and the expired-event sweep.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use test_context::test_context;

use crate::common::{days_from_today, event_input, today, TestClient, TestHarness};
use rollcall_core::domains::events::actions::{
    clean_expired_events, create_event, delete_event, upcoming_calendar, update_event,
    EventError, UpcomingArgs,
};
use rollcall_core::domains::events::models::Event;

#[test_context(TestHarness)]
#[tokio::test]
async fn only_managers_schedule_events(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let outsider = ctx.account("outsider").await;
    let cast = ctx.cast("Schedulers ", &founder).await;

    let err = create_event(
        cast.id,
        Some(outsider.profile.id),
        event_input("Crashed Show", days_from_today(7)),
        &ctx.db_pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EventError::Auth(_)));

    let event = create_event(
        cast.id,
        Some(founder.profile.id),
        event_input("  Opening Night  ", days_from_today(7)),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(event.name, "Opening Night");

    let err = update_event(
        event.id,
        Some(outsider.profile.id),
        event_input("Renamed", days_from_today(8)),
        &ctx.db_pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EventError::Auth(_)));

    let deleted = delete_event(event.id, Some(founder.profile.id), &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(deleted.cast_slug, cast.slug);
    assert!(Event::find_by_id(event.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn new_event_route_redirects_to_event(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Routed ", &founder).await;
    let client = TestClient::with_token(ctx.app(), &founder.token);

    let response = client
        .post(
            &format!("/events/new/{}", cast.slug),
            json!({
                "name": "Midnight Madness",
                "venue": "Riverview Theater",
                "date": days_from_today(10).to_string(),
                "start_time": "23:45:00",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.notice_level(), Some("success"));
    let location = response.location.unwrap();
    assert!(location.starts_with("/events/"));

    let event = client.get(&location).await;
    assert_eq!(event.status, StatusCode::OK);
    assert_eq!(event.body["name"], "Midnight Madness");
    assert_eq!(event.body["cast_slug"], cast.slug.as_str());

    let response = client
        .post(
            &format!("/events/new/{}", cast.slug),
            json!({
                "name": "   ",
                "venue": "Riverview Theater",
                "date": days_from_today(10).to_string(),
                "start_time": "23:45:00",
            }),
        )
        .await;
    assert_eq!(response.notice_level(), Some("error"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upcoming_calendar_groups_by_date(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Calendar ", &founder).await;

    ctx.event(&cast, "Past Show", days_from_today(-1)).await;
    ctx.event(&cast, "Friday Late", days_from_today(2)).await;
    ctx.event(&cast, "Friday Later", days_from_today(2)).await;
    ctx.event(&cast, "Next Week", days_from_today(6)).await;
    ctx.event(&cast, "Next Month", days_from_today(40)).await;

    let args = UpcomingArgs {
        days: Some(14),
        limit: None,
        cast: Some(cast.slug.clone()),
    };
    let days = upcoming_calendar(&args, today(), &ctx.db_pool).await.unwrap();

    let dates: Vec<_> = days.iter().map(|day| day.date).collect();
    assert_eq!(dates, vec![days_from_today(2), days_from_today(6)]);
    assert_eq!(days[0].events.len(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn upcoming_calendar_rejects_bad_windows(ctx: &TestHarness) {
    let args = UpcomingArgs {
        days: Some(0),
        limit: None,
        cast: None,
    };
    let err = upcoming_calendar(&args, today(), &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::InvalidWindow { .. }));

    let args = UpcomingArgs {
        days: None,
        limit: None,
        cast: Some("no-such-cast-anywhere".to_string()),
    };
    let err = upcoming_calendar(&args, today(), &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EventError::CastNotFound));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn cleanup_removes_only_expired_events(ctx: &TestHarness) {
    let founder = ctx.account("founder").await;
    let cast = ctx.cast("Archive ", &founder).await;

    let ancient = ctx.event(&cast, "Ancient Show", days_from_today(-200)).await;
    let recent = ctx.event(&cast, "Recent Show", days_from_today(-30)).await;
    let edge = ctx.event(&cast, "Edge Show", days_from_today(-90)).await;
    let future = ctx.event(&cast, "Future Show", days_from_today(30)).await;

    let report = clean_expired_events(today(), true, &ctx.db_pool)
        .await
        .unwrap();
    assert!(report.dry_run);
    assert!(report.expired >= 1);
    assert_eq!(report.deleted, 0);
    assert!(Event::find_by_id(ancient.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_some());

    let report = clean_expired_events(today(), false, &ctx.db_pool)
        .await
        .unwrap();
    assert!(report.deleted >= 1);

    assert!(Event::find_by_id(ancient.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_none());
    for kept in [&recent, &edge, &future] {
        assert!(
            Event::find_by_id(kept.id, &ctx.db_pool)
                .await
                .unwrap()
                .is_some(),
            "{} should survive cleanup",
            kept.name
        );
    }
}
