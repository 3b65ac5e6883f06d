mod common;

use axum::http::StatusCode;
use futures_util::future::join_all;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use leadbridge_api::entities::lead;

#[tokio::test]
async fn valid_contact_details_are_auto_verified() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    let (status, body) =
        common::book(&app.router, &guest, &event_id, "guest@example.com", "+91 98765-43210").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["autoVerified"], true);
    assert_eq!(body["eventTitle"], "Intro to Rust");
    assert_eq!(body["lead"]["status"], "VERIFIED");
    assert_eq!(body["lead"]["verificationStatus"], "AUTO_VERIFIED");

    assert_eq!(common::event_slots(&app.router, &event_id).await, 4);
}

#[tokio::test]
async fn questionable_contact_details_stay_pending() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    let (status, body) = common::book(&app.router, &guest, &event_id, "bad@", "12345").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["autoVerified"], false);
    assert_eq!(body["lead"]["status"], "PENDING");
    assert_eq!(body["lead"]["verificationStatus"], "PENDING");

    // pending bookings still hold a slot
    assert_eq!(common::event_slots(&app.router, &event_id).await, 4);
}

#[tokio::test]
async fn booking_sends_confirmation_and_host_notice() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    common::book_verified(&app.router, &guest, &event_id).await;

    assert!(
        app.mailer
            .subjects_to("guest@example.com")
            .contains(&"Booking received: Intro to Rust".to_string())
    );
    assert!(
        app.mailer
            .subjects_to("host@example.com")
            .contains(&"New verified lead for Intro to Rust".to_string())
    );
}

#[tokio::test]
async fn full_event_rejects_booking_without_creating_lead() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 1, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    common::book_verified(&app.router, &guest, &event_id).await;

    let (status, body) =
        common::book(&app.router, &guest, &event_id, "guest@example.com", "9876543210").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "NO_CAPACITY");

    let leads = lead::Entity::find().count(&app.db).await.unwrap_or_default();
    assert_eq!(leads, 1);
    assert_eq!(common::event_slots(&app.router, &event_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_oversell() {
    let app = common::test_app_pooled().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 3, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    let attempts = (0..8).map(|_| {
        let router = app.router.clone();
        let guest = guest.clone();
        let event_id = event_id.clone();
        tokio::spawn(async move {
            common::book(&router, &guest, &event_id, "guest@example.com", "9876543210").await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(results.len(), 8);

    let created = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    let refused = results
        .iter()
        .filter(|(status, body)| {
            *status == StatusCode::CONFLICT && body["error"]["code"] == "NO_CAPACITY"
        })
        .count();

    assert_eq!(created, 3, "{results:?}");
    assert_eq!(refused, 5, "{results:?}");
    assert_eq!(common::event_slots(&app.router, &event_id).await, 0);

    let leads = lead::Entity::find().count(&app.db).await.unwrap_or_default();
    assert_eq!(leads, 3);
}

#[tokio::test]
async fn oversized_contact_fields_are_rejected() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let uri = format!("/api/v1/events/{event_id}/book");

    let long_email = format!("{}@example.com", "g".repeat(250));
    let cases = [
        json!({ "name": "n".repeat(101), "email": "guest@example.com", "phone": "9876543210" }),
        json!({ "name": "Guest", "email": long_email, "phone": "9876543210" }),
        json!({
            "name": "Guest",
            "email": "guest@example.com",
            "phone": "+91 9876 5432 10 ext 12345678901234",
        }),
    ];
    for body in &cases {
        let (status, error) = common::post_json_with_auth(&app.router, &uri, body, &guest).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(error["error"]["code"], "VALIDATION_ERROR");
    }

    // a name at the limit is fine
    let (status, _) = common::post_json_with_auth(
        &app.router,
        &uri,
        &json!({ "name": "n".repeat(100), "email": "guest@example.com", "phone": "9876543210" }),
        &guest,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let leads = lead::Entity::find().count(&app.db).await.unwrap_or_default();
    assert_eq!(leads, 1);
    assert_eq!(common::event_slots(&app.router, &event_id).await, 4);
}

#[tokio::test]
async fn unapproved_mentor_events_are_hidden() {
    let app = common::test_app().await;
    let (mentor, profile_id) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;

    let admin = common::admin_token(&app.router).await;
    let (status, _) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/admin/mentors/{profile_id}/verify"),
        &json!({ "status": "REJECTED" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, events) = common::get(&app.router, "/api/v1/events").await;
    assert_eq!(events.as_array().map(Vec::len), Some(0));

    let (status, _) = common::get(&app.router, &format!("/api/v1/events/{event_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let (status, _) =
        common::book(&app.router, &guest, &event_id, "guest@example.com", "9876543210").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_listing_filters_by_category() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    common::create_event(&app.router, &mentor, 5, 500.0).await;

    let (status, events) = common::get(&app.router, "/api/v1/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events[0]["mentorName"], "Test Person");
    assert_eq!(events[0]["availableSlots"], 5);

    let (_, filtered) = common::get(&app.router, "/api/v1/events?category=cooking").await;
    assert_eq!(filtered.as_array().map(Vec::len), Some(0));

    let (_, matched) = common::get(&app.router, "/api/v1/events?category=programming").await;
    assert_eq!(matched.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_event_returns_404() {
    let app = common::test_app().await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let missing = uuid::Uuid::new_v4();

    let (status, body) =
        common::book(&app.router, &guest, &missing.to_string(), "guest@example.com", "9876543210")
            .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    let (status, _) = common::post_json_with_auth(
        &app.router,
        &format!("/api/v1/events/{event_id}/book"),
        &json!({ "name": "  ", "email": "guest@example.com", "phone": "9876543210" }),
        &guest,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(common::event_slots(&app.router, &event_id).await, 5);
}

#[tokio::test]
async fn mentors_cannot_book() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;

    let (status, body) =
        common::book(&app.router, &mentor, &event_id, "host@example.com", "9876543210").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn user_bookings_lists_own_leads() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let (other, _) = common::register(&app.router, "other@example.com", "USER").await;

    let lead_id = common::book_verified(&app.router, &guest, &event_id).await;

    let (status, bookings) =
        common::get_with_auth(&app.router, "/api/v1/user/bookings", &guest).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bookings[0]["id"], lead_id.as_str());
    assert_eq!(bookings[0]["eventTitle"], "Intro to Rust");

    let (_, others) = common::get_with_auth(&app.router, "/api/v1/user/bookings", &other).await;
    assert_eq!(others.as_array().map(Vec::len), Some(0));
}
