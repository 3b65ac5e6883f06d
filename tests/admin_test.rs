mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn seeded_admin_can_log_in() {
    let app = common::test_app().await;
    let token = common::admin_token(&app.router).await;

    let (status, me) = common::get_with_auth(&app.router, "/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["role"], "ADMIN");
    assert_eq!(me["user"]["emailVerified"], true);
}

#[tokio::test]
async fn admin_lists_users_and_mentors() {
    let app = common::test_app().await;
    common::register(&app.router, "guest@example.com", "USER").await;
    common::register(&app.router, "host@example.com", "MENTOR").await;
    let admin = common::admin_token(&app.router).await;

    let (status, users) = common::get_with_auth(&app.router, "/api/v1/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    // includes the seeded admin
    assert_eq!(users.as_array().map(Vec::len), Some(3));
    assert!(users.as_array().is_some_and(|all| all.iter().all(|u| u.get("passwordHash").is_none())));

    let (status, mentors) =
        common::get_with_auth(&app.router, "/api/v1/admin/mentors", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mentors.as_array().map(Vec::len), Some(1));
    assert_eq!(mentors[0]["email"], "host@example.com");
    assert_eq!(mentors[0]["verificationStatus"], "PENDING");
}

#[tokio::test]
async fn mentor_approval_unlocks_event_creation() {
    let app = common::test_app().await;
    let (mentor, _) = common::register(&app.router, "host@example.com", "MENTOR").await;

    let event = json!({
        "title": "Intro to Rust",
        "description": "Ownership and borrowing",
        "category": "programming",
        "eventDatetime": "2026-12-01T10:00:00+00:00",
        "durationMinutes": 60,
        "availableSlots": 5,
        "pricePerLead": 500.0,
    });

    let (status, body) =
        common::post_json_with_auth(&app.router, "/api/v1/mentor/events", &event, &mentor).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Mentor not verified");

    let (_, me) = common::get_with_auth(&app.router, "/api/v1/auth/me", &mentor).await;
    let profile_id = common::str_field(&me["mentorProfile"], "id");
    let admin = common::admin_token(&app.router).await;
    let (status, profile) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/admin/mentors/{profile_id}/verify"),
        &json!({ "status": "APPROVED" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["verificationStatus"], "APPROVED");
    assert!(
        app.mailer
            .subjects_to("host@example.com")
            .contains(&"Your mentor profile is approved".to_string())
    );

    let (status, _) =
        common::post_json_with_auth(&app.router, "/api/v1/mentor/events", &event, &mentor).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn mentor_cannot_be_set_back_to_pending() {
    let app = common::test_app().await;
    let (_, profile_id) = common::approved_mentor(&app.router, "host@example.com").await;
    let admin = common::admin_token(&app.router).await;

    let (status, _) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/admin/mentors/{profile_id}/verify"),
        &json!({ "status": "PENDING" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn event_update_applies_only_the_fields_sent() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let uri = format!("/api/v1/mentor/events/{event_id}");

    let (status, event) =
        common::put_json_with_auth(&app.router, &uri, &json!({ "title": "Renamed" }), &mentor)
            .await;
    assert_eq!(status, StatusCode::OK, "{event}");
    assert_eq!(event["title"], "Renamed");
    assert_eq!(event["category"], "programming");
    assert_eq!(event["availableSlots"], 5);
    assert_eq!(event["pricePerLead"], 500.0);
    assert_eq!(event["durationMinutes"], 60);

    let (status, _) =
        common::put_json_with_auth(&app.router, &uri, &json!({ "title": "   " }), &mentor).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = common::put_json_with_auth(
        &app.router,
        &uri,
        &json!({ "availableSlots": -3 }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, events) = common::get_with_auth(&app.router, "/api/v1/mentor/events", &mentor).await;
    assert_eq!(events[0]["title"], "Renamed");
    assert_eq!(events[0]["availableSlots"], 5);
}

#[tokio::test]
async fn oversized_event_title_is_rejected() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;

    let (status, body) = common::post_json_with_auth(
        &app.router,
        "/api/v1/mentor/events",
        &json!({
            "title": "t".repeat(201),
            "description": "",
            "category": "programming",
            "eventDatetime": "2026-12-02T10:00:00+00:00",
            "durationMinutes": 60,
            "availableSlots": 5,
            "pricePerLead": 10.0,
        }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/mentor/events/{event_id}"),
        &json!({ "category": "c".repeat(101) }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_mentor_and_lead_return_404() {
    let app = common::test_app().await;
    let admin = common::admin_token(&app.router).await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/admin/mentors/{missing}/verify"),
        &json!({ "status": "APPROVED" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/admin/leads/{missing}/verify"),
        &json!({ "status": "VERIFIED" }),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::get_with_auth(
        &app.router,
        &format!("/api/v1/admin/leads/{missing}/logs"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analytics_counts_sales_and_revenue() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    common::register(&app.router, "pending-host@example.com", "MENTOR").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;

    let sold = common::book_verified(&app.router, &guest, &event_id).await;
    common::book_verified(&app.router, &guest, &event_id).await;
    common::book(&app.router, &guest, &event_id, "bad@", "1").await;

    common::purchase_lead(&app.router, &mentor, &sold).await;
    let (status, _) = common::post_json_with_auth(
        &app.router,
        &format!("/api/v1/mentor/leads/{sold}/invite"),
        &json!({ "ticketPrice": 120.0 }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, invitations) = common::get_with_auth(&app.router, "/api/v1/user/invitations", &guest).await;
    let invitation_id = common::str_field(&invitations[0], "id");
    let (_, handle) = common::post_json_with_auth(
        &app.router,
        &format!("/api/v1/user/invitations/{invitation_id}/pay"),
        &json!({}),
        &guest,
    )
    .await;
    let (status, _) = common::post_json_with_auth(
        &app.router,
        "/api/v1/user/ticket-payment-verify",
        &common::confirmation_for(&handle),
        &guest,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // an abandoned checkout does not count as revenue
    let (_, leads) = common::get_with_auth(&app.router, "/api/v1/mentor/leads", &mentor).await;
    let unsold = leads
        .as_array()
        .and_then(|all| all.iter().find(|l| l["status"] == "VERIFIED"))
        .map(|l| common::str_field(l, "id"))
        .unwrap_or_default();
    common::begin_purchase(&app.router, &mentor, &unsold).await;

    let admin = common::admin_token(&app.router).await;
    let (status, report) =
        common::get_with_auth(&app.router, "/api/v1/admin/analytics", &admin).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["totalUsers"], 1);
    assert_eq!(report["totalMentors"], 2);
    assert_eq!(report["approvedMentors"], 1);
    assert_eq!(report["totalEvents"], 1);
    assert_eq!(report["totalLeads"], 3);
    assert_eq!(report["verifiedLeads"], 1);
    assert_eq!(report["purchasedLeads"], 1);
    assert_eq!(report["ticketsSold"], 1);
    assert_eq!(report["leadRevenue"], 500.0);
    assert_eq!(report["ticketRevenue"], 120.0);
    assert_eq!(report["totalRevenue"], 620.0);
}

#[tokio::test]
async fn passed_leads_still_count_as_sold() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let lead_id = common::book_verified(&app.router, &guest, &event_id).await;
    common::purchase_lead(&app.router, &mentor, &lead_id).await;

    let (status, passed) = common::post_json_with_auth(
        &app.router,
        &format!("/api/v1/mentor/leads/{lead_id}/pass"),
        &json!({}),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(passed["status"], "PASSED");

    let admin = common::admin_token(&app.router).await;
    let (_, report) = common::get_with_auth(&app.router, "/api/v1/admin/analytics", &admin).await;
    assert_eq!(report["purchasedLeads"], 1);
    assert_eq!(report["leadRevenue"], 500.0);
}

#[tokio::test]
async fn event_with_bookings_cannot_be_deleted() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let booked = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let empty = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    common::book_verified(&app.router, &guest, &booked).await;

    let (status, body) =
        common::delete_with_auth(&app.router, &format!("/api/v1/mentor/events/{booked}"), &mentor)
            .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    let (status, _) =
        common::delete_with_auth(&app.router, &format!("/api/v1/mentor/events/{empty}"), &mentor)
            .await;
    assert_eq!(status, StatusCode::OK);

    let (_, events) = common::get_with_auth(&app.router, "/api/v1/mentor/events", &mentor).await;
    assert_eq!(events.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn mentor_updates_profile_and_event() {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;

    let (status, profile) = common::put_json_with_auth(
        &app.router,
        "/api/v1/mentor/profile",
        &json!({ "bio": "Systems programmer", "expertise": ["rust", "tokio"] }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["bio"], "Systems programmer");
    assert_eq!(profile["expertise"], json!(["rust", "tokio"]));

    let (status, event) = common::put_json_with_auth(
        &app.router,
        &format!("/api/v1/mentor/events/{event_id}"),
        &json!({
            "title": "Advanced Rust",
            "description": "Lifetimes",
            "category": "programming",
            "eventDatetime": "2026-12-02T10:00:00+00:00",
            "durationMinutes": 90,
            "availableSlots": 10,
            "pricePerLead": 750.0,
        }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{event}");
    assert_eq!(event["title"], "Advanced Rust");
    assert_eq!(event["availableSlots"], 10);

    let (status, _) = common::post_json_with_auth(
        &app.router,
        "/api/v1/mentor/events",
        &json!({
            "title": "Broken",
            "description": "",
            "category": "programming",
            "eventDatetime": "2026-12-02T10:00:00+00:00",
            "durationMinutes": 60,
            "availableSlots": -1,
            "pricePerLead": 10.0,
        }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
