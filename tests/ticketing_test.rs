mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

/// Host has bought the guest's lead and invited them at 250.
struct Invited {
    app: common::TestApp,
    mentor: String,
    guest: String,
    invitation_id: String,
}

async fn invited_guest() -> Invited {
    let app = common::test_app().await;
    let (mentor, _) = common::approved_mentor(&app.router, "host@example.com").await;
    let event_id = common::create_event(&app.router, &mentor, 5, 500.0).await;
    let (guest, _) = common::register(&app.router, "guest@example.com", "USER").await;
    let lead_id = common::book_verified(&app.router, &guest, &event_id).await;
    common::purchase_lead(&app.router, &mentor, &lead_id).await;

    let (status, invitation) = common::post_json_with_auth(
        &app.router,
        &format!("/api/v1/mentor/leads/{lead_id}/invite"),
        &json!({ "ticketPrice": 250.0 }),
        &mentor,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{invitation}");

    Invited {
        invitation_id: common::str_field(&invitation, "id"),
        app,
        mentor,
        guest,
    }
}

async fn open_payment(invited: &Invited, token: &str) -> (StatusCode, Value) {
    common::post_json_with_auth(
        &invited.app.router,
        &format!("/api/v1/user/invitations/{}/pay", invited.invitation_id),
        &json!({}),
        token,
    )
    .await
}

async fn confirm(invited: &Invited, handle: &Value) -> (StatusCode, Value) {
    common::post_json_with_auth(
        &invited.app.router,
        "/api/v1/user/ticket-payment-verify",
        &common::confirmation_for(handle),
        &invited.guest,
    )
    .await
}

#[tokio::test]
async fn guest_receives_invitation_email() {
    let invited = invited_guest().await;
    assert!(
        invited
            .app
            .mailer
            .subjects_to("guest@example.com")
            .contains(&"You're invited to Intro to Rust".to_string())
    );
}

#[tokio::test]
async fn invitations_are_listed_for_both_sides() {
    let invited = invited_guest().await;

    let (status, guest_view) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/invitations", &invited.guest)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(guest_view[0]["id"], invited.invitation_id.as_str());
    assert_eq!(guest_view[0]["eventTitle"], "Intro to Rust");
    assert_eq!(guest_view[0]["status"], "PENDING");

    let (status, host_view) = common::get_with_auth(
        &invited.app.router,
        "/api/v1/mentor/invitations",
        &invited.mentor,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(host_view.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn paying_invitation_issues_ticket() {
    let invited = invited_guest().await;

    let (status, handle) = open_payment(&invited, &invited.guest).await;
    assert_eq!(status, StatusCode::OK, "{handle}");
    assert_eq!(handle["amount"], 250.0);
    assert_eq!(handle["amountMinor"], 25_000);

    let (status, confirmed) = confirm(&invited, &handle).await;
    assert_eq!(status, StatusCode::OK, "{confirmed}");
    assert_eq!(confirmed["alreadyProcessed"], false);
    assert_eq!(confirmed["ticket"]["status"], "CONFIRMED");
    assert_eq!(confirmed["ticket"]["ticketPrice"], 250.0);
    assert_eq!(confirmed["ticket"]["invitationId"], invited.invitation_id.as_str());

    let (_, invitations) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/invitations", &invited.guest)
            .await;
    assert_eq!(invitations[0]["status"], "PAID");
    assert!(!invitations[0]["paidAt"].is_null());

    let (status, tickets) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/tickets", &invited.guest).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tickets.as_array().map(Vec::len), Some(1));
    assert_eq!(tickets[0]["eventTitle"], "Intro to Rust");
}

#[tokio::test]
async fn replayed_ticket_confirmation_returns_same_ticket() {
    let invited = invited_guest().await;
    let (_, handle) = open_payment(&invited, &invited.guest).await;

    let (_, first) = confirm(&invited, &handle).await;
    let (status, second) = confirm(&invited, &handle).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["alreadyProcessed"], true);
    assert_eq!(second["ticket"]["id"], first["ticket"]["id"]);

    let (_, tickets) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/tickets", &invited.guest).await;
    assert_eq!(tickets.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn paid_invitation_cannot_be_paid_again() {
    let invited = invited_guest().await;
    let (_, handle) = open_payment(&invited, &invited.guest).await;
    confirm(&invited, &handle).await;

    let (status, body) = open_payment(&invited, &invited.guest).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Invitation already paid");
}

#[tokio::test]
async fn reopening_ticket_payment_reuses_the_order() {
    let invited = invited_guest().await;
    let (_, first) = open_payment(&invited, &invited.guest).await;
    let (status, second) = open_payment(&invited, &invited.guest).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["orderId"], second["orderId"]);
    assert_eq!(first["paymentId"], second["paymentId"]);

    let (status, _) = confirm(&invited, &second).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = open_payment(&invited, &invited.guest).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Invitation already paid");

    let (_, tickets) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/tickets", &invited.guest).await;
    assert_eq!(tickets.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn other_users_cannot_pay_invitation() {
    let invited = invited_guest().await;
    let (stranger, _) =
        common::register(&invited.app.router, "stranger@example.com", "USER").await;

    let (status, _) = open_payment(&invited, &stranger).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, handle) = open_payment(&invited, &invited.guest).await;
    let (status, _) = common::post_json_with_auth(
        &invited.app.router,
        "/api/v1/user/ticket-payment-verify",
        &common::confirmation_for(&handle),
        &stranger,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_ticket_signature_keeps_invitation_pending() {
    let invited = invited_guest().await;
    let (_, handle) = open_payment(&invited, &invited.guest).await;

    let (status, body) = common::post_json_with_auth(
        &invited.app.router,
        "/api/v1/user/ticket-payment-verify",
        &json!({
            "orderId": handle["orderId"],
            "paymentId": "pay_test_001",
            "signature": "bogus",
        }),
        &invited.guest,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PAYMENT_INVALID");

    let (_, invitations) =
        common::get_with_auth(&invited.app.router, "/api/v1/user/invitations", &invited.guest)
            .await;
    assert_eq!(invitations[0]["status"], "PENDING");
}
