use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::GuestUser;
use crate::entities::status::PaymentPurpose;
use crate::entities::{event, invitation, lead, ticket};
use crate::error::AppError;
use crate::payments::PaymentConfirmation;
use crate::services::payments::PaymentHandle;
use crate::services::tickets::TicketService;
use crate::state::AppState;

/// Build the attendee route group: `/user/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/invitations", get(list_invitations))
        .route("/invitations/{id}/pay", post(pay_invitation))
        .route("/ticket-payment-verify", post(verify_ticket_payment))
        .route("/tickets", get(list_tickets))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    #[serde(flatten)]
    pub lead: lead::Model,
    pub event_title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: invitation::Model,
    pub event_title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: ticket::Model,
    pub event_title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketConfirmResponse {
    pub already_processed: bool,
    pub ticket: ticket::Model,
}

/// `GET /api/v1/user/bookings`
async fn list_bookings(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
) -> Result<Json<Vec<BookingView>>, AppError> {
    let bookings = lead::Entity::find()
        .filter(lead::Column::UserId.eq(user_model.id))
        .find_also_related(event::Entity)
        .order_by_desc(lead::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(l, e)| BookingView {
            lead: l,
            event_title: e.map(|e| e.title),
        })
        .collect();

    Ok(Json(bookings))
}

/// `GET /api/v1/user/invitations`
async fn list_invitations(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
) -> Result<Json<Vec<InvitationView>>, AppError> {
    let invitations = invitation::Entity::find()
        .filter(invitation::Column::GuestUserId.eq(user_model.id))
        .find_also_related(event::Entity)
        .order_by_desc(invitation::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(i, e)| InvitationView {
            invitation: i,
            event_title: e.map(|e| e.title),
        })
        .collect();

    Ok(Json(invitations))
}

/// `POST /api/v1/user/invitations/{id}/pay`: open a ticket payment.
async fn pay_invitation(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentHandle>, AppError> {
    let handle =
        TicketService::start_payment(&state.db, &state.payments, user_model.id, id).await?;
    Ok(Json(handle))
}

/// `POST /api/v1/user/ticket-payment-verify`: confirm a ticket payment.
///
/// Replaying a confirmation returns the existing ticket with `alreadyProcessed: true`.
async fn verify_ticket_payment(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
    Json(body): Json<PaymentConfirmation>,
) -> Result<Json<TicketConfirmResponse>, AppError> {
    let outcome = state
        .payments
        .confirm(PaymentPurpose::TicketPurchase, user_model.id, &body)
        .await?;

    let ticket_model = ticket::Entity::find()
        .filter(ticket::Column::InvitationId.eq(outcome.payment().subject_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(TicketConfirmResponse {
        already_processed: outcome.already_processed(),
        ticket: ticket_model,
    }))
}

/// `GET /api/v1/user/tickets`
async fn list_tickets(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
) -> Result<Json<Vec<TicketView>>, AppError> {
    let tickets = ticket::Entity::find()
        .filter(ticket::Column::UserId.eq(user_model.id))
        .find_also_related(event::Entity)
        .order_by_desc(ticket::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(t, e)| TicketView {
            ticket: t,
            event_title: e.map(|e| e.title),
        })
        .collect();

    Ok(Json(tickets))
}
