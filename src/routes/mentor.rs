use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::MentorUser;
use crate::entities::status::{LeadStatus, PaymentPurpose, VerificationStatus};
use crate::entities::{event, invitation, lead, mentor_profile};
use crate::error::AppError;
use crate::payments::PaymentConfirmation;
use crate::routes::user::InvitationView;
use crate::services::leads::LeadService;
use crate::services::payments::PaymentHandle;
use crate::services::tickets::TicketService;
use crate::state::AppState;
use crate::utils::contact;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the host route group: `/mentor/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/leads", get(list_leads))
        .route("/leads/{id}/purchase", post(purchase_lead))
        .route("/leads/{id}/pass", post(pass_lead))
        .route("/leads/{id}/invite", post(invite_guest))
        .route("/payment-verify", post(verify_lead_payment))
        .route("/invitations", get(list_invitations))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub experience: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub event_datetime: DateTimeWithTimeZone,
    pub duration_minutes: i32,
    pub available_slots: i32,
    pub price_per_lead: f64,
}

/// Partial event edit: only the fields present are applied.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub event_datetime: Option<DateTimeWithTimeZone>,
    pub duration_minutes: Option<i32>,
    pub available_slots: Option<i32>,
    pub price_per_lead: Option<f64>,
}

/// A lead as the host sees it. Contact details stay hidden until bought.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorLeadView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub price_per_lead: f64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub verification_status: VerificationStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub ticket_price: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadConfirmResponse {
    pub already_processed: bool,
    pub lead: lead::Model,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

const MAX_TITLE_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;

fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if !contact::fits(title, MAX_TITLE_LEN) {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), AppError> {
    if contact::fits(category, MAX_CATEGORY_LEN) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )))
    }
}

fn validate_duration(minutes: i32) -> Result<(), AppError> {
    if minutes <= 0 {
        return Err(AppError::Validation(
            "Duration must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_slots(slots: i32) -> Result<(), AppError> {
    if slots < 0 {
        return Err(AppError::Validation(
            "Available slots cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Price per lead cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_event(body: &EventRequest) -> Result<(), AppError> {
    validate_title(&body.title)?;
    validate_category(&body.category)?;
    validate_duration(body.duration_minutes)?;
    validate_slots(body.available_slots)?;
    validate_price(body.price_per_lead)
}

fn validate_event_update(body: &UpdateEventRequest) -> Result<(), AppError> {
    if let Some(title) = &body.title {
        validate_title(title)?;
    }
    if let Some(category) = &body.category {
        validate_category(category)?;
    }
    if let Some(minutes) = body.duration_minutes {
        validate_duration(minutes)?;
    }
    if let Some(slots) = body.available_slots {
        validate_slots(slots)?;
    }
    if let Some(price) = body.price_per_lead {
        validate_price(price)?;
    }
    Ok(())
}

fn lead_view(l: lead::Model, e: &event::Model) -> MentorLeadView {
    let revealed = l.status.is_sold();
    MentorLeadView {
        id: l.id,
        event_id: e.id,
        event_title: e.title.clone(),
        price_per_lead: e.price_per_lead,
        name: l.name,
        email: revealed.then_some(l.email),
        phone: revealed.then_some(l.phone),
        message: if revealed { l.message } else { None },
        status: l.status,
        verification_status: l.verification_status,
        created_at: l.created_at,
    }
}

async fn find_own_event(
    state: &AppState,
    mentor_id: Uuid,
    event_id: Uuid,
) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(event_id)
        .one(&state.db)
        .await?
        .filter(|e| e.mentor_id == mentor_id)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/v1/mentor/profile`
async fn get_profile(mentor: MentorUser) -> Json<mentor_profile::Model> {
    Json(mentor.profile)
}

/// `PUT /api/v1/mentor/profile`: edit bio, expertise and experience. The
/// verification status is admin-owned and never touched here.
async fn update_profile(
    State(state): State<AppState>,
    mentor: MentorUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<mentor_profile::Model>, AppError> {
    let mut active: mentor_profile::ActiveModel = mentor.profile.into();
    if let Some(bio) = body.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(expertise) = body.expertise {
        active.expertise = Set(serde_json::json!(expertise));
    }
    if let Some(experience) = body.experience {
        active.experience = Set(Some(experience));
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/v1/mentor/events`
async fn list_events(
    State(state): State<AppState>,
    mentor: MentorUser,
) -> Result<Json<Vec<event::Model>>, AppError> {
    let events = event::Entity::find()
        .filter(event::Column::MentorId.eq(mentor.profile.id))
        .order_by_asc(event::Column::EventDatetime)
        .all(&state.db)
        .await?;
    Ok(Json(events))
}

/// `POST /api/v1/mentor/events`: approved mentors only.
async fn create_event(
    State(state): State<AppState>,
    mentor: MentorUser,
    Json(body): Json<EventRequest>,
) -> Result<(StatusCode, Json<event::Model>), AppError> {
    if !mentor.profile.verification_status.can_publish() {
        return Err(AppError::Forbidden("Mentor not verified".to_string()));
    }
    validate_event(&body)?;

    let now = Utc::now().fixed_offset();
    let created = event::ActiveModel {
        id: Set(Uuid::new_v4()),
        mentor_id: Set(mentor.profile.id),
        title: Set(body.title.trim().to_string()),
        description: Set(body.description),
        category: Set(body.category),
        event_datetime: Set(body.event_datetime),
        duration_minutes: Set(body.duration_minutes),
        available_slots: Set(body.available_slots),
        price_per_lead: Set(body.price_per_lead),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(event_id = %created.id, mentor_id = %mentor.profile.id, "Event created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/v1/mentor/events/{id}`: fields left out of the body keep their value.
async fn update_event(
    State(state): State<AppState>,
    mentor: MentorUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<event::Model>, AppError> {
    validate_event_update(&body)?;
    let existing = find_own_event(&state, mentor.profile.id, id).await?;

    let mut active: event::ActiveModel = existing.into();
    if let Some(title) = body.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(category) = body.category {
        active.category = Set(category);
    }
    if let Some(event_datetime) = body.event_datetime {
        active.event_datetime = Set(event_datetime);
    }
    if let Some(minutes) = body.duration_minutes {
        active.duration_minutes = Set(minutes);
    }
    if let Some(slots) = body.available_slots {
        active.available_slots = Set(slots);
    }
    if let Some(price) = body.price_per_lead {
        active.price_per_lead = Set(price);
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let updated = active.update(&state.db).await?;
    Ok(Json(updated))
}

/// `DELETE /api/v1/mentor/events/{id}`: only while nobody has booked it.
async fn delete_event(
    State(state): State<AppState>,
    mentor: MentorUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    let existing = find_own_event(&state, mentor.profile.id, id).await?;

    let bookings = lead::Entity::find()
        .filter(lead::Column::EventId.eq(existing.id))
        .count(&state.db)
        .await?;
    if bookings > 0 {
        return Err(AppError::InvalidState(
            "Event has bookings and cannot be deleted".to_string(),
        ));
    }

    event::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    tracing::info!(event_id = %id, "Event deleted");
    Ok(Json(MessageResponse {
        message: "Event deleted".to_string(),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Leads
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/v1/mentor/leads`: verified and sold leads on the mentor's events.
async fn list_leads(
    State(state): State<AppState>,
    mentor: MentorUser,
) -> Result<Json<Vec<MentorLeadView>>, AppError> {
    let events = event::Entity::find()
        .filter(event::Column::MentorId.eq(mentor.profile.id))
        .all(&state.db)
        .await?;

    let leads = lead::Entity::find()
        .filter(lead::Column::EventId.is_in(events.iter().map(|e| e.id)))
        .filter(
            lead::Column::Status.is_in(LeadStatus::iter().filter(|s| s.visible_to_mentor())),
        )
        .order_by_desc(lead::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let views = leads
        .into_iter()
        .filter_map(|l| {
            let e = events.iter().find(|e| e.id == l.event_id)?;
            Some(lead_view(l, e))
        })
        .collect();

    Ok(Json(views))
}

/// `POST /api/v1/mentor/leads/{id}/purchase`: open a payment for a verified lead.
async fn purchase_lead(
    State(state): State<AppState>,
    mentor: MentorUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentHandle>, AppError> {
    let handle =
        LeadService::start_purchase(&state.db, &state.payments, &mentor.profile, id).await?;
    Ok(Json(handle))
}

/// `POST /api/v1/mentor/payment-verify`: confirm a lead payment.
///
/// Replaying a confirmation returns the lead with `alreadyProcessed: true`.
async fn verify_lead_payment(
    State(state): State<AppState>,
    mentor: MentorUser,
    Json(body): Json<PaymentConfirmation>,
) -> Result<Json<LeadConfirmResponse>, AppError> {
    let outcome = state
        .payments
        .confirm(PaymentPurpose::LeadPurchase, mentor.user.id, &body)
        .await?;

    let lead_model = lead::Entity::find_by_id(outcome.payment().subject_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    Ok(Json(LeadConfirmResponse {
        already_processed: outcome.already_processed(),
        lead: lead_model,
    }))
}

/// `POST /api/v1/mentor/leads/{id}/pass`
async fn pass_lead(
    State(state): State<AppState>,
    mentor: MentorUser,
    Path(id): Path<Uuid>,
) -> Result<Json<lead::Model>, AppError> {
    let updated = LeadService::pass(&state.db, mentor.profile.id, id).await?;
    Ok(Json(updated))
}

/// `POST /api/v1/mentor/leads/{id}/invite`: offer the lead a paid ticket.
async fn invite_guest(
    State(state): State<AppState>,
    mentor: MentorUser,
    Path(id): Path<Uuid>,
    Json(body): Json<InviteRequest>,
) -> Result<(StatusCode, Json<invitation::Model>), AppError> {
    let outcome = TicketService::invite(&state.db, mentor.profile.id, id, body.ticket_price).await?;

    state
        .notifier
        .invitation(
            &outcome.lead.email,
            &outcome.lead.name,
            &outcome.event.title,
            outcome.invitation.ticket_price,
        )
        .await;

    Ok((StatusCode::CREATED, Json(outcome.invitation)))
}

/// `GET /api/v1/mentor/invitations`
async fn list_invitations(
    State(state): State<AppState>,
    mentor: MentorUser,
) -> Result<Json<Vec<InvitationView>>, AppError> {
    let invitations = invitation::Entity::find()
        .filter(invitation::Column::MentorId.eq(mentor.profile.id))
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
