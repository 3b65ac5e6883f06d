use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::GuestUser;
use crate::entities::status::{LeadStatus, MentorStatus};
use crate::entities::{event, lead, mentor_profile, user};
use crate::error::AppError;
use crate::services::leads::{LeadService, NewBooking};
use crate::state::AppState;

/// Build the event route group: `/events/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/{id}", get(get_event))
        .route("/{id}/book", post(book_event))
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: event::Model,
    pub mentor_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSummary {
    pub id: Uuid,
    pub name: String,
    pub bio: Option<String>,
    pub expertise: serde_json::Value,
    pub experience: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: event::Model,
    pub mentor: MentorSummary,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub lead: lead::Model,
    pub event_title: String,
    pub auto_verified: bool,
}

/// `GET /api/v1/events`: events of approved mentors, soonest first.
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventSummary>>, AppError> {
    let mentors: HashMap<Uuid, String> = mentor_profile::Entity::find()
        .filter(mentor_profile::Column::VerificationStatus.eq(MentorStatus::Approved))
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(profile, owner)| (profile.id, owner.map(|u| u.name).unwrap_or_default()))
        .collect();

    let mut select = event::Entity::find()
        .filter(event::Column::MentorId.is_in(mentors.keys().copied()))
        .order_by_asc(event::Column::EventDatetime);
    if let Some(category) = query.category.filter(|c| !c.is_empty()) {
        select = select.filter(event::Column::Category.eq(category));
    }

    let events = select
        .all(&state.db)
        .await?
        .into_iter()
        .map(|e| EventSummary {
            mentor_name: mentors.get(&e.mentor_id).cloned().unwrap_or_default(),
            event: e,
        })
        .collect();

    Ok(Json(events))
}

/// `GET /api/v1/events/{id}`: event detail with the host's public profile.
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetail>, AppError> {
    let not_found = || AppError::NotFound("Event not found".to_string());

    let (event_model, profile) = event::Entity::find_by_id(id)
        .find_also_related(mentor_profile::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;
    let profile = profile
        .filter(|p| p.verification_status.can_publish())
        .ok_or_else(not_found)?;

    let owner = user::Entity::find_by_id(profile.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(EventDetail {
        event: event_model,
        mentor: MentorSummary {
            id: profile.id,
            name: owner.name,
            bio: profile.bio,
            expertise: profile.expertise,
            experience: profile.experience,
        },
    }))
}

/// `POST /api/v1/events/{id}/book`: create a lead and take one slot.
async fn book_event(
    State(state): State<AppState>,
    GuestUser(user_model): GuestUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let outcome = LeadService::book(
        &state.db,
        user_model.id,
        id,
        NewBooking {
            name: body.name,
            email: body.email,
            phone: body.phone,
            message: body.message,
        },
    )
    .await?;

    state
        .notifier
        .booking_confirmation(&user_model.email, &outcome.lead.name, &outcome.event.title)
        .await;

    let auto_verified = outcome.lead.status == LeadStatus::Verified;
    if auto_verified {
        match user::Entity::find_by_id(outcome.mentor.user_id)
            .one(&state.db)
            .await
        {
            Ok(Some(host)) => {
                state
                    .notifier
                    .new_verified_lead(&host.email, &outcome.event.title)
                    .await;
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "Could not load host for lead email"),
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            event_title: outcome.event.title,
            lead: outcome.lead,
            auto_verified,
        }),
    ))
}
