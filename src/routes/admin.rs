use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AdminUser;
use crate::entities::status::{
    LeadStatus, MentorStatus, PaymentPurpose, PaymentStatus, ReviewDecision, Role,
};
use crate::entities::{event, lead, mentor_profile, payment, ticket, user, verification_log};
use crate::error::AppError;
use crate::services::leads::LeadService;
use crate::state::AppState;

/// Build the admin route group: `/admin/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/mentors", get(list_mentors))
        .route("/mentors/{id}/verify", put(verify_mentor))
        .route("/leads", get(list_leads))
        .route("/leads/{id}/verify", put(verify_lead))
        .route("/leads/{id}/logs", get(lead_logs))
        .route("/analytics", get(analytics))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMentorView {
    #[serde(flatten)]
    pub profile: mentor_profile::Model,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLeadView {
    #[serde(flatten)]
    pub lead: lead::Model,
    pub event_title: Option<String>,
}

#[derive(Deserialize)]
pub struct LeadListQuery {
    pub status: Option<LeadStatus>,
}

#[derive(Deserialize)]
pub struct VerifyLeadRequest {
    pub status: ReviewDecision,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyMentorRequest {
    pub status: MentorStatus,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_users: u64,
    pub total_mentors: u64,
    pub approved_mentors: u64,
    pub total_events: u64,
    pub total_leads: u64,
    pub verified_leads: u64,
    pub purchased_leads: u64,
    pub tickets_sold: u64,
    pub lead_revenue: f64,
    pub ticket_revenue: f64,
    pub total_revenue: f64,
}

/// `GET /api/v1/admin/users`
async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<user::Model>>, AppError> {
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(users))
}

/// `GET /api/v1/admin/mentors`
async fn list_mentors(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminMentorView>>, AppError> {
    let mentors = mentor_profile::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(mentor_profile::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(profile, owner)| AdminMentorView {
            profile,
            name: owner.as_ref().map(|u| u.name.clone()),
            email: owner.map(|u| u.email),
        })
        .collect();
    Ok(Json(mentors))
}

/// `PUT /api/v1/admin/mentors/{id}/verify`: approve or reject a mentor profile.
async fn verify_mentor(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<VerifyMentorRequest>,
) -> Result<Json<mentor_profile::Model>, AppError> {
    if body.status == MentorStatus::Pending {
        return Err(AppError::Validation(
            "Status must be APPROVED or REJECTED".to_string(),
        ));
    }

    let (profile, owner) = mentor_profile::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Mentor not found".to_string()))?;

    let from = profile.verification_status;
    let mut active: mentor_profile::ActiveModel = profile.into();
    active.verification_status = Set(body.status);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.db).await?;

    tracing::info!(
        mentor_id = %id,
        admin_id = %admin.id,
        from = from.as_str(),
        to = body.status.as_str(),
        "Mentor reviewed"
    );

    if let Some(owner) = owner {
        state
            .notifier
            .mentor_decision(
                &owner.email,
                &owner.name,
                body.status == MentorStatus::Approved,
            )
            .await;
    }

    Ok(Json(updated))
}

/// `GET /api/v1/admin/leads?status=PENDING`
async fn list_leads(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<Vec<AdminLeadView>>, AppError> {
    let mut select = lead::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(lead::Column::Status.eq(status));
    }

    let leads = select
        .find_also_related(event::Entity)
        .order_by_desc(lead::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(l, e)| AdminLeadView {
            lead: l,
            event_title: e.map(|e| e.title),
        })
        .collect();
    Ok(Json(leads))
}

/// `PUT /api/v1/admin/leads/{id}/verify`: manual verification with audit entry.
async fn verify_lead(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<VerifyLeadRequest>,
) -> Result<Json<lead::Model>, AppError> {
    let updated = LeadService::review(&state.db, admin.id, id, body.status, body.reason).await?;
    Ok(Json(updated))
}

/// `GET /api/v1/admin/leads/{id}/logs`: review history, oldest first.
async fn lead_logs(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<verification_log::Model>>, AppError> {
    lead::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

    let logs = verification_log::Entity::find()
        .filter(verification_log::Column::LeadId.eq(id))
        .order_by_asc(verification_log::Column::CreatedAt)
        .all(&state.db)
        .await?;
    Ok(Json(logs))
}

/// `GET /api/v1/admin/analytics`
async fn analytics(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let db = &state.db;

    let mut report = AnalyticsResponse {
        total_users: user::Entity::find()
            .filter(user::Column::Role.eq(Role::User))
            .count(db)
            .await?,
        total_mentors: mentor_profile::Entity::find().count(db).await?,
        approved_mentors: mentor_profile::Entity::find()
            .filter(mentor_profile::Column::VerificationStatus.eq(MentorStatus::Approved))
            .count(db)
            .await?,
        total_events: event::Entity::find().count(db).await?,
        total_leads: lead::Entity::find().count(db).await?,
        verified_leads: lead::Entity::find()
            .filter(lead::Column::Status.eq(LeadStatus::Verified))
            .count(db)
            .await?,
        // Passed leads were paid for too and stay in the sales count.
        purchased_leads: lead::Entity::find()
            .filter(lead::Column::Status.is_in(LeadStatus::iter().filter(|s| s.is_sold())))
            .count(db)
            .await?,
        tickets_sold: ticket::Entity::find().count(db).await?,
        ..AnalyticsResponse::default()
    };

    let completed = payment::Entity::find()
        .filter(payment::Column::Status.eq(PaymentStatus::Completed))
        .all(db)
        .await?;
    for p in completed {
        match p.purpose {
            PaymentPurpose::LeadPurchase => report.lead_revenue += p.amount,
            PaymentPurpose::TicketPurchase => report.ticket_revenue += p.amount,
        }
    }
    report.total_revenue = report.lead_revenue + report.ticket_revenue;

    Ok(Json(report))
}
