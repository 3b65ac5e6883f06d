use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::status::{InvitationStatus, LeadStatus, PaymentPurpose, TicketStatus};
use crate::entities::{event, invitation, lead, payment, ticket};
use crate::error::AppError;
use crate::services::leads::LeadService;
use crate::services::payments::{BeginPayment, PaymentCoordinator, PaymentHandle};

#[derive(Debug, Clone)]
pub struct InviteOutcome {
    pub invitation: invitation::Model,
    pub lead: lead::Model,
    pub event: event::Model,
}

pub struct TicketService;

impl TicketService {
    /// Offer a paid ticket to the person behind a purchased lead.
    ///
    /// # Errors
    ///
    /// - `Validation` for a non-positive price
    /// - `NotFound` for foreign leads
    /// - `InvalidState` unless the lead is `PURCHASED` and not yet invited
    pub async fn invite(
        db: &DatabaseConnection,
        mentor_id: Uuid,
        lead_id: Uuid,
        ticket_price: f64,
    ) -> Result<InviteOutcome, AppError> {
        if !ticket_price.is_finite() || ticket_price <= 0.0 {
            return Err(AppError::Validation(
                "Ticket price must be greater than zero".to_string(),
            ));
        }

        let txn = db.begin().await?;
        let (lead_model, event_model) = LeadService::find_owned(&txn, mentor_id, lead_id).await?;

        if lead_model.status != LeadStatus::Purchased {
            return Err(AppError::InvalidState(
                "Lead must be purchased before inviting".to_string(),
            ));
        }

        // Touch the lead under its status guard so a concurrent pass either
        // waits for this transaction or has already moved the lead on.
        let now = Utc::now().fixed_offset();
        let locked = lead::Entity::update_many()
            .set(lead::ActiveModel {
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(lead::Column::Id.eq(lead_id))
            .filter(lead::Column::Status.eq(LeadStatus::Purchased))
            .exec(&txn)
            .await?;
        if locked.rows_affected == 0 {
            return Err(AppError::InvalidState(
                "Lead must be purchased before inviting".to_string(),
            ));
        }

        let existing = invitation::Entity::find()
            .filter(invitation::Column::LeadId.eq(lead_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::InvalidState("Guest already invited".to_string()));
        }

        let invitation_model = invitation::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(lead_id),
            event_id: Set(event_model.id),
            mentor_id: Set(mentor_id),
            guest_user_id: Set(lead_model.user_id),
            ticket_price: Set(ticket_price),
            status: Set(InvitationStatus::Pending),
            created_at: Set(now),
            paid_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(already_invited)?;

        txn.commit().await?;

        tracing::info!(
            invitation_id = %invitation_model.id,
            lead_id = %lead_id,
            "Invitation created"
        );

        Ok(InviteOutcome {
            invitation: invitation_model,
            lead: lead::Model {
                updated_at: now,
                ..lead_model
            },
            event: event_model,
        })
    }

    /// Start the guest's ticket payment.
    ///
    /// # Errors
    ///
    /// `NotFound` unless the invitation is addressed to `guest_id`,
    /// `InvalidState` once it has been paid.
    pub async fn start_payment(
        db: &DatabaseConnection,
        payments: &PaymentCoordinator,
        guest_id: Uuid,
        invitation_id: Uuid,
    ) -> Result<PaymentHandle, AppError> {
        let invitation_model = invitation::Entity::find_by_id(invitation_id)
            .one(db)
            .await?
            .filter(|i| i.guest_user_id == guest_id)
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        if invitation_model.status != InvitationStatus::Pending {
            return Err(AppError::InvalidState(
                "Invitation already paid".to_string(),
            ));
        }

        payments
            .begin(BeginPayment {
                purpose: PaymentPurpose::TicketPurchase,
                subject_id: invitation_model.id,
                payer_id: guest_id,
                mentor_id: Some(invitation_model.mentor_id),
                amount: invitation_model.ticket_price,
            })
            .await
    }

    /// Commit step of a ticket purchase: invitation `PENDING → PAID` plus a
    /// confirmed ticket.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the invitation was already paid; the caller rolls back.
    pub async fn commit_ticket(
        txn: &DatabaseTransaction,
        payment: &payment::Model,
    ) -> Result<ticket::Model, AppError> {
        let now = Utc::now().fixed_offset();
        let result = invitation::Entity::update_many()
            .set(invitation::ActiveModel {
                status: Set(InvitationStatus::Paid),
                paid_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(invitation::Column::Id.eq(payment.subject_id))
            .filter(invitation::Column::Status.eq(InvitationStatus::Pending))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::InvalidState(
                "Invitation already paid".to_string(),
            ));
        }

        let invitation_model = invitation::Entity::find_by_id(payment.subject_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        let ticket_model = ticket::ActiveModel {
            id: Set(Uuid::new_v4()),
            invitation_id: Set(invitation_model.id),
            event_id: Set(invitation_model.event_id),
            user_id: Set(invitation_model.guest_user_id),
            payment_id: Set(payment.id),
            ticket_price: Set(invitation_model.ticket_price),
            status: Set(TicketStatus::Confirmed),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        tracing::info!(
            ticket_id = %ticket_model.id,
            invitation_id = %invitation_model.id,
            payment_id = %payment.id,
            from = "PENDING",
            to = "PAID",
            "Ticket issued"
        );

        Ok(ticket_model)
    }
}

/// A unique violation on `invitation.lead_id` means a concurrent invite won.
fn already_invited(err: DbErr) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::InvalidState("Guest already invited".to_string())
    } else {
        AppError::Internal(err.into())
    }
}
