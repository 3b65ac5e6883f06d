use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::status::{
    LeadStatus, PaymentPurpose, ReviewDecision, VerificationStatus,
};
use crate::entities::{event, invitation, lead, mentor_profile, payment, verification_log};
use crate::error::AppError;
use crate::services::inventory;
use crate::services::payments::{BeginPayment, PaymentCoordinator, PaymentHandle};
use crate::utils::contact;

/// Contact details submitted with a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub lead: lead::Model,
    pub event: event::Model,
    pub mentor: mentor_profile::Model,
}

pub struct LeadService;

impl LeadService {
    /// Book an event: reserve a slot and create the lead in one transaction.
    ///
    /// The slot decrement is the first statement of the transaction so the
    /// row lock is taken before anything is read.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty name or a field longer than its column
    /// - `NotFound` if the event is unknown or its mentor is not approved
    /// - `NoCapacity` if the event is full; no lead is written
    pub async fn book(
        db: &DatabaseConnection,
        user_id: Uuid,
        event_id: Uuid,
        booking: NewBooking,
    ) -> Result<BookingOutcome, AppError> {
        let name = booking.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let email = booking.email.trim().to_string();
        let phone = booking.phone.trim().to_string();
        check_length("Name", &name, contact::MAX_NAME_LEN)?;
        check_length("Email", &email, contact::MAX_EMAIL_LEN)?;
        check_length("Phone", &phone, contact::MAX_PHONE_LEN)?;

        let (status, verification_status) =
            if contact::qualifies_for_auto_verification(&email, &phone) {
                (LeadStatus::Verified, VerificationStatus::AutoVerified)
            } else {
                (LeadStatus::Pending, VerificationStatus::Pending)
            };

        let txn = db.begin().await?;

        let reserved = inventory::reserve_slot(&txn, event_id).await;

        let (event_model, mentor) = event::Entity::find_by_id(event_id)
            .find_also_related(mentor_profile::Entity)
            .one(&txn)
            .await?
            .and_then(|(e, m)| m.map(|m| (e, m)))
            .filter(|(_, m)| m.verification_status.can_publish())
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        reserved?;

        let now = Utc::now().fixed_offset();
        let lead_model = lead::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_id: Set(event_id),
            user_id: Set(user_id),
            name: Set(name),
            email: Set(email),
            phone: Set(phone),
            message: Set(booking.message.filter(|m| !m.trim().is_empty())),
            status: Set(status),
            verification_status: Set(verification_status),
            purchased_by: Set(None),
            payment_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            lead_id = %lead_model.id,
            event_id = %event_id,
            status = lead_model.status.as_str(),
            "Lead created"
        );

        Ok(BookingOutcome {
            event: event_model,
            lead: lead_model,
            mentor,
        })
    }

    /// Admin verification or rejection of a lead, with an audit entry.
    ///
    /// Moving into `REJECTED` frees the lead's slot; moving out of it takes one back.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown lead
    /// - `InvalidState` once the lead has been sold, or if it changed underneath us
    /// - `NoCapacity` when un-rejecting a lead on a full event
    pub async fn review(
        db: &DatabaseConnection,
        admin_id: Uuid,
        lead_id: Uuid,
        decision: ReviewDecision,
        reason: Option<String>,
    ) -> Result<lead::Model, AppError> {
        let txn = db.begin().await?;

        let current = lead::Entity::find_by_id(lead_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))?;

        if !current.status.is_reviewable() {
            return Err(AppError::InvalidState("Lead already purchased".to_string()));
        }

        let target = decision.lead_status();
        match (current.status.holds_slot(), target.holds_slot()) {
            (true, false) => inventory::release_slot(&txn, current.event_id).await?,
            (false, true) => inventory::reserve_slot(&txn, current.event_id).await?,
            _ => {}
        }

        let now = Utc::now().fixed_offset();
        let result = lead::Entity::update_many()
            .set(lead::ActiveModel {
                status: Set(target),
                verification_status: Set(decision.verification_status()),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(lead::Column::Id.eq(lead_id))
            .filter(lead::Column::Status.eq(current.status))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::InvalidState(
                "Lead was modified concurrently".to_string(),
            ));
        }

        let reason = reason.filter(|r| !r.trim().is_empty());
        verification_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            lead_id: Set(lead_id),
            verified_by: Set(admin_id),
            decision: Set(decision),
            reason: Set(reason),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        tracing::info!(
            lead_id = %lead_id,
            admin_id = %admin_id,
            from = current.status.as_str(),
            to = target.as_str(),
            "Lead reviewed"
        );

        Ok(lead::Model {
            status: target,
            verification_status: decision.verification_status(),
            updated_at: now,
            ..current
        })
    }

    /// Load a lead together with its event, if the event belongs to `mentor_id`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the lead is unknown or owned by another mentor.
    pub async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        mentor_id: Uuid,
        lead_id: Uuid,
    ) -> Result<(lead::Model, event::Model), AppError> {
        lead::Entity::find_by_id(lead_id)
            .find_also_related(event::Entity)
            .one(conn)
            .await?
            .and_then(|(l, e)| e.map(|e| (l, e)))
            .filter(|(_, e)| e.mentor_id == mentor_id)
            .ok_or_else(|| AppError::NotFound("Lead not found".to_string()))
    }

    /// Start a mentor's purchase of a verified lead. The lead itself is untouched
    /// until the payment is confirmed.
    ///
    /// # Errors
    ///
    /// `NotFound` for foreign leads, `InvalidState` unless the lead is `VERIFIED`,
    /// `Upstream` if the provider refuses the order.
    pub async fn start_purchase(
        db: &DatabaseConnection,
        payments: &PaymentCoordinator,
        mentor: &mentor_profile::Model,
        lead_id: Uuid,
    ) -> Result<PaymentHandle, AppError> {
        let (lead_model, event_model) = Self::find_owned(db, mentor.id, lead_id).await?;

        if let Some(reason) = lead_model.status.purchase_blocker() {
            return Err(AppError::InvalidState(reason.to_string()));
        }

        payments
            .begin(BeginPayment {
                purpose: PaymentPurpose::LeadPurchase,
                subject_id: lead_model.id,
                payer_id: mentor.user_id,
                mentor_id: Some(mentor.id),
                amount: event_model.price_per_lead,
            })
            .await
    }

    /// Commit step of a lead purchase: `VERIFIED → PURCHASED`.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the lead is no longer `VERIFIED`; the caller rolls back.
    pub async fn commit_purchase(
        txn: &DatabaseTransaction,
        payment: &payment::Model,
    ) -> Result<(), AppError> {
        let result = lead::Entity::update_many()
            .set(lead::ActiveModel {
                status: Set(LeadStatus::Purchased),
                purchased_by: Set(payment.mentor_id),
                payment_id: Set(Some(payment.id)),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(lead::Column::Id.eq(payment.subject_id))
            .filter(lead::Column::Status.eq(LeadStatus::Verified))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::InvalidState("Lead already purchased".to_string()));
        }

        tracing::info!(
            lead_id = %payment.subject_id,
            payment_id = %payment.id,
            from = "VERIFIED",
            to = "PURCHASED",
            "Lead purchased"
        );
        Ok(())
    }

    /// Mentor declines to invite a purchased lead.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the lead is `PURCHASED` with no invitation.
    pub async fn pass(
        db: &DatabaseConnection,
        mentor_id: Uuid,
        lead_id: Uuid,
    ) -> Result<lead::Model, AppError> {
        let txn = db.begin().await?;
        let (lead_model, _) = Self::find_owned(&txn, mentor_id, lead_id).await?;

        if lead_model.status != LeadStatus::Purchased {
            return Err(AppError::InvalidState(
                "Only purchased leads can be passed".to_string(),
            ));
        }

        // Take the lead row before looking for an invitation; `invite` locks the
        // same row, so the two cannot both commit.
        let now = Utc::now().fixed_offset();
        let result = lead::Entity::update_many()
            .set(lead::ActiveModel {
                status: Set(LeadStatus::Passed),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(lead::Column::Id.eq(lead_id))
            .filter(lead::Column::Status.eq(LeadStatus::Purchased))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::InvalidState(
                "Only purchased leads can be passed".to_string(),
            ));
        }

        let invited = invitation::Entity::find()
            .filter(invitation::Column::LeadId.eq(lead_id))
            .one(&txn)
            .await?
            .is_some();
        if invited {
            return Err(AppError::InvalidState("Guest already invited".to_string()));
        }

        txn.commit().await?;

        tracing::info!(lead_id = %lead_id, from = "PURCHASED", to = "PASSED", "Lead passed");

        Ok(lead::Model {
            status: LeadStatus::Passed,
            updated_at: now,
            ..lead_model
        })
    }
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if contact::fits(value, max) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )))
    }
}
