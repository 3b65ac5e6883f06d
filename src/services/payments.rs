//! Two-phase payment flow shared by lead and ticket purchases.
//!
//! `begin` opens a provider order and records a `CREATED` payment. `confirm`
//! verifies the provider's confirmation, flips the payment to `COMPLETED` with a
//! conditional update and applies the business transition for its purpose, all in
//! one transaction. A payment completes at most once; replays are reported as
//! already processed and change nothing.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::payment;
use crate::entities::status::{PaymentPurpose, PaymentStatus};
use crate::error::AppError;
use crate::payments::{OrderRequest, PaymentConfirmation, PaymentGateway, to_minor_units};
use crate::services::leads::LeadService;
use crate::services::tickets::TicketService;

#[derive(Debug, Clone)]
pub struct BeginPayment {
    pub purpose: PaymentPurpose,
    /// Lead id or invitation id, depending on `purpose`.
    pub subject_id: Uuid,
    pub payer_id: Uuid,
    pub mentor_id: Option<Uuid>,
    /// Major currency units.
    pub amount: f64,
}

/// Everything the client needs to open checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHandle {
    pub payment_id: Uuid,
    pub order_id: String,
    pub amount: f64,
    pub amount_minor: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_code: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    /// This call completed the payment and applied its transition.
    Applied(payment::Model),
    /// The payment had already been completed by an earlier call.
    AlreadyProcessed(payment::Model),
}

impl ConfirmOutcome {
    #[must_use]
    pub const fn already_processed(&self) -> bool {
        matches!(self, Self::AlreadyProcessed(_))
    }

    #[must_use]
    pub const fn payment(&self) -> &payment::Model {
        match self {
            Self::Applied(p) | Self::AlreadyProcessed(p) => p,
        }
    }
}

#[derive(Clone)]
pub struct PaymentCoordinator {
    db: DatabaseConnection,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentCoordinator {
    #[must_use]
    pub fn new(db: DatabaseConnection, gateway: Arc<dyn PaymentGateway>, currency: String) -> Self {
        Self {
            db,
            gateway,
            currency,
        }
    }

    /// Open a provider order and record it as `CREATED`.
    ///
    /// A payer who already has an open order for the same subject and amount gets
    /// that order back, so repeated clicks never leave two payable orders behind.
    ///
    /// # Errors
    ///
    /// `Upstream` if the provider refuses or cannot be reached; nothing is written then.
    pub async fn begin(&self, request: BeginPayment) -> Result<PaymentHandle, AppError> {
        let amount_minor = to_minor_units(request.amount);

        if let Some(handle) = self.resume(&request, amount_minor).await? {
            return Ok(handle);
        }

        let order = self
            .gateway
            .create_order(OrderRequest {
                amount_minor,
                currency: self.currency.clone(),
                receipt: request.subject_id.to_string(),
            })
            .await
            .map_err(AppError::from_gateway)?;

        let payment_id = Uuid::new_v4();
        payment::ActiveModel {
            id: Set(payment_id),
            purpose: Set(request.purpose),
            subject_id: Set(request.subject_id),
            payer_id: Set(request.payer_id),
            mentor_id: Set(request.mentor_id),
            provider_order_id: Set(order.order_id.clone()),
            provider_payment_id: Set(None),
            amount: Set(request.amount),
            currency: Set(self.currency.clone()),
            status: Set(PaymentStatus::Created),
            created_at: Set(Utc::now().fixed_offset()),
            completed_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            payment_id = %payment_id,
            order_id = %order.order_id,
            purpose = request.purpose.as_str(),
            subject_id = %request.subject_id,
            gateway = self.gateway.name(),
            "Payment order created"
        );

        Ok(PaymentHandle {
            payment_id,
            order_id: order.order_id,
            amount: request.amount,
            amount_minor,
            currency: self.currency.clone(),
            key_id: self.gateway.key_id().map(str::to_string),
            demo_code: order.demo_code,
        })
    }

    async fn resume(
        &self,
        request: &BeginPayment,
        amount_minor: i64,
    ) -> Result<Option<PaymentHandle>, AppError> {
        let open = payment::Entity::find()
            .filter(payment::Column::Purpose.eq(request.purpose))
            .filter(payment::Column::SubjectId.eq(request.subject_id))
            .filter(payment::Column::PayerId.eq(request.payer_id))
            .filter(payment::Column::Status.eq(PaymentStatus::Created))
            .order_by_desc(payment::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let resumed = open
            .into_iter()
            .filter(|p| to_minor_units(p.amount) == amount_minor && p.currency == self.currency)
            .find_map(|p| {
                self.gateway
                    .resume_order(&p.provider_order_id)
                    .map(|order| (p, order))
            });

        Ok(resumed.map(|(existing, order)| {
            tracing::info!(
                payment_id = %existing.id,
                order_id = %order.order_id,
                purpose = request.purpose.as_str(),
                subject_id = %request.subject_id,
                "Payment order resumed"
            );
            PaymentHandle {
                payment_id: existing.id,
                order_id: order.order_id,
                amount: existing.amount,
                amount_minor,
                currency: existing.currency,
                key_id: self.gateway.key_id().map(str::to_string),
                demo_code: order.demo_code,
            }
        }))
    }

    /// Verify a checkout confirmation and apply its transition exactly once.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown order, another purpose or another payer
    /// - `PaymentInvalid` if the provider signature does not check out
    /// - whatever the purpose's transition returns, in which case the payment stays `CREATED`
    pub async fn confirm(
        &self,
        expected: PaymentPurpose,
        payer_id: Uuid,
        confirmation: &PaymentConfirmation,
    ) -> Result<ConfirmOutcome, AppError> {
        let payment = payment::Entity::find()
            .filter(payment::Column::ProviderOrderId.eq(&confirmation.order_id))
            .one(&self.db)
            .await?
            .filter(|p| p.purpose == expected && p.payer_id == payer_id)
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

        self.gateway
            .verify(confirmation)
            .await
            .map_err(|err| {
                tracing::warn!(
                    payment_id = %payment.id,
                    order_id = %confirmation.order_id,
                    error = %err,
                    "Payment confirmation rejected"
                );
                AppError::from_gateway(err)
            })?;

        let now = Utc::now().fixed_offset();
        let txn = self.db.begin().await?;

        let result = payment::Entity::update_many()
            .set(payment::ActiveModel {
                status: Set(PaymentStatus::Completed),
                provider_payment_id: Set(Some(confirmation.payment_id.clone())),
                completed_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(payment::Column::Id.eq(payment.id))
            .filter(payment::Column::Status.eq(PaymentStatus::Created))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            tracing::info!(payment_id = %payment.id, "Payment already processed");
            return Ok(ConfirmOutcome::AlreadyProcessed(payment));
        }

        let completed = payment::Model {
            status: PaymentStatus::Completed,
            provider_payment_id: Some(confirmation.payment_id.clone()),
            completed_at: Some(now),
            ..payment
        };

        match completed.purpose {
            PaymentPurpose::LeadPurchase => LeadService::commit_purchase(&txn, &completed).await?,
            PaymentPurpose::TicketPurchase => {
                TicketService::commit_ticket(&txn, &completed).await?;
            }
        }

        txn.commit().await?;

        tracing::info!(
            payment_id = %completed.id,
            purpose = completed.purpose.as_str(),
            subject_id = %completed.subject_id,
            from = "CREATED",
            to = "COMPLETED",
            "Payment completed"
        );

        Ok(ConfirmOutcome::Applied(completed))
    }
}
