use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::status::{PaymentPurpose, PaymentStatus};

/// One provider order. `subject_id` is a lead id for `LEAD_PURCHASE` and an
/// invitation id for `TICKET_PURCHASE`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "payment")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purpose: PaymentPurpose,
    pub subject_id: Uuid,
    pub payer_id: Uuid,
    pub mentor_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub provider_order_id: String,
    pub provider_payment_id: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PayerId",
        to = "super::user::Column::Id"
    )]
    Payer,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
