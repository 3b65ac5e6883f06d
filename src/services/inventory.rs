//! Event slot accounting.
//!
//! Both operations are single conditional `UPDATE`s so concurrent bookings can
//! never drive `available_slots` below zero. Callers pass their transaction.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::event;
use crate::error::AppError;

/// Take one slot from the event.
///
/// # Errors
///
/// `NoCapacity` when the event has no slots left.
pub async fn reserve_slot<C: ConnectionTrait>(conn: &C, event_id: Uuid) -> Result<(), AppError> {
    let result = event::Entity::update_many()
        .col_expr(
            event::Column::AvailableSlots,
            Expr::col(event::Column::AvailableSlots).sub(1),
        )
        .filter(event::Column::Id.eq(event_id))
        .filter(event::Column::AvailableSlots.gt(0))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NoCapacity("No slots available".to_string()));
    }

    tracing::debug!(event_id = %event_id, "Slot reserved");
    Ok(())
}

/// Give one slot back to the event.
///
/// # Errors
///
/// Returns an error if the update fails.
pub async fn release_slot<C: ConnectionTrait>(conn: &C, event_id: Uuid) -> Result<(), AppError> {
    event::Entity::update_many()
        .col_expr(
            event::Column::AvailableSlots,
            Expr::col(event::Column::AvailableSlots).add(1),
        )
        .filter(event::Column::Id.eq(event_id))
        .exec(conn)
        .await?;

    tracing::debug!(event_id = %event_id, "Slot released");
    Ok(())
}
