pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_user_table;
mod m20261001_000002_create_user_session_table;
mod m20261001_000003_create_mentor_profile_table;
mod m20261002_000001_create_event_table;
mod m20261002_000002_create_lead_table;
mod m20261002_000003_create_verification_log_table;
mod m20261003_000001_create_payment_table;
mod m20261003_000002_create_invitation_table;
mod m20261003_000003_create_ticket_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_user_table::Migration),
            Box::new(m20261001_000002_create_user_session_table::Migration),
            Box::new(m20261001_000003_create_mentor_profile_table::Migration),
            Box::new(m20261002_000001_create_event_table::Migration),
            Box::new(m20261002_000002_create_lead_table::Migration),
            Box::new(m20261002_000003_create_verification_log_table::Migration),
            Box::new(m20261003_000001_create_payment_table::Migration),
            Box::new(m20261003_000002_create_invitation_table::Migration),
            Box::new(m20261003_000003_create_ticket_table::Migration),
        ]
    }
}
