use sea_orm_migration::prelude::*;

/// Creates the `lead` table: one row per booking, carrying both lifecycle and
/// verification status.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    EventId,
    UserId,
    Name,
    Email,
    Phone,
    Message,
    Status,
    VerificationStatus,
    PurchasedBy,
    PaymentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Lead::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Lead::EventId).uuid().not_null())
                    .col(ColumnDef::new(Lead::UserId).uuid().not_null())
                    .col(ColumnDef::new(Lead::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Lead::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Lead::Phone).string_len(32).not_null())
                    .col(ColumnDef::new(Lead::Message).text().null())
                    .col(
                        ColumnDef::new(Lead::Status)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Lead::VerificationStatus)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Lead::PurchasedBy).uuid().null())
                    .col(ColumnDef::new(Lead::PaymentId).uuid().null())
                    .col(
                        ColumnDef::new(Lead::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lead::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_event_id")
                            .from(Lead::Table, Lead::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_user_id")
                            .from(Lead::Table, Lead::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_event_id")
                    .table(Lead::Table)
                    .col(Lead::EventId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_user_id")
                    .table(Lead::Table)
                    .col(Lead::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lead::Table).to_owned())
            .await
    }
}
