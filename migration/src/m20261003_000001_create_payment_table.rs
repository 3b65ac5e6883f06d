use sea_orm_migration::prelude::*;

/// Creates the `payment` table. One row per provider order; `subject_id` points at
/// a lead or an invitation depending on `purpose`.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Payment {
    Table,
    Id,
    Purpose,
    SubjectId,
    PayerId,
    MentorId,
    ProviderOrderId,
    ProviderPaymentId,
    Amount,
    Currency,
    Status,
    CreatedAt,
    CompletedAt,
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
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payment::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payment::Purpose).string_len(20).not_null())
                    .col(ColumnDef::new(Payment::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(Payment::PayerId).uuid().not_null())
                    .col(ColumnDef::new(Payment::MentorId).uuid().null())
                    .col(
                        ColumnDef::new(Payment::ProviderOrderId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Payment::ProviderPaymentId)
                            .string_len(64)
                            .null(),
                    )
                    .col(ColumnDef::new(Payment::Amount).double().not_null())
                    .col(ColumnDef::new(Payment::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Payment::Status)
                            .string_len(20)
                            .not_null()
                            .default("CREATED"),
                    )
                    .col(
                        ColumnDef::new(Payment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payment::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_payer_id")
                            .from(Payment::Table, Payment::PayerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_subject_id")
                    .table(Payment::Table)
                    .col(Payment::SubjectId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await
    }
}
