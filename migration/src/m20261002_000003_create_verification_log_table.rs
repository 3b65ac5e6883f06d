use sea_orm_migration::prelude::*;

/// Creates the append-only `verification_log` audit table for admin lead reviews.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum VerificationLog {
    Table,
    Id,
    LeadId,
    VerifiedBy,
    Decision,
    Reason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationLog::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationLog::LeadId).uuid().not_null())
                    .col(ColumnDef::new(VerificationLog::VerifiedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(VerificationLog::Decision)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerificationLog::Reason).text().null())
                    .col(
                        ColumnDef::new(VerificationLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_verification_log_lead_id")
                            .from(VerificationLog::Table, VerificationLog::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verification_log_lead_id")
                    .table(VerificationLog::Table)
                    .col(VerificationLog::LeadId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationLog::Table).to_owned())
            .await
    }
}
