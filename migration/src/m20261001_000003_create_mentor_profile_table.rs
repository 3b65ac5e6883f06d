use sea_orm_migration::prelude::*;

/// Creates the `mentor_profile` table, one row per MENTOR user.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum MentorProfile {
    Table,
    Id,
    UserId,
    Bio,
    Expertise,
    Experience,
    VerificationStatus,
    CreatedAt,
    UpdatedAt,
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
                    .table(MentorProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MentorProfile::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MentorProfile::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MentorProfile::Bio).text().null())
                    .col(ColumnDef::new(MentorProfile::Expertise).json().not_null())
                    .col(ColumnDef::new(MentorProfile::Experience).text().null())
                    .col(
                        ColumnDef::new(MentorProfile::VerificationStatus)
                            .string_len(20)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(MentorProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorProfile::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mentor_profile_user_id")
                            .from(MentorProfile::Table, MentorProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MentorProfile::Table).to_owned())
            .await
    }
}
