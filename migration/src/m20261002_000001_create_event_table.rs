use sea_orm_migration::prelude::*;

/// Creates the `event` table. `available_slots` is guarded non-negative by the
/// conditional decrement in the booking path as well as a check constraint.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
    MentorId,
    Title,
    Description,
    Category,
    EventDatetime,
    DurationMinutes,
    AvailableSlots,
    PricePerLead,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MentorProfile {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Event::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Event::MentorId).uuid().not_null())
                    .col(ColumnDef::new(Event::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Event::Description).text().not_null())
                    .col(ColumnDef::new(Event::Category).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Event::EventDatetime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Event::DurationMinutes).integer().not_null())
                    .col(
                        ColumnDef::new(Event::AvailableSlots)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Event::AvailableSlots).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Event::PricePerLead)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Event::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_mentor_id")
                            .from(Event::Table, Event::MentorId)
                            .to(MentorProfile::Table, MentorProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_mentor_id")
                    .table(Event::Table)
                    .col(Event::MentorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}
