use sea_orm_migration::prelude::*;

/// Creates the `ticket` table. At most one ticket exists per invitation.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Ticket {
    Table,
    Id,
    InvitationId,
    EventId,
    UserId,
    PaymentId,
    TicketPrice,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Invitation {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Payment {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ticket::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Ticket::InvitationId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Ticket::EventId).uuid().not_null())
                    .col(ColumnDef::new(Ticket::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ticket::PaymentId).uuid().not_null())
                    .col(ColumnDef::new(Ticket::TicketPrice).double().not_null())
                    .col(
                        ColumnDef::new(Ticket::Status)
                            .string_len(20)
                            .not_null()
                            .default("CONFIRMED"),
                    )
                    .col(
                        ColumnDef::new(Ticket::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_invitation_id")
                            .from(Ticket::Table, Ticket::InvitationId)
                            .to(Invitation::Table, Invitation::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_payment_id")
                            .from(Ticket::Table, Ticket::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}
