use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Deliveries are append-only: no updated_at column.
        manager
            .create_table(
                Table::create()
                    .table(EventDeliveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventDeliveries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventDeliveries::EventType).string().not_null())
                    .col(ColumnDef::new(EventDeliveries::Payload).text().not_null())
                    .col(ColumnDef::new(EventDeliveries::WebhookId).uuid().not_null())
                    .col(ColumnDef::new(EventDeliveries::AppId).uuid().not_null())
                    .col(ColumnDef::new(EventDeliveries::TargetUrl).string().not_null())
                    .col(
                        ColumnDef::new(EventDeliveries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_deliveries_event_type_created_at")
                    .table(EventDeliveries::Table)
                    .col(EventDeliveries::EventType)
                    .col(EventDeliveries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventDeliveryAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventDeliveryAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventDeliveryAttempts::DeliveryId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventDeliveryAttempts::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventDeliveryAttempts::ResponseStatusCode).small_integer())
                    .col(ColumnDef::new(EventDeliveryAttempts::ResponseBody).text())
                    .col(
                        ColumnDef::new(EventDeliveryAttempts::DurationMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventDeliveryAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_delivery_attempts_delivery_id")
                            .from(
                                EventDeliveryAttempts::Table,
                                EventDeliveryAttempts::DeliveryId,
                            )
                            .to(EventDeliveries::Table, EventDeliveries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventDeliveryAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventDeliveries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventDeliveries {
    Table,
    Id,
    EventType,
    Payload,
    WebhookId,
    AppId,
    TargetUrl,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EventDeliveryAttempts {
    Table,
    Id,
    DeliveryId,
    Status,
    ResponseStatusCode,
    ResponseBody,
    DurationMs,
    CreatedAt,
}
