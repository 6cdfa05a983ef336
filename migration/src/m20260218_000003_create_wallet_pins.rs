use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum WalletPins {
    Table,
    Id,
    Code,
    SellerWalletId,
    SellerId,
    Amount,
    AmountUsed,
    Status,
    UsedByOrderId,
    UsedByRegistrationId,
    ExpiresAt,
    UsedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletPins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletPins::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::Code)
                            .string_len(6)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::SellerWalletId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletPins::SellerId).big_integer().not_null())
                    .col(ColumnDef::new(WalletPins::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(WalletPins::AmountUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    // active / used / expired / refunded
                    .col(
                        ColumnDef::new(WalletPins::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(WalletPins::UsedByOrderId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::UsedByRegistrationId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::UsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletPins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WalletPins::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(WalletPins::Amount).gt(0))
                    .check(
                        Expr::col(WalletPins::AmountUsed)
                            .gte(0)
                            .and(Expr::col(WalletPins::AmountUsed).lte(Expr::col(WalletPins::Amount))),
                    )
                    // 订单与注册二选一
                    .check(
                        Expr::col(WalletPins::UsedByOrderId)
                            .is_null()
                            .or(Expr::col(WalletPins::UsedByRegistrationId).is_null()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_pins_seller_wallet")
                            .from(WalletPins::Table, WalletPins::SellerWalletId)
                            .to(Wallets::Table, Wallets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wallet_pins_seller")
                    .table(WalletPins::Table)
                    .col(WalletPins::SellerId)
                    .to_owned(),
            )
            .await?;

        // 过期扫描：status = 'active' AND expires_at <= now
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wallet_pins_status_expires")
                    .table(WalletPins::Table)
                    .col(WalletPins::Status)
                    .col(WalletPins::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(WalletPins::Table).to_owned())
            .await?;
        Ok(())
    }
}
