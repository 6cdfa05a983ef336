use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Wallets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum WalletTransactions {
    Table,
    Id,
    WalletId,
    TransactionType,
    Amount,
    Description,
    ReferenceType,
    ReferenceId,
    BalanceBefore,
    BalanceAfter,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::WalletId)
                            .big_integer()
                            .not_null(),
                    )
                    // credit / debit / refund
                    .col(
                        ColumnDef::new(WalletTransactions::TransactionType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::Description)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::ReferenceType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::ReferenceId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::BalanceBefore)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(WalletTransactions::Amount).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_transactions_wallet")
                            .from(WalletTransactions::Table, WalletTransactions::WalletId)
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
                    .name("idx_wallet_transactions_wallet")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::WalletId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wallet_transactions_reference")
                    .table(WalletTransactions::Table)
                    .col(WalletTransactions::ReferenceType)
                    .col(WalletTransactions::ReferenceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(WalletTransactions::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
