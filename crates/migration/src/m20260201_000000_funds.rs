//! Fund multi-tenancy.
//!
//! Adds `fund_id` (default `0`, meaning "no fund yet") to every financial
//! record table and creates `funds`, `fund_members` and
//! `transaction_members`. Existing rows are moved into funds by the admin
//! data migration, not here.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Funds {
    Table,
    FundId,
    Name,
    OwnerUid,
    DefaultCurrency,
    CreatedAt,
    UpdatedAt,
    Deleted,
    DeletedAt,
}

#[derive(Iden)]
enum FundMembers {
    Table,
    MemberId,
    FundId,
    Name,
    Email,
    Role,
    LinkedUid,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TransactionMembers {
    Table,
    TransactionId,
    MemberId,
    CreatedAt,
}

#[derive(Iden)]
enum Scoped {
    FundId,
}

#[derive(Iden)]
enum Accounts {
    Table,
}

#[derive(Iden)]
enum Transactions {
    Table,
}

#[derive(Iden)]
enum TransactionCategories {
    Table,
}

#[derive(Iden)]
enum TransactionTags {
    Table,
}

#[derive(Iden)]
enum TransactionTemplates {
    Table,
}

#[derive(Iden)]
enum TransactionPictures {
    Table,
}

fn add_fund_id<T: Iden + 'static>(table: T) -> TableAlterStatement {
    Table::alter()
        .table(table)
        .add_column(
            ColumnDef::new(Scoped::FundId)
                .big_integer()
                .not_null()
                .default(0),
        )
        .to_owned()
}

fn drop_fund_id<T: Iden + 'static>(table: T) -> TableAlterStatement {
    Table::alter()
        .table(table)
        .drop_column(Scoped::FundId)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.alter_table(add_fund_id(Accounts::Table)).await?;
        manager.alter_table(add_fund_id(Transactions::Table)).await?;
        manager
            .alter_table(add_fund_id(TransactionCategories::Table))
            .await?;
        manager.alter_table(add_fund_id(TransactionTags::Table)).await?;
        manager
            .alter_table(add_fund_id(TransactionTemplates::Table))
            .await?;
        manager
            .alter_table(add_fund_id(TransactionPictures::Table))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-fund_id")
                    .table(Transactions::Table)
                    .col(Scoped::FundId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Funds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Funds::FundId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Funds::Name).string().not_null())
                    .col(ColumnDef::new(Funds::OwnerUid).big_integer().not_null())
                    .col(
                        ColumnDef::new(Funds::DefaultCurrency)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Funds::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Funds::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Funds::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Funds::DeletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-funds-owner_uid")
                    .table(Funds::Table)
                    .col(Funds::OwnerUid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FundMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FundMembers::MemberId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FundMembers::FundId).big_integer().not_null())
                    .col(ColumnDef::new(FundMembers::Name).string().not_null())
                    .col(
                        ColumnDef::new(FundMembers::Email)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(FundMembers::Role).string().not_null())
                    .col(
                        ColumnDef::new(FundMembers::LinkedUid)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FundMembers::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FundMembers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fund_members-fund_id")
                            .from(FundMembers::Table, FundMembers::FundId)
                            .to(Funds::Table, Funds::FundId)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fund_members-fund_id")
                    .table(FundMembers::Table)
                    .col(FundMembers::FundId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fund_members-linked_uid")
                    .table(FundMembers::Table)
                    .col(FundMembers::LinkedUid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionMembers::TransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionMembers::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TransactionMembers::TransactionId)
                            .col(TransactionMembers::MemberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_members-member_id")
                            .from(TransactionMembers::Table, TransactionMembers::MemberId)
                            .to(FundMembers::Table, FundMembers::MemberId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_members-member_id")
                    .table(TransactionMembers::Table)
                    .col(TransactionMembers::MemberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FundMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Funds::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-fund_id")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;

        manager.alter_table(drop_fund_id(TransactionPictures::Table)).await?;
        manager
            .alter_table(drop_fund_id(TransactionTemplates::Table))
            .await?;
        manager.alter_table(drop_fund_id(TransactionTags::Table)).await?;
        manager
            .alter_table(drop_fund_id(TransactionCategories::Table))
            .await?;
        manager.alter_table(drop_fund_id(Transactions::Table)).await?;
        manager.alter_table(drop_fund_id(Accounts::Table)).await?;
        Ok(())
    }
}
