//! Baseline schema: the user directory and the single-owner financial
//! records, as they exist before funds.
//!
//! - `users`: the user directory
//! - `accounts`
//! - `transactions`
//! - `transaction_categories`, `transaction_tags`, `transaction_templates`
//! - `transaction_pictures`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Uid,
    Username,
    Nickname,
    Email,
    DefaultCurrency,
    Deleted,
}

#[derive(Iden)]
enum Accounts {
    Table,
    AccountId,
    Uid,
    Name,
    Deleted,
}

#[derive(Iden)]
enum Transactions {
    Table,
    TransactionId,
    Uid,
    TransactionTime,
    Amount,
    Comment,
    Deleted,
}

#[derive(Iden)]
enum TransactionCategories {
    Table,
    CategoryId,
    Uid,
    Name,
    Deleted,
}

#[derive(Iden)]
enum TransactionTags {
    Table,
    TagId,
    Uid,
    Name,
    Deleted,
}

#[derive(Iden)]
enum TransactionTemplates {
    Table,
    TemplateId,
    Uid,
    Name,
    Deleted,
}

#[derive(Iden)]
enum TransactionPictures {
    Table,
    PictureId,
    Uid,
    TransactionId,
    Deleted,
}

/// A record with an id, an owning user, a name and a soft-delete flag.
fn named_record_table<T: Iden + 'static>(
    table: T,
    id: T,
    uid: T,
    name: T,
    deleted: T,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).big_integer().not_null().primary_key())
        .col(ColumnDef::new(uid).big_integer().not_null())
        .col(ColumnDef::new(name).string().not_null())
        .col(
            ColumnDef::new(deleted)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ─────────────────────────────────────────────────────────────────────
        // Users
        // ─────────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Uid)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Nickname)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Users::DefaultCurrency)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ─────────────────────────────────────────────────────────────────────
        // Accounts, categories, tags, templates
        // ─────────────────────────────────────────────────────────────────────
        manager
            .create_table(named_record_table(
                Accounts::Table,
                Accounts::AccountId,
                Accounts::Uid,
                Accounts::Name,
                Accounts::Deleted,
            ))
            .await?;
        manager
            .create_table(named_record_table(
                TransactionCategories::Table,
                TransactionCategories::CategoryId,
                TransactionCategories::Uid,
                TransactionCategories::Name,
                TransactionCategories::Deleted,
            ))
            .await?;
        manager
            .create_table(named_record_table(
                TransactionTags::Table,
                TransactionTags::TagId,
                TransactionTags::Uid,
                TransactionTags::Name,
                TransactionTags::Deleted,
            ))
            .await?;
        manager
            .create_table(named_record_table(
                TransactionTemplates::Table,
                TransactionTemplates::TemplateId,
                TransactionTemplates::Uid,
                TransactionTemplates::Name,
                TransactionTemplates::Deleted,
            ))
            .await?;

        // ─────────────────────────────────────────────────────────────────────
        // Transactions
        // ─────────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::TransactionId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Uid).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Transactions::Comment)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Transactions::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-uid-time")
                    .table(Transactions::Table)
                    .col(Transactions::Uid)
                    .col(Transactions::TransactionTime)
                    .to_owned(),
            )
            .await?;

        // ─────────────────────────────────────────────────────────────────────
        // Pictures
        // ─────────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionPictures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionPictures::PictureId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionPictures::Uid)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionPictures::TransactionId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TransactionPictures::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransactionPictures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
