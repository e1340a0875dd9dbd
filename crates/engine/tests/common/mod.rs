#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection};

use engine::{Engine, IdGenerator, RecordKind, SequenceIds, records, users};
use migration::MigratorTrait;

pub const ALICE: i64 = 500;
pub const BOB: i64 = 600;
pub const CAROL: i64 = 700;

pub async fn memory_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine_with_ids(ids: Arc<dyn IdGenerator>) -> (Engine, DatabaseConnection) {
    let db = memory_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .id_generator(ids)
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_ids(Arc::new(SequenceIds::starting_at(1000))).await
}

pub async fn add_user(db: &DatabaseConnection, uid: i64, username: &str) {
    users::ActiveModel {
        uid: ActiveValue::Set(uid),
        username: ActiveValue::Set(username.to_string()),
        nickname: ActiveValue::Set(format!("{username} nick")),
        email: ActiveValue::Set(format!("{username}@example.com")),
        default_currency: ActiveValue::Set("USD".to_string()),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn add_account(db: &DatabaseConnection, id: i64, uid: i64) {
    records::accounts::ActiveModel {
        account_id: ActiveValue::Set(id),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(0),
        name: ActiveValue::Set(format!("account {id}")),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
}

/// A transaction `minutes` after 2025-01-01T00:00Z.
pub async fn add_transaction(
    db: &DatabaseConnection,
    id: i64,
    uid: i64,
    fund_id: i64,
    minutes: i64,
) {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    records::transactions::ActiveModel {
        transaction_id: ActiveValue::Set(id),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(fund_id),
        transaction_time: ActiveValue::Set(base + chrono::Duration::minutes(minutes)),
        amount: ActiveValue::Set(100 * id),
        comment: ActiveValue::Set(String::new()),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
}

/// One category, tag, template and picture for `uid`, ids starting at
/// `first_id`.
pub async fn add_metadata(db: &DatabaseConnection, first_id: i64, uid: i64) {
    records::categories::ActiveModel {
        category_id: ActiveValue::Set(first_id),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(0),
        name: ActiveValue::Set("Food".to_string()),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
    records::tags::ActiveModel {
        tag_id: ActiveValue::Set(first_id + 1),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(0),
        name: ActiveValue::Set("weekly".to_string()),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
    records::templates::ActiveModel {
        template_id: ActiveValue::Set(first_id + 2),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(0),
        name: ActiveValue::Set("Rent".to_string()),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
    records::pictures::ActiveModel {
        picture_id: ActiveValue::Set(first_id + 3),
        uid: ActiveValue::Set(uid),
        fund_id: ActiveValue::Set(0),
        transaction_id: ActiveValue::Set(0),
        deleted: ActiveValue::Set(false),
    }
    .insert(db)
    .await
    .unwrap();
}

/// Rows of `uid` per record kind whose `fund_id` equals `fund_id`.
pub async fn scoped_counts(
    db: &DatabaseConnection,
    uid: i64,
    fund_id: i64,
) -> Vec<(RecordKind, u64)> {
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

    let mut out = Vec::new();
    for kind in RecordKind::ALL {
        let count = match kind {
            RecordKind::Account => records::accounts::Entity::find()
                .filter(records::accounts::Column::Uid.eq(uid))
                .filter(records::accounts::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
            RecordKind::Transaction => records::transactions::Entity::find()
                .filter(records::transactions::Column::Uid.eq(uid))
                .filter(records::transactions::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
            RecordKind::Category => records::categories::Entity::find()
                .filter(records::categories::Column::Uid.eq(uid))
                .filter(records::categories::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
            RecordKind::Tag => records::tags::Entity::find()
                .filter(records::tags::Column::Uid.eq(uid))
                .filter(records::tags::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
            RecordKind::Template => records::templates::Entity::find()
                .filter(records::templates::Column::Uid.eq(uid))
                .filter(records::templates::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
            RecordKind::Picture => records::pictures::Entity::find()
                .filter(records::pictures::Column::Uid.eq(uid))
                .filter(records::pictures::Column::FundId.eq(fund_id))
                .count(db)
                .await
                .unwrap(),
        };
        out.push((kind, count));
    }
    out
}
