use engine::{Engine, EngineError, Fund, FundMember, FundRole};
use sea_orm::DatabaseConnection;

mod common;

use common::{ALICE, BOB, add_transaction, add_user, engine_with_db};

/// Alice's fund with an extra unlinked member "Bob".
async fn household() -> (Engine, DatabaseConnection, Fund, FundMember, FundMember) {
    let (engine, db) = engine_with_db().await;
    add_user(&db, ALICE, "alice").await;
    add_user(&db, BOB, "bob").await;
    let fund = engine.create_fund(ALICE, "Household", "EUR").await.unwrap();
    let owner = engine.list_members(ALICE, fund.id).await.unwrap().remove(0);
    let bob = engine.add_member(ALICE, fund.id, "Bob", None).await.unwrap();
    (engine, db, fund, owner, bob)
}

#[tokio::test]
async fn empty_member_list_links_every_member() {
    let (engine, db, fund, owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;

    let linked = engine.link_members(ALICE, 1, &[]).await.unwrap();
    let mut expected = vec![owner.id, bob.id];
    expected.sort();
    assert_eq!(linked, expected);
    assert_eq!(engine.member_ids_of(ALICE, 1).await.unwrap(), expected);

    let members = engine.members_of(ALICE, 1).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].role, FundRole::Owner);
    assert_eq!(members[1].id, bob.id);

    assert!(engine.is_linked(ALICE, 1, bob.id).await.unwrap());
    assert!(engine.is_linked(ALICE, 1, owner.id).await.unwrap());
}

#[tokio::test]
async fn explicit_links_replace_previous_ones() {
    let (engine, db, fund, owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;

    engine.link_members(ALICE, 1, &[]).await.unwrap();
    let linked = engine
        .link_members(ALICE, 1, &[bob.id, bob.id])
        .await
        .unwrap();
    assert_eq!(linked, vec![bob.id]);
    assert!(!engine.is_linked(ALICE, 1, owner.id).await.unwrap());
    assert!(engine.is_linked(ALICE, 1, bob.id).await.unwrap());

    engine.unlink_members(ALICE, 1).await.unwrap();
    assert!(engine.member_ids_of(ALICE, 1).await.unwrap().is_empty());
    // Nothing left to unlink is fine.
    engine.unlink_members(ALICE, 1).await.unwrap();
}

#[tokio::test]
async fn link_members_checks_ownership_and_fund() {
    let (engine, db, fund, _owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;
    add_transaction(&db, 2, BOB, 0, 0).await;

    let other = engine.create_fund(ALICE, "Trip", "EUR").await.unwrap();
    let guest = engine.add_member(ALICE, other.id, "Guest", None).await.unwrap();

    assert_eq!(
        engine
            .link_members(ALICE, 1, &[bob.id, guest.id])
            .await
            .unwrap_err(),
        EngineError::MemberNotFound
    );
    assert!(engine.member_ids_of(ALICE, 1).await.unwrap().is_empty());

    assert_eq!(
        engine.link_members(ALICE, 2, &[]).await.unwrap_err(),
        EngineError::TransactionNotFound
    );
    assert_eq!(
        engine.link_members(ALICE, 404, &[]).await.unwrap_err(),
        EngineError::TransactionNotFound
    );
    assert_eq!(
        engine.unlink_members(ALICE, 2).await.unwrap_err(),
        EngineError::TransactionNotFound
    );
    assert_eq!(
        engine.link_members(ALICE, 1, &[0]).await.unwrap_err(),
        EngineError::MemberIdInvalid
    );
    assert_eq!(
        engine.link_members(ALICE, 0, &[]).await.unwrap_err(),
        EngineError::TransactionIdInvalid
    );
}

#[tokio::test]
async fn transactions_of_member_newest_first() {
    let (engine, db, fund, owner, bob) = household().await;
    for (id, minutes) in [(1, 10), (2, 30), (3, 20), (4, 40)] {
        add_transaction(&db, id, ALICE, fund.id, minutes).await;
    }
    for id in [1, 2, 3] {
        engine.link_members(ALICE, id, &[bob.id]).await.unwrap();
    }
    engine.link_members(ALICE, 4, &[owner.id]).await.unwrap();

    let ids: Vec<i64> = engine
        .transactions_of(ALICE, fund.id, bob.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert_eq!(
        engine
            .transaction_count_of(ALICE, fund.id, bob.id)
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        engine
            .transaction_count_of(ALICE, fund.id, owner.id)
            .await
            .unwrap(),
        1
    );

    assert_eq!(
        engine
            .transactions_of(BOB, fund.id, bob.id)
            .await
            .unwrap_err(),
        EngineError::FundAccessDenied
    );
}

#[tokio::test]
async fn removing_a_member_drops_its_links() {
    let (engine, db, fund, owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;
    engine.link_members(ALICE, 1, &[]).await.unwrap();

    engine.remove_member(ALICE, fund.id, bob.id).await.unwrap();
    assert!(!engine.is_linked(ALICE, 1, bob.id).await.unwrap());
    assert_eq!(engine.member_ids_of(ALICE, 1).await.unwrap(), vec![owner.id]);
    assert_eq!(engine.delete_by_member(ALICE, bob.id).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_by_member_requires_fund_management() {
    let (engine, db, fund, _owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;
    add_transaction(&db, 2, ALICE, fund.id, 5).await;
    engine.link_members(ALICE, 1, &[bob.id]).await.unwrap();
    engine.link_members(ALICE, 2, &[bob.id]).await.unwrap();

    assert_eq!(
        engine.delete_by_member(BOB, bob.id).await.unwrap_err(),
        EngineError::FundAccessDenied
    );
    assert_eq!(engine.delete_by_member(ALICE, bob.id).await.unwrap(), 2);
    assert_eq!(
        engine
            .transaction_count_of(ALICE, fund.id, bob.id)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn reading_links_requires_fund_access() {
    let (engine, db, fund, _owner, bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;
    engine.link_members(ALICE, 1, &[]).await.unwrap();

    assert!(!engine.can_access(BOB, fund.id).await);
    assert_eq!(
        engine.members_of(BOB, 1).await.unwrap_err(),
        EngineError::FundAccessDenied
    );
    assert_eq!(
        engine.member_ids_of(BOB, 1).await.unwrap_err(),
        EngineError::FundAccessDenied
    );
    assert_eq!(
        engine.is_linked(BOB, 1, bob.id).await.unwrap_err(),
        EngineError::FundAccessDenied
    );
    assert_eq!(
        engine.members_of(ALICE, 404).await.unwrap_err(),
        EngineError::TransactionNotFound
    );

    // Once linked to a member, Bob reads Alice's attributions too.
    engine.link_member_to_user(ALICE, bob.id, BOB).await.unwrap();
    assert_eq!(engine.members_of(BOB, 1).await.unwrap().len(), 2);
    assert!(engine.is_linked(BOB, 1, bob.id).await.unwrap());
}

#[tokio::test]
async fn leftover_links_are_cleared_only_from_own_transactions() {
    use chrono::Utc;
    use engine::transaction_members;
    use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait};

    let (engine, db, fund, _owner, _bob) = household().await;
    add_transaction(&db, 1, ALICE, fund.id, 0).await;
    add_transaction(&db, 2, BOB, 0, 0).await;

    // Links to a member row that no longer exists.
    db.execute_unprepared("PRAGMA foreign_keys = OFF").await.unwrap();
    for transaction_id in [1, 2] {
        transaction_members::ActiveModel {
            transaction_id: ActiveValue::Set(transaction_id),
            member_id: ActiveValue::Set(9_999),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&db)
        .await
        .unwrap();
    }
    db.execute_unprepared("PRAGMA foreign_keys = ON").await.unwrap();

    assert_eq!(engine.delete_by_member(BOB, 9_999).await.unwrap(), 1);
    assert_eq!(engine.member_ids_of(ALICE, 1).await.unwrap(), vec![9_999]);
    assert_eq!(engine.delete_by_member(ALICE, 9_999).await.unwrap(), 1);
    assert!(engine.member_ids_of(ALICE, 1).await.unwrap().is_empty());
}
