use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, prelude::*, sea_query::Expr};

use crate::{
    CurrencyCode, EngineError, Fund, FundRole, FundSummary, IdKind, ResultEngine, UserProfile,
    fund_members, funds, users,
};

use super::{
    Engine,
    access::{member_role, require_access, require_live_fund, require_modify},
    normalize_required_name, require_fund_id, require_uid, with_tx,
};

impl Engine {
    /// Profile of a live user from the directory.
    pub(crate) async fn user_profile(&self, uid: i64) -> ResultEngine<Option<UserProfile>> {
        let row = users::Entity::find_by_id(uid)
            .filter(users::Column::Deleted.eq(false))
            .one(&self.directory)
            .await?;
        Ok(row.map(UserProfile::from))
    }

    /// Creates a fund owned by `uid`, together with its owner member.
    ///
    /// The owner member snapshots the caller's nickname and email.
    pub async fn create_fund(&self, uid: i64, name: &str, currency: &str) -> ResultEngine<Fund> {
        require_uid(uid)?;
        let name = normalize_required_name(name, "fund")?;
        let currency = CurrencyCode::try_from(currency)?;
        let profile = self.user_profile(uid).await?;
        let fund_id = self.next_id(IdKind::Fund)?;
        let member_id = self.next_id(IdKind::FundMember)?;
        let now = Utc::now();

        with_tx!(self, uid, |db_tx| {
            let fund = funds::ActiveModel {
                fund_id: ActiveValue::Set(fund_id),
                name: ActiveValue::Set(name),
                owner_uid: ActiveValue::Set(uid),
                default_currency: ActiveValue::Set(currency.into()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                deleted: ActiveValue::Set(false),
                deleted_at: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            let (member_name, member_email) = profile
                .map(|p| (p.nickname, p.email))
                .unwrap_or_default();
            fund_members::ActiveModel {
                member_id: ActiveValue::Set(member_id),
                fund_id: ActiveValue::Set(fund_id),
                name: ActiveValue::Set(member_name),
                email: ActiveValue::Set(member_email),
                role: ActiveValue::Set(FundRole::Owner.as_str().to_string()),
                linked_uid: ActiveValue::Set(uid),
                created_by: ActiveValue::Set(uid),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!("user {} created fund {}", uid, fund_id);
            Ok(Fund::from(fund))
        })
    }

    /// Returns a live fund the caller can access.
    pub async fn get_fund(&self, uid: i64, fund_id: i64) -> ResultEngine<Fund> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        with_tx!(self, uid, |db_tx| {
            let fund = require_live_fund(&db_tx, fund_id).await?;
            require_access(&db_tx, uid, fund_id).await?;
            Ok(Fund::from(fund))
        })
    }

    /// Lists every live fund `uid` is a member of, oldest first, with the
    /// caller's role and the member count.
    pub async fn list_funds(&self, uid: i64) -> ResultEngine<Vec<FundSummary>> {
        require_uid(uid)?;
        with_tx!(self, uid, |db_tx| {
            let links = fund_members::Entity::find()
                .filter(fund_members::Column::LinkedUid.eq(uid))
                .all(&db_tx)
                .await?;
            let mut roles = HashMap::with_capacity(links.len());
            for link in &links {
                roles.insert(link.fund_id, FundRole::try_from(link.role.as_str())?);
            }

            let models = funds::Entity::find()
                .filter(funds::Column::FundId.is_in(roles.keys().copied()))
                .filter(funds::Column::Deleted.eq(false))
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let member_count = fund_members::Entity::find()
                    .filter(fund_members::Column::FundId.eq(model.fund_id))
                    .count(&db_tx)
                    .await?;
                let role = roles
                    .get(&model.fund_id)
                    .copied()
                    .unwrap_or(FundRole::Member);
                out.push(FundSummary {
                    fund: Fund::from(model),
                    role,
                    member_count,
                });
            }
            out.sort_by(|a, b| crate::funds::fund_order(&a.fund, &b.fund));
            Ok(out)
        })
    }

    /// Renames a fund and changes its default currency (owner-only).
    pub async fn modify_fund(
        &self,
        uid: i64,
        fund_id: i64,
        name: &str,
        currency: &str,
    ) -> ResultEngine<Fund> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        let name = normalize_required_name(name, "fund")?;
        let currency = CurrencyCode::try_from(currency)?;

        with_tx!(self, uid, |db_tx| {
            require_modify(&db_tx, uid, fund_id).await?;
            let res = funds::Entity::update_many()
                .col_expr(funds::Column::Name, Expr::value(name))
                .col_expr(
                    funds::Column::DefaultCurrency,
                    Expr::value(String::from(currency)),
                )
                .col_expr(funds::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(funds::Column::FundId.eq(fund_id))
                .filter(funds::Column::Deleted.eq(false))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::FundNotFound);
            }
            let fund = require_live_fund(&db_tx, fund_id).await?;
            Ok(Fund::from(fund))
        })
    }

    /// Soft-deletes a fund (owner-only). Members and records keep pointing
    /// at it.
    pub async fn delete_fund(&self, uid: i64, fund_id: i64) -> ResultEngine<()> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        with_tx!(self, uid, |db_tx| {
            require_modify(&db_tx, uid, fund_id).await?;
            let now = Utc::now();
            let res = funds::Entity::update_many()
                .col_expr(funds::Column::Deleted, Expr::value(true))
                .col_expr(funds::Column::DeletedAt, Expr::value(now))
                .col_expr(funds::Column::UpdatedAt, Expr::value(now))
                .filter(funds::Column::FundId.eq(fund_id))
                .filter(funds::Column::Deleted.eq(false))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::FundNotFound);
            }
            tracing::info!("user {} deleted fund {}", uid, fund_id);
            Ok(())
        })
    }

    /// Role of `uid` in `fund_id`. Not being a member is `FundAccessDenied`.
    pub async fn get_role(&self, uid: i64, fund_id: i64) -> ResultEngine<FundRole> {
        require_uid(uid)?;
        require_fund_id(fund_id)?;
        with_tx!(self, uid, |db_tx| {
            let role = member_role(&db_tx, uid, fund_id)
                .await?
                .ok_or(EngineError::FundAccessDenied)?;
            Ok(role)
        })
    }
}
