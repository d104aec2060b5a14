//! `UserRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};

use mail_orchestrator_core::error::{CoreError, CoreResult};
use mail_orchestrator_core::traits::UserRepository;
use mail_orchestrator_core::types::{Domain, User};
use mail_orchestrator_core::utils::domain_name::canonical;

use super::entity::{domain_claim, user};
use super::{format_timestamp, SqliteStore};

impl user::Model {
    /// Convert a row into a domain `User`.
    fn into_user(self) -> CoreResult<User> {
        let domains: Vec<Domain> = serde_json::from_str(&self.domains)
            .map_err(|e| CoreError::SerializationError(format!("Invalid domains: {e}")))?;
        Ok(User {
            id: self.id,
            domains,
        })
    }
}

fn user_to_active_model(user: &User) -> CoreResult<user::ActiveModel> {
    let domains = serde_json::to_string(&user.domains)
        .map_err(|e| CoreError::SerializationError(e.to_string()))?;
    Ok(user::ActiveModel {
        id: Set(user.id.clone()),
        domains: Set(domains),
        updated_at: Set(format_timestamp(&chrono::Utc::now())),
    })
}

fn claims_of(user: &User) -> Vec<domain_claim::ActiveModel> {
    user.claimed_names()
        .map(|(name, kind)| domain_claim::ActiveModel {
            name: Set(canonical(name)),
            user_id: Set(user.id.clone()),
            kind: Set(kind.as_str().to_string()),
        })
        .collect()
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
        let row = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query user: {e}")))?;

        row.map(user::Model::into_user).transpose()
    }

    async fn save(&self, user: &User) -> CoreResult<()> {
        let active_model = user_to_active_model(user)?;
        let claims = claims_of(user);

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to begin transaction: {e}")))?;

        user::Entity::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(user::Column::Id)
                    .update_columns([user::Column::Domains, user::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to save user: {e}")))?;

        // Rebuild this user's domain claims
        domain_claim::Entity::delete_many()
            .filter(domain_claim::Column::UserId.eq(user.id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to clear domain claims: {e}")))?;

        for claim in claims {
            domain_claim::Entity::insert(claim)
                .exec(&txn)
                .await
                .map_err(|e| {
                    CoreError::StorageError(format!("Failed to save domain claim: {e}"))
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to commit user: {e}")))?;

        Ok(())
    }

    async fn count_by_domain(&self, domain: &str) -> CoreResult<u64> {
        domain_claim::Entity::find()
            .filter(domain_claim::Column::Name.eq(canonical(domain)))
            .count(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to count domain claims: {e}")))
    }
}
