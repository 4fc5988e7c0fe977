use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::accounts::AccountEntity;

#[async_trait]
#[automock]
pub trait AccountRepository {
    async fn find_by_id(&self, account_id: Uuid) -> Result<Option<AccountEntity>>;
}
