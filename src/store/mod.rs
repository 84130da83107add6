use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::SubscriptionCommand;
use crate::domain::subscription_filter::SubscriptionFilter;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemorySubscriptionStore;
pub use postgres::PostgresSubscriptionStore;

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("subscription not found")]
    NotFound,
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

/// Owner of persisted subscriptions.
///
/// Identity is assigned by the caller; the store stamps `created_at` on
/// creation and keeps it on update. `list` and `total_cost` must agree on
/// which records a filter selects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, StoreError>;

    /// Replaces every mutable field. Never inserts.
    async fn update(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, StoreError>;

    async fn total_cost(&self, filter: &SubscriptionFilter) -> Result<i64, StoreError>;
}
