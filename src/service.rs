use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::SubscriptionCommand;
use crate::domain::subscription_filter::SubscriptionFilter;
use crate::store::{StoreError, SubscriptionStore};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Operations exposed to the HTTP layer.
///
/// Apart from handing out identifiers on creation everything is delegated to
/// the store, bounded by a per-operation deadline.
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    deadline: Duration,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>, deadline: Option<Duration>) -> Self {
        Self {
            store,
            deadline: deadline.unwrap_or(DEFAULT_DEADLINE),
        }
    }

    #[tracing::instrument(
        name = "Create a subscription",
        skip(self, command),
        fields(
            service_name = %command.service_name.as_ref(),
            user_id = %command.user_id,
            subscription_id = tracing::field::Empty
        )
    )]
    pub async fn create_subscription(
        &self,
        command: SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        let id = Uuid::new_v4();
        tracing::Span::current().record("subscription_id", &tracing::field::display(id));

        self.with_deadline(self.store.create(id, &command)).await
    }

    #[tracing::instrument(name = "Get a subscription", skip(self))]
    pub async fn get_subscription(&self, id: Uuid) -> Result<Subscription, StoreError> {
        self.with_deadline(self.store.get_by_id(id)).await
    }

    #[tracing::instrument(name = "Update a subscription", skip(self, command))]
    pub async fn update_subscription(
        &self,
        id: Uuid,
        command: SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        self.with_deadline(self.store.update(id, &command)).await
    }

    #[tracing::instrument(name = "Delete a subscription", skip(self))]
    pub async fn delete_subscription(&self, id: Uuid) -> Result<(), StoreError> {
        self.with_deadline(self.store.delete(id)).await
    }

    #[tracing::instrument(name = "List subscriptions", skip(self))]
    pub async fn list_subscriptions(
        &self,
        filter: SubscriptionFilter,
    ) -> Result<Vec<Subscription>, StoreError> {
        self.with_deadline(self.store.list(&filter)).await
    }

    #[tracing::instrument(name = "Get total subscription cost", skip(self))]
    pub async fn get_total_cost(&self, filter: SubscriptionFilter) -> Result<i64, StoreError> {
        self.with_deadline(self.store.total_cost(&filter)).await
    }

    async fn with_deadline<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.deadline, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Storage did not answer within {:?}", self.deadline);
                Err(StoreError::Unavailable(format!(
                    "storage did not answer within {:?}",
                    self.deadline
                )))
            }
        }
    }
}
