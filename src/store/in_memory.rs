use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::SubscriptionCommand;
use crate::domain::subscription_filter::SubscriptionFilter;
use crate::store::{StoreError, SubscriptionStore};

/// Process-local store. Records are kept in creation order, which is also
/// the order `list` returns them in.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Subscription>>, StoreError> {
        self.subscriptions
            .read()
            .map_err(|_| StoreError::Unavailable("subscription lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Subscription>>, StoreError> {
        self.subscriptions
            .write()
            .map_err(|_| StoreError::Unavailable("subscription lock poisoned".to_string()))
    }
}

fn check_price(command: &SubscriptionCommand) -> Result<(), StoreError> {
    if command.price <= 0 {
        return Err(StoreError::ConstraintViolation(format!(
            "price must be greater than zero, got {}",
            command.price
        )));
    }

    Ok(())
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        check_price(command)?;

        let mut subscriptions = self.write()?;

        if subscriptions.iter().any(|subscription| subscription.id == id) {
            return Err(StoreError::ConstraintViolation(format!(
                "subscription {} already exists",
                id
            )));
        }

        let subscription = Subscription {
            id,
            service_name: command.service_name.as_ref().to_string(),
            price: command.price,
            user_id: command.user_id,
            start_date: command.start_date,
            end_date: command.end_date,
            created_at: Utc::now(),
        };
        subscriptions.push(subscription.clone());

        Ok(subscription)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, StoreError> {
        self.read()?
            .iter()
            .find(|subscription| subscription.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        let mut subscriptions = self.write()?;
        let subscription = subscriptions
            .iter_mut()
            .find(|subscription| subscription.id == id)
            .ok_or(StoreError::NotFound)?;

        check_price(command)?;

        subscription.service_name = command.service_name.as_ref().to_string();
        subscription.price = command.price;
        subscription.user_id = command.user_id;
        subscription.start_date = command.start_date;
        subscription.end_date = command.end_date;

        Ok(subscription.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut subscriptions = self.write()?;
        let position = subscriptions
            .iter()
            .position(|subscription| subscription.id == id)
            .ok_or(StoreError::NotFound)?;

        subscriptions.remove(position);

        Ok(())
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, StoreError> {
        Ok(self
            .read()?
            .iter()
            .filter(|subscription| filter.matches(subscription))
            .cloned()
            .collect())
    }

    async fn total_cost(&self, filter: &SubscriptionFilter) -> Result<i64, StoreError> {
        Ok(filter.total_price(self.read()?.iter()))
    }
}
