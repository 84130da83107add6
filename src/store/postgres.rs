use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::SubscriptionCommand;
use crate::domain::subscription_filter::SubscriptionFilter;
use crate::store::{StoreError, SubscriptionStore};

const SUBSCRIPTION_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at";

// Shared by `list` and `total_cost`; binds $1 user_id, $2 service_name,
// $3 from_date, $4 to_date. NULL parameters disable their clause.
const FILTER_PREDICATE: &str = r#"
    ($1::uuid IS NULL OR user_id = $1)
    AND ($2::text IS NULL OR service_name = $2)
    AND ($3::timestamptz IS NULL OR start_date >= $3)
    AND ($4::timestamptz IS NULL OR end_date IS NULL OR end_date <= $4)
"#;

// SQLSTATE codes for unique_violation, check_violation and not_null_violation
const CONSTRAINT_VIOLATION_CODES: [&str; 3] = ["23505", "23514", "23502"];

pub struct PostgresSubscriptionStore {
    db_pool: PgPool,
}

impl PostgresSubscriptionStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err)
                if db_err
                    .code()
                    .map_or(false, |code| CONSTRAINT_VIOLATION_CODES.contains(&&*code)) =>
            {
                StoreError::ConstraintViolation(db_err.message().to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    #[tracing::instrument(
        name = "Insert a new subscription into the database",
        skip(self, command),
        fields(subscription_id = %id)
    )]
    async fn create(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        let query = format!(
            r#"
            INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        );

        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(command.service_name.as_ref())
            .bind(command.price)
            .bind(command.user_id)
            .bind(command.start_date)
            .bind(command.end_date)
            .bind(Utc::now())
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })
    }

    #[tracing::instrument(
        name = "Fetch a subscription by id",
        skip(self),
        fields(subscription_id = %id)
    )]
    async fn get_by_id(&self, id: Uuid) -> Result<Subscription, StoreError> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SUBSCRIPTION_COLUMNS
        );

        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })?
            .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument(
        name = "Replace a subscription in the database",
        skip(self, command),
        fields(subscription_id = %id)
    )]
    async fn update(
        &self,
        id: Uuid,
        command: &SubscriptionCommand,
    ) -> Result<Subscription, StoreError> {
        let query = format!(
            r#"
            UPDATE subscriptions
            SET service_name = $2, price = $3, user_id = $4, start_date = $5, end_date = $6
            WHERE id = $1
            RETURNING {}
            "#,
            SUBSCRIPTION_COLUMNS
        );

        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(command.service_name.as_ref())
            .bind(command.price)
            .bind(command.user_id)
            .bind(command.start_date)
            .bind(command.end_date)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })?
            .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument(
        name = "Delete a subscription from the database",
        skip(self),
        fields(subscription_id = %id)
    )]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(name = "List subscriptions matching a filter", skip(self))]
    async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, StoreError> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE {} ORDER BY created_at, id",
            SUBSCRIPTION_COLUMNS, FILTER_PREDICATE
        );

        sqlx::query_as::<_, Subscription>(&query)
            .bind(filter.user_id)
            .bind(filter.service_name.as_deref())
            .bind(filter.from_date)
            .bind(filter.to_date)
            .fetch_all(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })
    }

    #[tracing::instrument(name = "Sum subscription prices matching a filter", skip(self))]
    async fn total_cost(&self, filter: &SubscriptionFilter) -> Result<i64, StoreError> {
        // SUM over BIGINT yields NUMERIC and NULL on no rows
        let query = format!(
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions WHERE {}",
            FILTER_PREDICATE
        );

        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.user_id)
            .bind(filter.service_name.as_deref())
            .bind(filter.from_date)
            .bind(filter.to_date)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::from(err)
            })
    }
}
