//! These tests need a reachable Postgres described by `config/`.
//! Run them with `cargo test -- --ignored`.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use subscription_aggregator::domain::service_name::ServiceName;
use subscription_aggregator::domain::subscription::Subscription;
use subscription_aggregator::domain::subscription_command::SubscriptionCommand;
use subscription_aggregator::domain::subscription_filter::SubscriptionFilter;
use subscription_aggregator::store::{PostgresSubscriptionStore, StoreError, SubscriptionStore};
use uuid::Uuid;

use crate::helpers::{configure_db, subscription_body, TestApp};

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn command(
    user_id: Uuid,
    service_name: &str,
    price: i64,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
) -> SubscriptionCommand {
    SubscriptionCommand {
        service_name: ServiceName::parse(service_name.to_string()).unwrap(),
        price,
        user_id,
        start_date,
        end_date,
    }
}

async fn postgres_store() -> PostgresSubscriptionStore {
    let (_, db_pool) = configure_db().await;

    PostgresSubscriptionStore::new(db_pool)
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn created_subscription_is_read_back_unchanged() {
    let store = postgres_store().await;
    let id = Uuid::new_v4();
    let new_subscription = command(
        Uuid::new_v4(),
        "Yandex Plus",
        599,
        date(2025, 7, 1),
        Some(date(2025, 8, 1)),
    );

    let created = store.create(id, &new_subscription).await.unwrap();
    let fetched = store.get_by_id(id).await.unwrap();

    assert_eq!(fetched.id, id);
    assert_eq!(fetched.service_name, "Yandex Plus");
    assert_eq!(fetched.price, 599);
    assert_eq!(fetched.user_id, new_subscription.user_id);
    assert_eq!(fetched.start_date, new_subscription.start_date);
    assert_eq!(fetched.end_date, new_subscription.end_date);
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn check_and_unique_constraints_are_reported_as_violations() {
    let store = postgres_store().await;
    let id = Uuid::new_v4();

    let zero_price = store
        .create(id, &command(Uuid::new_v4(), "Netflix", 0, date(2025, 1, 1), None))
        .await;

    assert!(matches!(zero_price, Err(StoreError::ConstraintViolation(_))));
    assert!(matches!(store.get_by_id(id).await, Err(StoreError::NotFound)));

    let valid = command(Uuid::new_v4(), "Netflix", 999, date(2025, 1, 1), None);
    store.create(id, &valid).await.unwrap();

    assert!(matches!(
        store.create(id, &valid).await,
        Err(StoreError::ConstraintViolation(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn update_and_delete_of_missing_ids_are_not_found() {
    let store = postgres_store().await;
    let replacement = command(Uuid::new_v4(), "Netflix", 999, date(2025, 1, 1), None);

    assert!(matches!(
        store.update(Uuid::new_v4(), &replacement).await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.delete(Uuid::new_v4()).await,
        Err(StoreError::NotFound)
    ));
    assert!(store.list(&SubscriptionFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn update_keeps_identity_and_delete_is_not_idempotent() {
    let store = postgres_store().await;
    let id = Uuid::new_v4();
    let created = store
        .create(
            id,
            &command(Uuid::new_v4(), "Netflix", 999, date(2025, 1, 1), Some(date(2025, 2, 1))),
        )
        .await
        .unwrap();

    let updated = store
        .update(id, &command(Uuid::new_v4(), "Spotify", 299, date(2025, 3, 1), None))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.service_name, "Spotify");
    assert!(updated.is_open());

    store.delete(id).await.unwrap();

    assert!(matches!(store.delete(id).await, Err(StoreError::NotFound)));
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn sql_predicate_agrees_with_the_in_memory_filter() {
    let store = postgres_store().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let commands = vec![
        command(alice, "Netflix", 999, date(2025, 1, 1), None),
        command(alice, "Spotify", 299, date(2024, 3, 1), Some(date(2024, 9, 1))),
        command(alice, "Yandex Plus", 599, date(2025, 3, 1), Some(date(2025, 6, 1))),
        command(bob, "Netflix", 1099, date(2024, 6, 1), None),
        command(bob, "Spotify", 199, date(2023, 1, 1), Some(date(2026, 1, 1))),
    ];
    let mut stored: Vec<Subscription> = Vec::new();

    for new_subscription in &commands {
        stored.push(store.create(Uuid::new_v4(), new_subscription).await.unwrap());
    }

    for mask in 0..16u8 {
        let filter = SubscriptionFilter {
            user_id: (mask & 1 != 0).then_some(alice),
            service_name: (mask & 2 != 0).then(|| "Netflix".to_string()),
            from_date: (mask & 4 != 0).then_some(date(2024, 6, 1)),
            to_date: (mask & 8 != 0).then_some(date(2025, 1, 1)),
        };

        let mut listed: Vec<Uuid> = store
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|subscription| subscription.id)
            .collect();
        let mut expected: Vec<Uuid> = stored
            .iter()
            .filter(|subscription| filter.matches(subscription))
            .map(|subscription| subscription.id)
            .collect();
        listed.sort();
        expected.sort();

        assert_eq!(listed, expected, "listing diverged for {:?}", filter);
        assert_eq!(
            store.total_cost(&filter).await.unwrap(),
            filter.total_price(&stored),
            "total diverged for {:?}",
            filter
        );
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn http_api_works_on_top_of_postgres() {
    let store = postgres_store().await;
    let test_app = TestApp::spawn_app_with_store(Arc::new(store)).await;
    let user_id = Uuid::new_v4();

    let response = test_app
        .post_subscription(&subscription_body(
            "Yandex Plus",
            599,
            user_id,
            "2025-07-01T00:00:00Z",
            None,
        ))
        .await;

    assert_eq!(201, response.status().as_u16());

    let user_id = user_id.to_string();
    let total: serde_json::Value = test_app
        .get_total_cost(&[("user_id", user_id.as_str())])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(total["total"], 599);
}

#[tokio::test]
#[ignore = "requires a running Postgres instance"]
async fn nul_in_service_name_is_a_client_error_on_postgres() {
    let store = postgres_store().await;
    let test_app = TestApp::spawn_app_with_store(Arc::new(store)).await;

    let response = test_app
        .post_subscription(&subscription_body(
            "Net\u{0}flix",
            999,
            Uuid::new_v4(),
            "2025-07-01T00:00:00Z",
            None,
        ))
        .await;

    assert_eq!(400, response.status().as_u16());
}
