use actix_web::web;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::service_name::ServiceName;

/// Mutable fields of a subscription, validated and ready to be persisted.
///
/// Used both for creation and for full-replacement updates. Price positivity
/// is left to the store, which reports it as a constraint violation.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionCommand {
    pub service_name: ServiceName,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Request body of create and update. Omitting `end_date` leaves the
/// subscription open.
#[derive(Deserialize, Debug, utoipa::ToSchema)]
pub struct SubscriptionBody {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl TryFrom<web::Json<SubscriptionBody>> for SubscriptionCommand {
    type Error = String;

    fn try_from(body: web::Json<SubscriptionBody>) -> Result<Self, Self::Error> {
        let body = body.into_inner();
        let service_name = ServiceName::parse(body.service_name)?;

        Ok(SubscriptionCommand {
            service_name,
            price: body.price,
            user_id: body.user_id,
            start_date: body.start_date,
            end_date: body.end_date,
        })
    }
}
