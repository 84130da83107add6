use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted subscription row.
///
/// `id` and `created_at` are assigned once and never change; everything else
/// is replaced wholesale by an update. A missing `end_date` means the
/// subscription is still open.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Subscription {
    pub id: Uuid,
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}
