use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::subscription::Subscription;

/// Optional constraints shared by listing and total-cost queries.
///
/// A record matches when every set dimension holds; unset dimensions do not
/// constrain anything. The upper bound is not an interval-overlap test: an
/// open subscription (no `end_date`) satisfies any `to_date`, and a closed one
/// satisfies it only when it ended on or before `to_date`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl SubscriptionFilter {
    pub fn matches(&self, subscription: &Subscription) -> bool {
        let owner = self
            .user_id
            .map_or(true, |user_id| subscription.user_id == user_id);
        let service = self
            .service_name
            .as_deref()
            .map_or(true, |name| subscription.service_name == name);
        let range_start = self
            .from_date
            .map_or(true, |from_date| subscription.start_date >= from_date);
        let range_end = match (self.to_date, subscription.end_date) {
            (None, _) | (Some(_), None) => true,
            (Some(to_date), Some(end_date)) => end_date <= to_date,
        };

        owner && service && range_start && range_end
    }

    /// Sum of prices over the matching subscriptions; zero when none match.
    pub fn total_price<'a, I>(&self, subscriptions: I) -> i64
    where
        I: IntoIterator<Item = &'a Subscription>,
    {
        subscriptions
            .into_iter()
            .filter(|subscription| self.matches(subscription))
            .map(|subscription| subscription.price)
            .sum()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        *self == SubscriptionFilter::default()
    }
}

/// Raw query string of the listing and total endpoints.
///
/// Every parameter is optional. Empty or unparseable values leave the
/// corresponding dimension unset instead of failing the request. When a key
/// is repeated only its first value counts; unknown keys are ignored.
#[derive(Debug, Default, PartialEq)]
pub struct FilterParameters {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl FromIterator<(String, String)> for FilterParameters {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut parameters = FilterParameters::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "user_id" => &mut parameters.user_id,
                "service_name" => &mut parameters.service_name,
                "from_date" => &mut parameters.from_date,
                "to_date" => &mut parameters.to_date,
                _ => continue,
            };

            if slot.is_none() {
                *slot = Some(value);
            }
        }

        parameters
    }
}

impl From<FilterParameters> for SubscriptionFilter {
    fn from(parameters: FilterParameters) -> Self {
        SubscriptionFilter {
            user_id: non_empty(parameters.user_id).and_then(|value| Uuid::parse_str(&value).ok()),
            service_name: non_empty(parameters.service_name),
            from_date: non_empty(parameters.from_date).and_then(parse_timestamp),
            to_date: non_empty(parameters.to_date).and_then(parse_timestamp),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn parse_timestamp(value: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}
