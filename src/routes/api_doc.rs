use utoipa::OpenApi;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::SubscriptionBody;
use crate::routes::{ErrorResponse, TotalCostResponse};

/// Served as JSON next to the Swagger UI.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subscription aggregator",
        description = "CRUD over user subscriptions plus filtered listing and total cost."
    ),
    paths(
        super::health_check::health_check,
        super::subscriptions::handle_create_subscription,
        super::subscriptions::handle_list_subscriptions,
        super::subscriptions::handle_get_total_cost,
        super::subscriptions::handle_get_subscription,
        super::subscriptions::handle_update_subscription,
        super::subscriptions::handle_delete_subscription,
    ),
    components(schemas(Subscription, SubscriptionBody, ErrorResponse, TotalCostResponse)),
    tags(
        (name = "subscriptions", description = "Subscription records and aggregation"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
