use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::subscription::Subscription;
use crate::domain::subscription_command::{SubscriptionBody, SubscriptionCommand};
use crate::domain::subscription_filter::{FilterParameters, SubscriptionFilter};
use crate::service::SubscriptionService;
use crate::store::StoreError;

#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct TotalCostResponse {
    pub total: i64,
}

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::ConstraintViolation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        })
    }
}

/// Turns body extraction failures into the structured error body.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected request payload: {}", err);
    ApiError::InvalidInput(format!("invalid request payload: {}", err)).into()
}

// Decoding into raw pairs never fails, so a malformed query string can only
// leave filter dimensions unset.
fn filter_from_query(query: web::Query<Vec<(String, String)>>) -> SubscriptionFilter {
    SubscriptionFilter::from(query.into_inner().into_iter().collect::<FilterParameters>())
}

fn parse_subscription_id(raw_id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw_id).map_err(|_| ApiError::InvalidInput("invalid subscription ID".to_string()))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = SubscriptionBody,
    responses(
        (status = 201, description = "Subscription created", body = Subscription),
        (status = 400, description = "Invalid body or violated constraint", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    name = "Creating a new subscription handler",
    skip(body, service),
    fields(
        service_name = %body.service_name,
        user_id = %body.user_id
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<SubscriptionBody>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let command: SubscriptionCommand = body.try_into().map_err(|err: String| {
        tracing::error!("Validation error: {:?}", err);
        ApiError::InvalidInput(err)
    })?;

    let subscription = service.create_subscription(command).await?;

    Ok(HttpResponse::Created().json(subscription))
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 200, description = "Subscription found", body = Subscription),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Fetching a subscription handler", skip(service))]
pub async fn handle_get_subscription(
    path: web::Path<String>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_subscription_id(&path)?;
    let subscription = service.get_subscription(id).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    request_body = SubscriptionBody,
    responses(
        (status = 200, description = "Subscription replaced", body = Subscription),
        (status = 400, description = "Malformed id, invalid body or violated constraint", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    name = "Updating a subscription handler",
    skip(body, service),
    fields(
        service_name = %body.service_name,
        user_id = %body.user_id
    )
)]
pub async fn handle_update_subscription(
    path: web::Path<String>,
    body: web::Json<SubscriptionBody>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_subscription_id(&path)?;
    let command: SubscriptionCommand = body.try_into().map_err(|err: String| {
        tracing::error!("Validation error: {:?}", err);
        ApiError::InvalidInput(err)
    })?;

    let subscription = service.update_subscription(id, command).await?;

    Ok(HttpResponse::Ok().json(subscription))
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = Uuid, Path, description = "Subscription id")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Deleting a subscription handler", skip(service))]
pub async fn handle_delete_subscription(
    path: web::Path<String>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_subscription_id(&path)?;
    service.delete_subscription(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Owner of the subscriptions"),
        ("service_name" = Option<String>, Query, description = "Exact, case-sensitive service name"),
        ("from_date" = Option<String>, Query, description = "RFC 3339; subscriptions starting on or after it"),
        ("to_date" = Option<String>, Query, description = "RFC 3339; subscriptions ended on or before it, or still open")
    ),
    responses(
        (status = 200, description = "Matching subscriptions", body = [Subscription]),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Listing subscriptions handler", skip(service))]
pub async fn handle_list_subscriptions(
    query: web::Query<Vec<(String, String)>>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let filter = filter_from_query(query);
    let subscriptions = service.list_subscriptions(filter).await?;

    Ok(HttpResponse::Ok().json(subscriptions))
}

#[utoipa::path(
    get,
    path = "/subscriptions/total",
    tag = "subscriptions",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Owner of the subscriptions"),
        ("service_name" = Option<String>, Query, description = "Exact, case-sensitive service name"),
        ("from_date" = Option<String>, Query, description = "RFC 3339; subscriptions starting on or after it"),
        ("to_date" = Option<String>, Query, description = "RFC 3339; subscriptions ended on or before it, or still open")
    ),
    responses(
        (status = 200, description = "Sum of matching prices, 0 when nothing matches", body = TotalCostResponse),
        (status = 500, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(name = "Total subscription cost handler", skip(service))]
pub async fn handle_get_total_cost(
    query: web::Query<Vec<(String, String)>>,
    service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, ApiError> {
    let filter = filter_from_query(query);
    let total = service.get_total_cost(filter).await?;

    Ok(HttpResponse::Ok().json(TotalCostResponse { total }))
}
