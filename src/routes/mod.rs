mod api_doc;
mod health_check;
mod subscriptions;

pub use api_doc::{ApiDoc, OPENAPI_JSON_PATH};
pub use health_check::health_check;
pub use subscriptions::*;
