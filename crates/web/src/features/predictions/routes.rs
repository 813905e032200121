use axum::{Router, middleware, routing::put};
use storage::Database;

use super::handlers::override_prediction;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .route("/:prediction_id", put(override_prediction))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
