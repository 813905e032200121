use axum::{Router, middleware, routing::post};
use storage::Database;

use super::handlers::resettle_all;
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .route("/resettle", post(resettle_all))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth))
}
