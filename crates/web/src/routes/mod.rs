use axum::Router;
use storage::Database;

use crate::features::{games, groups, predictions, settlements};
use crate::middleware::auth::ApiKeys;

/// Every endpoint served under `/api`
pub fn api(api_keys: ApiKeys) -> Router<Database> {
    Router::new()
        .nest("/games", games::routes::routes(api_keys.clone()))
        .nest("/predictions", predictions::routes::routes(api_keys.clone()))
        .nest("/settlements", settlements::routes::routes(api_keys))
        .nest("/groups", groups::routes::routes())
}
