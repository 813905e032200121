use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use storage::Database;

use super::handlers::{get_game_results, set_final_score, settle_game, update_game_status};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:game_id/final-score", put(set_final_score))
        .route("/:game_id/status", put(update_game_status))
        .route("/:game_id/groups/:group_id/settle", post(settle_game))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:game_id/groups/:group_id/results", get(get_game_results))
        .merge(protected)
}
