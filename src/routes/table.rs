//! Table routes built from the resolved model. Handlers resolve the table by path.

use crate::handlers::table::{bulk_create, count, create, delete as delete_handler, first, list, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn table_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/:table",
            get(list).post(create).patch(update).delete(delete_handler),
        )
        .route("/:table/count", get(count))
        .route("/:table/first", get(first))
        .route("/:table/bulk", post(bulk_create))
        .with_state(state)
}
