use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::routing::{RouteStats, Router as ContentRouter};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub routes: RouteStats,
}

#[derive(Debug, Serialize)]
pub struct ReloadFailure {
    pub error: String,
    /// The table that is still being served.
    pub routes: RouteStats,
}

pub async fn healthcheck() -> &'static str {
    "OK"
}

pub async fn get_stats(State(router): State<Arc<ContentRouter>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        routes: router.stats(),
    })
}

pub async fn post_reload(
    State(router): State<Arc<ContentRouter>>,
) -> Result<Json<StatsResponse>, (StatusCode, Json<ReloadFailure>)> {
    match router.reload().await {
        Ok(routes) => Ok(Json(StatsResponse { routes })),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReloadFailure {
                error: e.to_string(),
                routes: router.stats(),
            }),
        )),
    }
}
