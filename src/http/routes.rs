//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::game::ports::Phase;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.client_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let allowed_origins: Vec<HeaderValue> = state
            .config
            .client_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    phase: Phase,
    connected_players: usize,
    active_players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health(&state))
}

fn health(state: &AppState) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        phase: state.broadcaster.phase(),
        connected_players: state.arena.player_count(),
        active_players: state.active_set.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::ports::RoundObserver;

    #[test]
    fn health_reports_session() {
        let state = AppState::new(Config::from_lookup(|_| None).unwrap());
        let a = state.arena.join("hal".to_string());
        state.arena.join("ivy".to_string());
        state.active_set.reset([a]);
        state.broadcaster.on_phase_changed(Phase::Round);

        let body = serde_json::to_value(health(&state)).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["phase"], "Round");
        assert_eq!(body["connected_players"], 2);
        assert_eq!(body["active_players"], 1);
    }

    #[test]
    fn router_builds_with_origins() {
        let config = Config::from_lookup(|key| {
            (key == "CLIENT_ORIGIN").then(|| "http://localhost:5173".to_string())
        })
        .unwrap();
        let _router = build_router(AppState::new(config));
    }
}
