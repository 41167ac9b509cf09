use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::SharedState;

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (outside /api prefix)
        .route("/health", get(handlers::health))
        // Game lifecycle
        .route("/api/games", post(handlers::create_game))
        .route("/api/games/load", post(handlers::load_game))
        .route(
            "/api/games/{id}",
            get(handlers::get_game).delete(handlers::delete_game),
        )
        // Moves
        .route("/api/games/{id}/moves", post(handlers::make_move))
        .route("/api/games/{id}/promotion", post(handlers::promote))
        .route("/api/games/{id}/undo", post(handlers::undo_move))
        .route("/api/games/{id}/legal-moves", get(handlers::legal_moves))
        // AI
        .route("/api/games/{id}/hint", post(handlers::hint))
        // Position and history
        .route(
            "/api/games/{id}/position",
            get(handlers::export_position).put(handlers::import_position),
        )
        .route("/api/games/{id}/history", get(handlers::history))
        .route("/api/games/{id}/replay", post(handlers::replay))
        .route("/api/games/{id}/save", get(handlers::save_game))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
