/// HTTP router assembly
use crate::{api, middleware, services::AuthService, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn create_router(app_state: AppState, auth_service: Arc<AuthService>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(api::health::health));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Tracks
        .route("/tracks", get(api::tracks::list_tracks))
        .route("/tracks", post(api::tracks::create_track))
        .route("/tracks/:id", get(api::tracks::get_track))
        // Playlists
        .route("/playlists", get(api::playlists::list_playlists))
        .route("/playlists", post(api::playlists::create_playlist))
        .route("/playlists/search", get(api::playlists::search_playlists))
        .route("/playlists/:id", get(api::playlists::get_playlist))
        .route("/playlists/:id", put(api::playlists::update_playlist))
        .route("/playlists/:id", delete(api::playlists::delete_playlist))
        // Playlist items
        .route(
            "/playlists/:id/items",
            post(api::playlist_items::add_item),
        )
        .route(
            "/playlists/:id/items/:item_id",
            delete(api::playlist_items::remove_item),
        )
        .route(
            "/playlists/:id/items/:item_id/position",
            put(api::playlist_items::move_item),
        )
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::auth_middleware,
        ));

    // Combine routes
    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
