//! Router assembly.
//!
//! Each method on each path carries its own permission; the table below is
//! the single source of truth for access control.

use crate::handlers::{self, actors, movies};
use crate::middleware::auth::{RouteGuard, require_permission};
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use casting_core::Permission;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: Arc<AppState>) -> Router {
    let authorizer = state.authorizer.clone();
    let guard = |permission: Permission| {
        from_fn_with_state(RouteGuard::new(authorizer.clone(), permission), require_permission)
    };

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/movies",
            get(movies::list_movies)
                .route_layer(guard(Permission::GetMovies))
                .merge(post(movies::create_movie).route_layer(guard(Permission::PostMovies))),
        )
        .route(
            "/movies/{id}",
            // Reading a single movie needs the edit permission.
            get(movies::get_movie)
                .route_layer(guard(Permission::PatchMovies))
                .merge(patch(movies::update_movie).route_layer(guard(Permission::PatchMovies)))
                .merge(delete(movies::delete_movie).route_layer(guard(Permission::DeleteMovies))),
        )
        .route(
            "/actors",
            get(actors::list_actors)
                .route_layer(guard(Permission::GetActors))
                .merge(post(actors::create_actor).route_layer(guard(Permission::PostActors))),
        )
        .route(
            "/actors/{id}",
            get(actors::get_actor)
                .route_layer(guard(Permission::PatchActors))
                .merge(patch(actors::update_actor).route_layer(guard(Permission::PatchActors)))
                .merge(delete(actors::delete_actor).route_layer(guard(Permission::DeleteActors))),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
