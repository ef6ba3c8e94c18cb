use super::PageQuery;
use crate::error::ApiError;
use crate::middleware::auth::VerifiedClaims;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use casting_core::{MoviePatch, NewMovie};
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let page = PageQuery::page(query, state.items_per_page())?;
    let movies = state.store.list_movies(page).await?;

    if movies.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "success": true, "movies": movies })))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let movie = state.store.get_movie(id).await?;
    let roles = state.store.movie_roles(id).await?;

    Ok(Json(json!({ "success": true, "movie": movie, "roles": roles })))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<NewMovie>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let page = PageQuery::page(query, state.items_per_page())?;
    let Json(body) = body?;
    let (fields, roles) = body.validate()?;

    let movie = state.store.create_movie(fields, roles).await?;
    tracing::info!(movie_id = movie.id, subject = %caller.subject(), "movie created");

    let movies = state.store.list_movies(page).await?;
    let total = state.store.count_movies().await?;

    Ok(Json(json!({
        "success": true,
        "created": movie.id,
        "movies": movies,
        "total_movies": total,
    })))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<MoviePatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = body?;

    let movie = state.store.update_movie(id, patch).await?;
    tracing::info!(movie_id = id, subject = %caller.subject(), "movie updated");

    Ok(Json(json!({ "success": true, "movie": movie })))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let page = PageQuery::page(query, state.items_per_page())?;

    state.store.delete_movie(id).await?;
    tracing::info!(movie_id = id, subject = %caller.subject(), "movie deleted");

    let movies = state.store.list_movies(page).await?;
    let total = state.store.count_movies().await?;

    Ok(Json(json!({
        "success": true,
        "deleted": id,
        "movies": movies,
        "total_movies": total,
    })))
}
