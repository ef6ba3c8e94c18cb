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
use casting_core::{ActorPatch, NewActor};
use serde_json::{Value, json};
use std::sync::Arc;

pub async fn list_actors(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let page = PageQuery::page(query, state.items_per_page())?;
    let actors = state.store.list_actors(page).await?;

    if actors.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "success": true, "actors": actors })))
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let actor = state.store.get_actor(id).await?;
    let roles = state.store.actor_roles(id).await?;

    Ok(Json(json!({ "success": true, "actor": actor, "roles": roles })))
}

pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    query: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<NewActor>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let page = PageQuery::page(query, state.items_per_page())?;
    let Json(body) = body?;
    let fields = body.validate()?;

    let actor = state.store.create_actor(fields).await?;
    tracing::info!(actor_id = actor.id, subject = %caller.subject(), "actor created");

    let actors = state.store.list_actors(page).await?;
    let total = state.store.count_actors().await?;

    Ok(Json(json!({
        "success": true,
        "created": actor.id,
        "actors": actors,
        "total_actors": total,
    })))
}

pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ActorPatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = body?;

    let actor = state.store.update_actor(id, patch).await?;
    tracing::info!(actor_id = id, subject = %caller.subject(), "actor updated");

    Ok(Json(json!({ "success": true, "actor": actor })))
}

pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<VerifiedClaims>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let page = PageQuery::page(query, state.items_per_page())?;

    state.store.delete_actor(id).await?;
    tracing::info!(actor_id = id, subject = %caller.subject(), "actor deleted");

    let actors = state.store.list_actors(page).await?;
    let total = state.store.count_actors().await?;

    Ok(Json(json!({
        "success": true,
        "deleted": id,
        "actors": actors,
        "total_actors": total,
    })))
}
