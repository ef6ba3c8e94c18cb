//! Request handlers.

pub mod actors;
pub mod movies;

use crate::error::ApiError;
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use casting_core::Page;
use serde::Deserialize;
use serde_json::{Value, json};

pub async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "casting-server" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `?page=N`, 1-based, defaulting to the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(
        query: Result<Query<PageQuery>, QueryRejection>,
        size: u32,
    ) -> Result<Page, ApiError> {
        let Query(query) = query?;
        Page::new(query.page.unwrap_or(1), size)
            .map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}
