//! # casting-store
//!
//! Persistence for movies, actors and the roles linking them.
//!
//! Handlers talk to a [`CastingStore`] trait object; [`SqliteStore`] is the
//! implementation backed by `sqlx` and SQLite.

pub mod error;
pub mod sqlite;

pub use error::StoreError;
pub use sqlite::SqliteStore;
pub use sqlx;

use async_trait::async_trait;
use casting_core::{
    Actor, ActorFields, ActorPatch, Movie, MovieFields, MoviePatch, MovieRole, Page,
    RoleAssignment,
};

/// Movie and actor persistence.
///
/// Listings are ordered by id. `update_*` and `delete_*` return
/// [`StoreError::NotFound`] when the id does not exist.
#[async_trait]
pub trait CastingStore: Send + Sync {
    async fn list_movies(&self, page: Page) -> Result<Vec<Movie>, StoreError>;

    async fn count_movies(&self) -> Result<i64, StoreError>;

    async fn get_movie(&self, id: i64) -> Result<Movie, StoreError>;

    /// Roles cast in movie `id`.
    async fn movie_roles(&self, id: i64) -> Result<Vec<MovieRole>, StoreError>;

    /// Insert a movie and its role assignments atomically.
    async fn create_movie(
        &self,
        fields: MovieFields,
        roles: Vec<RoleAssignment>,
    ) -> Result<Movie, StoreError>;

    async fn update_movie(&self, id: i64, patch: MoviePatch) -> Result<Movie, StoreError>;

    /// Delete a movie together with its role rows.
    async fn delete_movie(&self, id: i64) -> Result<(), StoreError>;

    async fn list_actors(&self, page: Page) -> Result<Vec<Actor>, StoreError>;

    async fn count_actors(&self) -> Result<i64, StoreError>;

    async fn get_actor(&self, id: i64) -> Result<Actor, StoreError>;

    /// Roles played by actor `id`.
    async fn actor_roles(&self, id: i64) -> Result<Vec<MovieRole>, StoreError>;

    async fn create_actor(&self, fields: ActorFields) -> Result<Actor, StoreError>;

    async fn update_actor(&self, id: i64, patch: ActorPatch) -> Result<Actor, StoreError>;

    /// Delete an actor together with its role rows.
    async fn delete_actor(&self, id: i64) -> Result<(), StoreError>;
}
