//! SQLite-backed [`CastingStore`].

use crate::{CastingStore, StoreError};
use async_trait::async_trait;
use casting_core::{
    Actor, ActorFields, ActorPatch, DatabaseConfig, Movie, MovieFields, MoviePatch, MovieRole,
    Page, RoleAssignment,
};
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::fs;
use std::str::FromStr;

#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    release_date: Option<NaiveDate>,
    image_url: Option<String>,
    description: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: row.id,
            title: row.title,
            release_date: row.release_date,
            image_url: row.image_url,
            description: row.description,
        }
    }
}

#[derive(Debug, FromRow)]
struct ActorRow {
    id: i64,
    name: String,
    age: i64,
    gender: String,
    image_url: Option<String>,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Actor {
            id: row.id,
            name: row.name,
            age: row.age,
            gender: row.gender,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    movie_id: i64,
    actor_id: i64,
    role: Option<String>,
}

impl From<RoleRow> for MovieRole {
    fn from(row: RoleRow) -> Self {
        MovieRole {
            id: row.id,
            movie_id: row.movie_id,
            actor_id: row.actor_id,
            role: row.role,
        }
    }
}

const MOVIE_COLUMNS: &str = "id, title, release_date, image_url, description";
const ACTOR_COLUMNS: &str = "id, name, age, gender, image_url";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `config.url` and run
    /// migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::info!(url = %config.url, "connected to database");
        Self::from_pool(pool).await
    }

    /// A private in-memory database, mostly for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // One connection that never idles out, so the database lives as long as the pool.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl CastingStore for SqliteStore {
    async fn list_movies(&self, page: Page) -> Result<Vec<Movie>, StoreError> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn count_movies(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_movie(&self, id: i64) -> Result<Movie, StoreError> {
        sqlx::query_as::<_, MovieRow>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::from)
            .ok_or(StoreError::movie_not_found(id))
    }

    async fn movie_roles(&self, id: i64) -> Result<Vec<MovieRole>, StoreError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, movie_id, actor_id, role FROM movie_roles WHERE movie_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MovieRole::from).collect())
    }

    async fn create_movie(
        &self,
        fields: MovieFields,
        roles: Vec<RoleAssignment>,
    ) -> Result<Movie, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO movies (title, release_date, image_url, description) VALUES (?, ?, ?, ?)",
        )
        .bind(&fields.title)
        .bind(fields.release_date)
        .bind(&fields.image_url)
        .bind(&fields.description)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for assignment in &roles {
            sqlx::query("INSERT INTO movie_roles (movie_id, actor_id, role) VALUES (?, ?, ?)")
                .bind(id)
                .bind(assignment.actor_id)
                .bind(&assignment.role)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(movie_id = id, roles = roles.len(), "created movie");

        Ok(Movie {
            id,
            title: fields.title,
            release_date: fields.release_date,
            image_url: fields.image_url,
            description: fields.description,
        })
    }

    async fn update_movie(&self, id: i64, patch: MoviePatch) -> Result<Movie, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut movie: Movie =
            sqlx::query_as::<_, MovieRow>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .map(Movie::from)
                .ok_or(StoreError::movie_not_found(id))?;

        patch.apply(&mut movie)?;

        sqlx::query(
            "UPDATE movies SET title = ?, release_date = ?, image_url = ?, description = ? WHERE id = ?",
        )
        .bind(&movie.title)
        .bind(movie.release_date)
        .bind(&movie.image_url)
        .bind(&movie.description)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(movie)
    }

    async fn delete_movie(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let roles = sqlx::query("DELETE FROM movie_roles WHERE movie_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::movie_not_found(id));
        }

        tx.commit().await?;
        tracing::debug!(movie_id = id, roles, "deleted movie");
        Ok(())
    }

    async fn list_actors(&self, page: Page) -> Result<Vec<Actor>, StoreError> {
        let rows = sqlx::query_as::<_, ActorRow>(&format!(
            "SELECT {ACTOR_COLUMNS} FROM actors ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn count_actors(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM actors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_actor(&self, id: i64) -> Result<Actor, StoreError> {
        sqlx::query_as::<_, ActorRow>(&format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Actor::from)
            .ok_or(StoreError::actor_not_found(id))
    }

    async fn actor_roles(&self, id: i64) -> Result<Vec<MovieRole>, StoreError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT id, movie_id, actor_id, role FROM movie_roles WHERE actor_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MovieRole::from).collect())
    }

    async fn create_actor(&self, fields: ActorFields) -> Result<Actor, StoreError> {
        let id = sqlx::query("INSERT INTO actors (name, age, gender, image_url) VALUES (?, ?, ?, ?)")
            .bind(&fields.name)
            .bind(fields.age)
            .bind(&fields.gender)
            .bind(&fields.image_url)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        tracing::debug!(actor_id = id, "created actor");
        Ok(Actor {
            id,
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            image_url: fields.image_url,
        })
    }

    async fn update_actor(&self, id: i64, patch: ActorPatch) -> Result<Actor, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut actor: Actor =
            sqlx::query_as::<_, ActorRow>(&format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .map(Actor::from)
                .ok_or(StoreError::actor_not_found(id))?;

        patch.apply(&mut actor)?;

        sqlx::query("UPDATE actors SET name = ?, age = ?, gender = ?, image_url = ? WHERE id = ?")
            .bind(&actor.name)
            .bind(actor.age)
            .bind(&actor.gender)
            .bind(&actor.image_url)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(actor)
    }

    async fn delete_actor(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let roles = sqlx::query("DELETE FROM movie_roles WHERE actor_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM actors WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(StoreError::actor_not_found(id));
        }

        tx.commit().await?;
        tracing::debug!(actor_id = id, roles, "deleted actor");
        Ok(())
    }
}
