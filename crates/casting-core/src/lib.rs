//! # casting-core
//!
//! Shared types for the casting agency service.
//!
//! - [`model`]: movies, actors and the role assignments between them, plus
//!   the request payloads used to create and patch them.
//! - [`permissions`]: the permission strings guarding each route and the
//!   assistant / director / producer presets.
//! - [`config`]: the TOML configuration shared by the server and the CLI.

pub mod config;
pub mod error;
pub mod model;
pub mod permissions;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, PaginationConfig, ServerConfig};
pub use error::ValidationError;
pub use model::{
    Actor, ActorFields, ActorPatch, Movie, MovieFields, MoviePatch, MovieRole, NewActor,
    NewMovie, Page, RoleAssignment,
};
pub use permissions::{Permission, RolePreset};
