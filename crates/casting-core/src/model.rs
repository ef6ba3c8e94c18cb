//! Movies, actors and role assignments.
//!
//! Stored entities (`Movie`, `Actor`, `MovieRole`) serialize to the JSON
//! returned by the API. Incoming payloads (`NewMovie`, `MoviePatch`, ...)
//! keep every field optional so that a missing value is reported as a
//! [`ValidationError`] naming the field instead of a generic parse failure.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Oldest age accepted for an actor.
pub const MAX_ACTOR_AGE: i64 = 150;

const RELEASE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub image_url: Option<String>,
}

/// An actor cast in a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRole {
    pub id: i64,
    pub movie_id: i64,
    pub actor_id: i64,
    pub role: Option<String>,
}

/// A casting entry submitted together with a new movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub actor_id: i64,
    #[serde(default)]
    pub role: Option<String>,
}

/// Validated column values for a movie row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFields {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// Validated column values for an actor row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorFields {
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub image_url: Option<String>,
}

/// Body of `POST /movies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleAssignment>,
}

impl NewMovie {
    pub fn validate(self) -> Result<(MovieFields, Vec<RoleAssignment>), ValidationError> {
        let title = required_text("title", self.title)?;
        let release_date = self
            .release_date
            .as_deref()
            .map(parse_release_date)
            .transpose()?;
        for assignment in &self.roles {
            if assignment.actor_id <= 0 {
                return Err(ValidationError::invalid(
                    "roles",
                    format!("actor_id {} is not a valid id", assignment.actor_id),
                ));
            }
        }
        Ok((
            MovieFields {
                title,
                release_date,
                image_url: self.image_url,
                description: self.description,
            },
            self.roles,
        ))
    }
}

/// Body of `PATCH /movies/{id}`.
///
/// Absent fields are left untouched; an explicit `null` clears an optional
/// column and is rejected for `title`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub release_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

impl MoviePatch {
    pub fn apply(self, movie: &mut Movie) -> Result<(), ValidationError> {
        if let Some(title) = self.title {
            movie.title = required_text("title", title)?;
        }
        if let Some(release_date) = self.release_date {
            movie.release_date = release_date.as_deref().map(parse_release_date).transpose()?;
        }
        if let Some(image_url) = self.image_url {
            movie.image_url = image_url;
        }
        if let Some(description) = self.description {
            movie.description = description;
        }
        Ok(())
    }
}

/// Body of `POST /actors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewActor {
    pub fn validate(self) -> Result<ActorFields, ValidationError> {
        let name = required_text("name", self.name)?;
        let age = self.age.ok_or(ValidationError::MissingField { field: "age" })?;
        check_age(age)?;
        let gender = required_text("gender", self.gender)?;
        Ok(ActorFields {
            name,
            age,
            gender,
            image_url: self.image_url,
        })
    }
}

/// Body of `PATCH /actors/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorPatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
}

impl ActorPatch {
    pub fn apply(self, actor: &mut Actor) -> Result<(), ValidationError> {
        if let Some(name) = self.name {
            actor.name = required_text("name", name)?;
        }
        if let Some(age) = self.age {
            let age = age.ok_or(ValidationError::MissingField { field: "age" })?;
            check_age(age)?;
            actor.age = age;
        }
        if let Some(gender) = self.gender {
            actor.gender = required_text("gender", gender)?;
        }
        if let Some(image_url) = self.image_url {
            actor.image_url = image_url;
        }
        Ok(())
    }
}

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Result<Self, ValidationError> {
        if number == 0 {
            return Err(ValidationError::invalid("page", "pages start at 1"));
        }
        if size == 0 {
            return Err(ValidationError::invalid("page", "page size must be positive"));
        }
        Ok(Self { number, size })
    }

    pub fn first(size: u32) -> Self {
        Self {
            number: 1,
            size: size.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

/// Parse a release date given as `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_release_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    RELEASE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            ValidationError::invalid("release_date", format!("'{raw}' is not a YYYY-MM-DD date"))
        })
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField { field })?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}

fn check_age(age: i64) -> Result<(), ValidationError> {
    if !(0..=MAX_ACTOR_AGE).contains(&age) {
        return Err(ValidationError::invalid(
            "age",
            format!("{age} is outside 0..={MAX_ACTOR_AGE}"),
        ));
    }
    Ok(())
}

/// Marks a field as present (even when `null`) so patches can tell
/// "absent" from "clear".
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
