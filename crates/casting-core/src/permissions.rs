//! Permission strings and role presets.
//!
//! Permissions are opaque `action:resource` strings carried in a token's
//! `permissions` claim. A request is allowed when the permission attached to
//! its route is a member of that set; there is no hierarchy or wildcard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A permission guarding one of the service's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "get:movies")]
    GetMovies,
    #[serde(rename = "post:movies")]
    PostMovies,
    #[serde(rename = "patch:movies")]
    PatchMovies,
    #[serde(rename = "delete:movies")]
    DeleteMovies,
    #[serde(rename = "get:actors")]
    GetActors,
    #[serde(rename = "post:actors")]
    PostActors,
    #[serde(rename = "patch:actors")]
    PatchActors,
    #[serde(rename = "delete:actors")]
    DeleteActors,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::GetMovies,
        Permission::PostMovies,
        Permission::PatchMovies,
        Permission::DeleteMovies,
        Permission::GetActors,
        Permission::PostActors,
        Permission::PatchActors,
        Permission::DeleteActors,
    ];

    /// The wire form found in the `permissions` claim.
    pub const fn as_str(self) -> &'static str {
        match self {
            Permission::GetMovies => "get:movies",
            Permission::PostMovies => "post:movies",
            Permission::PatchMovies => "patch:movies",
            Permission::DeleteMovies => "delete:movies",
            Permission::GetActors => "get:actors",
            Permission::PostActors => "post:actors",
            Permission::PatchActors => "patch:actors",
            Permission::DeleteActors => "delete:actors",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown permission '{s}'"))
    }
}

/// The casting agency's three roles and the grants each one carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePreset {
    /// Casting assistant: read-only access to movies and actors.
    Assistant,
    /// Casting director: manages actors and edits movies.
    Director,
    /// Executive producer: everything, including creating and deleting movies.
    Producer,
}

const ASSISTANT: &[Permission] = &[Permission::GetMovies, Permission::GetActors];

const DIRECTOR: &[Permission] = &[
    Permission::GetMovies,
    Permission::GetActors,
    Permission::PostActors,
    Permission::DeleteActors,
    Permission::PatchActors,
    Permission::PatchMovies,
];

const PRODUCER: &[Permission] = &[
    Permission::GetMovies,
    Permission::GetActors,
    Permission::PostActors,
    Permission::DeleteActors,
    Permission::PatchActors,
    Permission::PatchMovies,
    Permission::PostMovies,
    Permission::DeleteMovies,
];

impl RolePreset {
    pub const ALL: [RolePreset; 3] = [
        RolePreset::Assistant,
        RolePreset::Director,
        RolePreset::Producer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RolePreset::Assistant => "assistant",
            RolePreset::Director => "director",
            RolePreset::Producer => "producer",
        }
    }

    pub fn permissions(self) -> &'static [Permission] {
        match self {
            RolePreset::Assistant => ASSISTANT,
            RolePreset::Director => DIRECTOR,
            RolePreset::Producer => PRODUCER,
        }
    }

    /// Grants as claim strings, in table order.
    pub fn permission_strings(self) -> Vec<String> {
        self.permissions()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }

    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for RolePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RolePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "assistant" | "casting-assistant" => Ok(RolePreset::Assistant),
            "director" | "casting-director" => Ok(RolePreset::Director),
            "producer" | "executive-producer" => Ok(RolePreset::Producer),
            other => Err(format!(
                "unknown role '{other}' (expected assistant, director or producer)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_round_trips_through_str() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!("get:everything".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serde_uses_wire_form() {
        let json = serde_json::to_string(&Permission::DeleteActors).unwrap();
        assert_eq!(json, "\"delete:actors\"");
    }

    #[test]
    fn test_presets_are_nested() {
        for p in RolePreset::Assistant.permissions() {
            assert!(RolePreset::Director.grants(*p));
        }
        for p in RolePreset::Director.permissions() {
            assert!(RolePreset::Producer.grants(*p));
        }
    }

    #[test]
    fn test_only_producer_manages_movies() {
        assert!(!RolePreset::Assistant.grants(Permission::PostMovies));
        assert!(!RolePreset::Director.grants(Permission::PostMovies));
        assert!(!RolePreset::Director.grants(Permission::DeleteMovies));
        assert!(RolePreset::Producer.grants(Permission::PostMovies));
        assert!(RolePreset::Producer.grants(Permission::DeleteMovies));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Director".parse::<RolePreset>().unwrap(), RolePreset::Director);
        assert_eq!(
            "executive-producer".parse::<RolePreset>().unwrap(),
            RolePreset::Producer
        );
        assert!("admin".parse::<RolePreset>().is_err());
    }
}
