//! Closed role enumeration gating page access.
//!
//! Roles travel as upper-case tags (`ADMIN`, `DUENIO`, `COORDINADOR`,
//! `CLIENTE`) both on the wire and in the persisted `user` record. Parsing is
//! strict: any other tag is rejected rather than mapped to a fallback role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Permission tier assigned to an identity by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator managing owners.
    Admin,
    /// Business owner ("dueño") managing vehicles, drivers and coordinators.
    Duenio,
    /// Dispatcher working on behalf of an owner.
    Coordinador,
    /// End customer requesting trips.
    Cliente,
}

/// Error returned when a role tag is outside the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role tag: {tag}")]
pub struct UnknownRole {
    /// The rejected tag, as received.
    pub tag: String,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Duenio, Self::Coordinador, Self::Cliente];

    /// Wire tag for this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Duenio => "DUENIO",
            Self::Coordinador => "COORDINADOR",
            Self::Cliente => "CLIENTE",
        }
    }

    /// Route a freshly logged-in identity is sent to.
    ///
    /// Customers have no screens in the administration client, so they land
    /// back on the login entry point.
    pub const fn home_route(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Duenio => "/duenio",
            Self::Coordinador => "/coordinador",
            Self::Cliente => crate::domain::LOGIN_ROUTE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == tag)
            .ok_or_else(|| UnknownRole {
                tag: tag.to_owned(),
            })
    }
}
