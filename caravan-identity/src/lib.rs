//! Identity contract for the roster: users, roles and the mock directory
//! the demo deployment runs on. A controller is always scoped to exactly
//! one bus; the role carries the bus so an unscoped controller cannot be
//! represented.

mod directory;

use caravan_roster::{Actor, BusId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use directory::{AuthError, Directory, DirectoryError, NewController};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Controller { bus: BusId },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// The bus a controller is scoped to; `None` for admins.
    pub const fn bus_id(&self) -> Option<BusId> {
        match self.role {
            Role::Admin => None,
            Role::Controller { bus } => Some(bus),
        }
    }

    /// The acting identity the roster service attributes and scopes
    /// mutations by.
    pub fn actor(&self) -> Actor {
        match self.role {
            Role::Admin => Actor::admin(self.name.clone()),
            Role::Controller { bus } => Actor::controller(self.name.clone(), bus),
        }
    }
}
