use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque participant identifier, assigned at ingestion time and never
/// reused within a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a bus in the configured fleet. Small positive integer,
/// fixed for the lifetime of a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BusId(pub u32);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The assignment triple. Bus, timestamp and attribution always transition
/// together; a participant is either fully assigned or not at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Assignment {
    Unassigned,
    Assigned {
        bus: BusId,
        at: DateTime<Utc>,
        by: String,
    },
}

impl Assignment {
    pub const fn bus_id(&self) -> Option<BusId> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { bus, .. } => Some(*bus),
        }
    }

    pub const fn assigned_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { at, .. } => Some(*at),
        }
    }

    pub fn assigned_by(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Assigned { by, .. } => Some(by),
        }
    }

    pub fn is_assigned_to(&self, bus_id: BusId) -> bool {
        self.bus_id() == Some(bus_id)
    }
}

/// A ticket holder eligible for assignment to a bus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub first_name: String,
    pub last_name: String,
    /// External ticket reference. Not guaranteed unique; used as a search
    /// key and as the identity for sync-report diffing.
    pub ticket_id: String,
    pub assignment: Assignment,
}

impl Participant {
    pub fn unassigned(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        ticket_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ParticipantId::new(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ticket_id: ticket_id.into(),
            assignment: Assignment::Unassigned,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A fixed-capacity destination roster. Buses carry no participant list of
/// their own; per-bus rosters are always derived from the participant
/// collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub capacity: u32,
}

/// One row of the capacity overview. `used` is recomputed on every query
/// and may exceed `capacity`: capacity is informational, not enforced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BusOccupancy {
    pub id: BusId,
    pub name: String,
    pub used: usize,
    pub capacity: u32,
}

impl BusOccupancy {
    pub fn is_full(&self) -> bool {
        self.used >= self.capacity as usize
    }
}
