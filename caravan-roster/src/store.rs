use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::RosterError;
use crate::model::{Assignment, Bus, BusId, BusOccupancy, Participant, ParticipantId};

/// In-memory roster over a fixed bus fleet. Single logical writer; the
/// async façade in [`service`](crate::service) serializes mutation.
///
/// Participant order is ingestion order. Per-bus rosters and occupancy are
/// always derived from the participant collection, never kept as a second
/// copy that could drift.
pub struct RosterStore {
    buses: Vec<Bus>,
    participants: Vec<Participant>,
    by_id: HashMap<ParticipantId, usize>,
}

impl RosterStore {
    pub fn new(buses: Vec<Bus>) -> Self {
        Self {
            buses,
            participants: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Full replacement of the participant collection. Participants absent
    /// from `snapshot` disappear entirely, assignments included; a refresh
    /// is lossy by design and reported as such by the service layer.
    pub fn replace_all(&mut self, snapshot: Vec<Participant>) {
        self.by_id = snapshot
            .iter()
            .enumerate()
            .map(|(index, participant)| (participant.id.clone(), index))
            .collect();
        self.participants = snapshot;
    }

    /// Assigns a participant to a bus, setting the whole assignment triple
    /// with the current time. A participant already assigned elsewhere is
    /// moved in the same operation; no separate unassign step exists.
    ///
    /// Capacity is informational only: assigning into a bus at or over
    /// capacity succeeds and is logged, not rejected.
    pub fn assign(
        &mut self,
        id: &ParticipantId,
        bus_id: BusId,
        actor: &str,
    ) -> Result<Participant, RosterError> {
        let Some(bus) = self.bus(bus_id) else {
            return Err(RosterError::BusNotFound(bus_id));
        };
        let capacity = bus.capacity;
        let index = *self
            .by_id
            .get(id)
            .ok_or_else(|| RosterError::ParticipantNotFound(id.clone()))?;

        // Only calls that will actually mutate get the capacity warning.
        let used = self.count_on(bus_id);
        if used >= capacity as usize {
            warn!(%bus_id, used, capacity, "assigning into a bus at or over capacity");
        }

        let participant = &mut self.participants[index];
        participant.assignment = Assignment::Assigned {
            bus: bus_id,
            at: Utc::now(),
            by: actor.to_owned(),
        };
        debug!(participant = %id, %bus_id, actor, "participant assigned");
        Ok(participant.clone())
    }

    /// Clears the assignment triple. Removing a participant from a bus it
    /// is not currently on is a silent no-op returning the participant
    /// unchanged; only an unknown participant id is an error.
    pub fn remove(
        &mut self,
        id: &ParticipantId,
        bus_id: BusId,
    ) -> Result<Participant, RosterError> {
        let index = *self
            .by_id
            .get(id)
            .ok_or_else(|| RosterError::ParticipantNotFound(id.clone()))?;
        let participant = &mut self.participants[index];
        if participant.assignment.is_assigned_to(bus_id) {
            participant.assignment = Assignment::Unassigned;
            debug!(participant = %id, %bus_id, "participant removed from bus");
        }
        Ok(participant.clone())
    }

    /// Case-insensitive substring search over first name, last name,
    /// ticket id and the `"first last"` concatenation. An empty or
    /// whitespace-only query returns nothing: search is opt-in, never
    /// "return everything". Results follow collection order, unranked.
    pub fn search(&self, query: &str) -> Vec<Participant> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.participants
            .iter()
            .filter(|participant| {
                let first = participant.first_name.to_lowercase();
                let last = participant.last_name.to_lowercase();
                first.contains(&needle)
                    || last.contains(&needle)
                    || participant.ticket_id.to_lowercase().contains(&needle)
                    || format!("{first} {last}").contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// All participants currently assigned to `bus_id`, in collection
    /// order. An unknown bus id yields an empty list, not an error.
    pub fn participants_on(&self, bus_id: BusId) -> Vec<Participant> {
        self.participants
            .iter()
            .filter(|participant| participant.assignment.is_assigned_to(bus_id))
            .cloned()
            .collect()
    }

    /// Occupancy per bus in configured fleet order, recomputed from the
    /// current participant state on every call.
    pub fn occupancy(&self) -> Vec<BusOccupancy> {
        self.buses
            .iter()
            .map(|bus| BusOccupancy {
                id: bus.id,
                name: bus.name.clone(),
                used: self.count_on(bus.id),
                capacity: bus.capacity,
            })
            .collect()
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.by_id
            .get(id)
            .map(|&index| &self.participants[index])
    }

    pub fn bus(&self, bus_id: BusId) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.id == bus_id)
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    fn count_on(&self, bus_id: BusId) -> usize {
        self.participants
            .iter()
            .filter(|participant| participant.assignment.is_assigned_to(bus_id))
            .count()
    }
}
