use hostile_presence_core::{Command, FlockConfiguration, FlockKey, Position};
use hostile_presence_zone::{query, query::FlockLiveness, Zone};

/// Flock instance bound to one presence.
#[derive(Clone, Debug, PartialEq)]
pub struct Flock {
    key: FlockKey,
    configuration: FlockConfiguration,
}

impl Flock {
    /// Binds `configuration` to the instance key allocated by its presence.
    #[must_use]
    pub fn new(key: FlockKey, configuration: FlockConfiguration) -> Self {
        Self { key, configuration }
    }

    /// Instance key shared with the zone.
    #[must_use]
    pub const fn key(&self) -> FlockKey {
        self.key
    }

    /// Configuration the flock was created from.
    #[must_use]
    pub fn configuration(&self) -> &FlockConfiguration {
        &self.configuration
    }

    /// Requests every configured member at once around `origin`.
    pub fn spawn_all_members(&self, origin: Position, out: &mut Vec<Command>) {
        out.push(Command::SpawnFlockMembers {
            flock: self.key,
            count: self.configuration.member_count,
            origin,
            spawn_radius: self.configuration.spawn_radius,
        });
    }

    /// Requests removal of the flock's members from the zone.
    pub fn remove_all_members_from_zone(&self, immediate: bool, out: &mut Vec<Command>) {
        out.push(Command::RemoveFlockMembers {
            flock: self.key,
            immediate,
        });
    }

    /// Living and dead members the zone currently tracks for this flock.
    #[must_use]
    pub fn liveness(&self, zone: &Zone) -> FlockLiveness {
        query::flock_liveness(zone, self.key)
    }
}
