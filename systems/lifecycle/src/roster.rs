use std::time::Duration;

use hostile_presence_core::{Command, Event, PresenceId};
use hostile_presence_zone::{apply, Zone};
use tracing::{error, warn};

use crate::presence::Presence;

/// Drives every presence of a zone and applies their commands.
#[derive(Default)]
pub struct PresenceRoster {
    presences: Vec<Presence>,
}

impl PresenceRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `presence` in the zone and starts driving it.
    pub fn insert(&mut self, zone: &mut Zone, presence: Presence, out_events: &mut Vec<Event>) {
        apply(
            zone,
            Command::RegisterPresence {
                presence: presence.id(),
                kind: presence.configuration().kind,
            },
            out_events,
        );
        self.presences.push(presence);
    }

    /// Updates each presence in insertion order, applying its commands before
    /// the next presence runs.
    ///
    /// A presence failing with a configuration error has its members pulled
    /// from the zone and is dropped from the roster.
    pub fn tick(&mut self, zone: &mut Zone, elapsed: Duration, out_events: &mut Vec<Event>) {
        let mut failed = Vec::new();
        for presence in &mut self.presences {
            let mut commands = Vec::new();
            if let Err(error) = presence.update(elapsed, zone, &mut commands) {
                error!(presence = %presence.id(), %error, "presence removed after configuration error");
                presence.teardown(&mut commands);
                failed.push(presence.id());
            }
            apply_commands(zone, commands, out_events);
        }
        if !failed.is_empty() {
            self.presences.retain(|presence| !failed.contains(&presence.id()));
        }
    }

    /// Tears a presence down and stops driving it.
    pub fn remove(
        &mut self,
        zone: &mut Zone,
        presence: PresenceId,
        out_events: &mut Vec<Event>,
    ) -> Option<Presence> {
        let index = self
            .presences
            .iter()
            .position(|candidate| candidate.id() == presence)?;
        let mut removed = self.presences.remove(index);
        let mut commands = Vec::new();
        removed.teardown(&mut commands);
        apply_commands(zone, commands, out_events);
        Some(removed)
    }

    /// Flags every presence as exiting.
    pub fn begin_exit(&mut self) {
        for presence in &mut self.presences {
            presence.begin_exit();
        }
    }

    /// Looks up a presence by identity.
    #[must_use]
    pub fn get(&self, presence: PresenceId) -> Option<&Presence> {
        self.presences
            .iter()
            .find(|candidate| candidate.id() == presence)
    }

    /// Presences in update order.
    pub fn iter(&self) -> impl Iterator<Item = &Presence> {
        self.presences.iter()
    }

    /// Number of presences being driven.
    #[must_use]
    pub fn len(&self) -> usize {
        self.presences.len()
    }

    /// Reports whether the roster drives no presences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presences.is_empty()
    }
}

fn apply_commands(zone: &mut Zone, commands: Vec<Command>, out_events: &mut Vec<Event>) {
    for command in commands {
        let first = out_events.len();
        apply(zone, command, out_events);
        for event in &out_events[first..] {
            if let Event::FlockSpawnRejected { flock, reason } = event {
                warn!(%flock, ?reason, "flock spawn rejected");
            }
        }
    }
}
