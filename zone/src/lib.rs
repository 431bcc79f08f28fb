#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative zone state consulted and mutated by hostile presences.

use std::{collections::BTreeMap, f32::consts::TAU};

use hostile_presence_core::{
    Area, Command, Event, FlockKey, PlayerId, Position, PresenceId, PresenceKind, SpawnRejection,
    StaticUnitKind, StaticUnitSnapshot, UnitId,
};
use tracing::debug;

const DEFAULT_ZONE_EXTENT: f32 = 2_048.0;
const DEFAULT_MEMBER_CAPACITY: usize = 4_096;

/// Represents the authoritative state of a single zone.
#[derive(Debug)]
pub struct Zone {
    area: Area,
    is_gamma: bool,
    static_units: Vec<StaticUnitSnapshot>,
    players: BTreeMap<PlayerId, Position>,
    presences: BTreeMap<PresenceId, PresenceRecord>,
    members: Vec<Member>,
    member_capacity: usize,
    next_unit: u32,
    tick_index: u64,
}

impl Zone {
    /// Creates an empty zone covering the default extent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            area: Area::new(0.0, 0.0, DEFAULT_ZONE_EXTENT, DEFAULT_ZONE_EXTENT),
            is_gamma: false,
            static_units: Vec::new(),
            players: BTreeMap::new(),
            presences: BTreeMap::new(),
            members: Vec::new(),
            member_capacity: DEFAULT_MEMBER_CAPACITY,
            next_unit: 0,
            tick_index: 0,
        }
    }

    /// Limits how many NPC members the zone can host at once.
    #[must_use]
    pub fn with_member_capacity(mut self, capacity: usize) -> Self {
        self.member_capacity = capacity;
        self
    }

    fn spawn_members(
        &mut self,
        flock: FlockKey,
        count: u32,
        origin: Position,
        spawn_radius: f32,
    ) -> Result<Vec<UnitId>, SpawnRejection> {
        if !self.area.contains(origin) {
            return Err(SpawnRejection::OutsideZone);
        }

        let requested = usize::try_from(count).unwrap_or(usize::MAX);
        if self.members.len().saturating_add(requested) > self.member_capacity {
            return Err(SpawnRejection::CapacityExceeded);
        }

        let mut spawned = Vec::with_capacity(requested);
        for index in 0..count {
            let angle = TAU * index as f32 / count as f32;
            let offset = Position::new(
                origin.x() + spawn_radius * angle.cos(),
                origin.y() + spawn_radius * angle.sin(),
            );
            let id = UnitId::new(self.next_unit);
            self.next_unit = self.next_unit.wrapping_add(1);
            self.members.push(Member {
                id,
                flock,
                position: self.area.clamp(offset),
                alive: true,
                leaving: false,
            });
            spawned.push(id);
        }
        Ok(spawned)
    }

    fn remove_members(&mut self, flock: FlockKey, immediate: bool) -> u32 {
        let mut affected = 0_u32;
        if immediate {
            self.members.retain(|member| {
                let owned = member.flock == flock;
                if owned {
                    affected += 1;
                }
                !owned
            });
        } else {
            for member in self
                .members
                .iter_mut()
                .filter(|member| member.flock == flock && !member.leaving)
            {
                member.leaving = true;
                affected += 1;
            }
        }
        affected
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the zone, mutating state deterministically.
pub fn apply(zone: &mut Zone, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureZone { area, is_gamma } => {
            zone.area = area;
            zone.is_gamma = is_gamma;
            out_events.push(Event::ZoneConfigured { area });
        }
        Command::Tick { dt } => {
            zone.tick_index = zone.tick_index.saturating_add(1);
            zone.members.retain(|member| !member.leaving);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::PlaceStaticUnit { kind, position } => {
            zone.static_units.push(StaticUnitSnapshot { kind, position });
            out_events.push(Event::StaticUnitPlaced { kind, position });
        }
        Command::MovePlayer { player, position } => {
            let _ = zone.players.insert(player, position);
            out_events.push(Event::PlayerMoved { player, position });
        }
        Command::RemovePlayer { player } => {
            if zone.players.remove(&player).is_some() {
                out_events.push(Event::PlayerRemoved { player });
            }
        }
        Command::RegisterPresence { presence, kind } => {
            let record = zone
                .presences
                .entry(presence)
                .or_insert(PresenceRecord { kind, origin: None });
            record.kind = kind;
            out_events.push(Event::PresenceRegistered { presence });
        }
        Command::RecordSpawnOrigin { presence, origin } => {
            let Some(record) = zone.presences.get_mut(&presence) else {
                debug!(presence = presence.get(), "ignoring origin of unregistered presence");
                return;
            };
            record.origin = Some(origin);
            out_events.push(Event::SpawnOriginRecorded { presence, origin });
        }
        Command::SpawnFlockMembers {
            flock,
            count,
            origin,
            spawn_radius,
        } => match zone.spawn_members(flock, count, origin, spawn_radius) {
            Ok(members) => out_events.push(Event::FlockMembersSpawned { flock, members }),
            Err(reason) => out_events.push(Event::FlockSpawnRejected { flock, reason }),
        },
        Command::RemoveFlockMembers { flock, immediate } => {
            let count = zone.remove_members(flock, immediate);
            if count > 0 {
                out_events.push(Event::FlockMembersRemoved { flock, count });
            }
        }
        Command::KillMember { unit } => {
            if let Some(member) = zone
                .members
                .iter_mut()
                .find(|member| member.id == unit && member.alive && !member.leaving)
            {
                member.alive = false;
                out_events.push(Event::MemberKilled {
                    unit,
                    flock: member.flock,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the zone state.
pub mod query {
    use hostile_presence_core::{
        Area, FlockKey, PlacementView, Position, PresenceId, PresenceOrigin, UnitId,
    };

    use super::Zone;

    /// Provides the playable bounds of the zone.
    #[must_use]
    pub fn area(zone: &Zone) -> Area {
        zone.area
    }

    /// Reports whether the zone is a gamma zone.
    #[must_use]
    pub fn is_gamma(zone: &Zone) -> bool {
        zone.is_gamma
    }

    /// Number of ticks the zone has processed.
    #[must_use]
    pub fn tick_index(zone: &Zone) -> u64 {
        zone.tick_index
    }

    /// Captures an owned snapshot of every placement obstacle, ignoring `excluding`'s own origin.
    #[must_use]
    pub fn placement_view(zone: &Zone, excluding: PresenceId) -> PlacementView {
        let origins = zone
            .presences
            .iter()
            .filter(|(id, record)| **id != excluding && record.kind.is_roaming_capable())
            .filter_map(|(id, record)| {
                record.origin.map(|origin| PresenceOrigin {
                    presence: *id,
                    origin,
                })
            })
            .collect();
        PlacementView::new(
            zone.is_gamma,
            zone.static_units.clone(),
            origins,
            zone.players.values().copied().collect(),
        )
    }

    /// Spawn origin recorded by a presence, if any.
    #[must_use]
    pub fn spawn_origin(zone: &Zone, presence: PresenceId) -> Option<Position> {
        zone.presences
            .get(&presence)
            .and_then(|record| record.origin)
    }

    /// Counts the living and dead members of a flock that are still in the zone.
    #[must_use]
    pub fn flock_liveness(zone: &Zone, flock: FlockKey) -> FlockLiveness {
        let mut liveness = FlockLiveness::default();
        for member in zone
            .members
            .iter()
            .filter(|member| member.flock == flock && !member.leaving)
        {
            if member.alive {
                liveness.alive += 1;
            } else {
                liveness.dead += 1;
            }
        }
        liveness
    }

    /// Captures the members of one flock in identifier order.
    #[must_use]
    pub fn flock_members(zone: &Zone, flock: FlockKey) -> Vec<MemberSnapshot> {
        members(zone)
            .into_iter()
            .filter(|member| member.flock == flock)
            .collect()
    }

    /// Captures every NPC member in identifier order.
    #[must_use]
    pub fn members(zone: &Zone) -> Vec<MemberSnapshot> {
        let mut snapshots: Vec<MemberSnapshot> = zone
            .members
            .iter()
            .map(|member| MemberSnapshot {
                id: member.id,
                flock: member.flock,
                position: member.position,
                alive: member.alive,
                leaving: member.leaving,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Number of NPC members currently in the zone, including dead and leaving ones.
    #[must_use]
    pub fn member_count(zone: &Zone) -> usize {
        zone.members.len()
    }

    /// Number of player characters in the zone.
    #[must_use]
    pub fn player_count(zone: &Zone) -> usize {
        zone.players.len()
    }

    /// Living and dead member counts for one flock.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FlockLiveness {
        /// Members that are still alive.
        pub alive: u32,
        /// Members that died but have not been removed.
        pub dead: u32,
    }

    impl FlockLiveness {
        /// Reports whether the flock has members and all of them are dead.
        #[must_use]
        pub const fn is_wiped_out(&self) -> bool {
            self.alive == 0 && self.dead > 0
        }
    }

    /// Immutable representation of a single NPC member used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct MemberSnapshot {
        /// Identifier allocated by the zone.
        pub id: UnitId,
        /// Flock instance that owns the member.
        pub flock: FlockKey,
        /// Location of the member.
        pub position: Position,
        /// Whether the member is alive.
        pub alive: bool,
        /// Whether the member leaves the zone on the next tick.
        pub leaving: bool,
    }
}

#[derive(Clone, Copy, Debug)]
struct PresenceRecord {
    kind: PresenceKind,
    origin: Option<Position>,
}

#[derive(Clone, Copy, Debug)]
struct Member {
    id: UnitId,
    flock: FlockKey,
    position: Position,
    alive: bool,
    leaving: bool,
}
