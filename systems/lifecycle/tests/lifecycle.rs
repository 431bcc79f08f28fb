use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use hostile_presence_core::{
    Area, Command, ConfigurationError, EscalationRow, Event, FlockConfiguration, FlockId,
    FlockLibrary, PlayerId, Position, PresenceConfiguration, PresenceId, PresenceKind,
    SpawnRejection,
};
use hostile_presence_system_escalation::{
    EscalationSelector, EscalationTable, StaticEscalationSource,
};
use hostile_presence_system_lifecycle::{
    LifecycleSettings, Presence, PresenceDependencies, PresenceRoster, SearchSettings, StateKind,
};
use hostile_presence_system_placement::SearchMode;
use hostile_presence_zone::{apply, query, Zone};

const PRESENCE: PresenceId = PresenceId::new(42);
const SECOND: Duration = Duration::from_secs(1);

fn library() -> Arc<FlockLibrary> {
    Arc::new(FlockLibrary::from_configurations((1..=9).map(|id| {
        FlockConfiguration {
            id: FlockId::new(id),
            name: format!("flock-{id}"),
            member_count: id,
            spawn_radius: 10.0,
        }
    })))
}

fn dependencies(rows: Vec<(u32, i64, f64)>, mode: SearchMode) -> PresenceDependencies {
    let rows = rows
        .into_iter()
        .map(|(flock_id, level, chance)| EscalationRow {
            presence_id: PRESENCE.get(),
            flock_id,
            level,
            chance,
        })
        .collect();
    let table =
        EscalationTable::initialize(&StaticEscalationSource::new(rows)).expect("valid rows");
    let flocks = library();
    PresenceDependencies {
        selector: Arc::new(EscalationSelector::new(table, flocks.clone())),
        flocks,
        settings: LifecycleSettings {
            default_lifetime_secs: 3_600,
            seed: 11,
            search: SearchSettings {
                mode,
                candidates_per_search: 200,
            },
        },
    }
}

fn growing(growth_seconds: u32) -> PresenceConfiguration {
    PresenceConfiguration {
        id: PRESENCE,
        name: "outpost".to_owned(),
        kind: PresenceKind::EscalatingRandomPresence,
        area: Area::new(0.0, 0.0, 1_000.0, 1_000.0),
        flocks: Vec::new(),
        dynamic_lifetime_secs: None,
        growth_seconds: Some(growth_seconds),
        player_min_distance: None,
        max_level: None,
    }
}

fn expiring(flocks: Vec<u32>, lifetime: u32) -> PresenceConfiguration {
    PresenceConfiguration {
        kind: PresenceKind::ExpiringRandom,
        flocks: flocks.into_iter().map(FlockId::new).collect(),
        dynamic_lifetime_secs: Some(lifetime),
        growth_seconds: None,
        ..growing(60)
    }
}

struct Harness {
    zone: Zone,
    roster: PresenceRoster,
    events: Vec<Event>,
}

impl Harness {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            roster: PresenceRoster::new(),
            events: Vec::new(),
        }
    }

    fn with_presence(presence: Presence) -> Self {
        let mut harness = Self::new(Zone::new());
        harness.insert(presence);
        harness
    }

    fn insert(&mut self, presence: Presence) {
        self.roster.insert(&mut self.zone, presence, &mut self.events);
    }

    fn tick(&mut self, dt: Duration) {
        apply(&mut self.zone, Command::Tick { dt }, &mut self.events);
        self.roster.tick(&mut self.zone, dt, &mut self.events);
    }

    fn ticks(&mut self, count: u32) {
        for _ in 0..count {
            self.tick(SECOND);
        }
    }

    fn presence(&self) -> &Presence {
        self.roster.get(PRESENCE).expect("presence still driven")
    }

    fn flock_ids(&self) -> Vec<FlockId> {
        self.presence()
            .flocks()
            .iter()
            .map(|flock| flock.configuration().id)
            .collect()
    }

    fn spawned_members(&self, flock: FlockId) -> Vec<usize> {
        let keys: Vec<_> = self
            .presence()
            .flocks()
            .iter()
            .filter(|candidate| candidate.configuration().id == flock)
            .map(|candidate| candidate.key())
            .collect();
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::FlockMembersSpawned { flock, members } if keys.contains(flock) => {
                    Some(members.len())
                }
                _ => None,
            })
            .collect()
    }

    fn place(&mut self) {
        // One tick starts the search, the next observes its result.
        self.ticks(2);
        assert!(
            self.presence().spawn_origin().is_some(),
            "inline search places on the second tick"
        );
    }
}

#[test]
fn growth_wave_spawns_exactly_once_when_interval_elapses() {
    let dependencies = dependencies(vec![(1, 0, 1.0), (7, 1, 1.0)], SearchMode::Inline);
    let presence = Presence::new(growing(60), dependencies).expect("valid presence");
    let mut harness = Harness::with_presence(presence);

    harness.place();
    assert_eq!(harness.presence().state(), Some(StateKind::Growth));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(1)]);
    assert_eq!(query::member_count(&harness.zone), 1);

    harness.ticks(59);
    assert_eq!(harness.presence().growth_level(), Some(0));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(1)]);

    harness.ticks(2);
    assert_eq!(harness.presence().growth_level(), Some(1));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(1), FlockId::new(7)]);
    assert_eq!(harness.spawned_members(FlockId::new(7)), vec![7]);
    assert_eq!(query::member_count(&harness.zone), 8);
}

#[test]
fn expiry_mid_growth_resets_to_level_zero() {
    let dependencies = dependencies(
        vec![(1, 0, 1.0), (2, 1, 1.0), (3, 2, 1.0)],
        SearchMode::Inline,
    );
    let configuration = PresenceConfiguration {
        dynamic_lifetime_secs: Some(150),
        ..growing(60)
    };
    let presence = Presence::new(configuration, dependencies).expect("valid presence");
    let mut harness = Harness::with_presence(presence);

    harness.place();
    harness.ticks(149);
    assert_eq!(harness.presence().growth_level(), Some(2));
    assert_eq!(
        harness.flock_ids(),
        vec![FlockId::new(1), FlockId::new(2), FlockId::new(3)]
    );
    assert_eq!(query::member_count(&harness.zone), 6);

    harness.tick(SECOND);
    let presence = harness.presence();
    assert_eq!(presence.cycles(), 1);
    assert_eq!(presence.state(), Some(StateKind::Spawn));
    assert_eq!(presence.growth_level(), None);
    assert_eq!(harness.flock_ids(), vec![FlockId::new(1)]);
    assert_eq!(query::member_count(&harness.zone), 0);

    harness.place();
    assert_eq!(harness.presence().growth_level(), Some(0));
    assert_eq!(query::member_count(&harness.zone), 1);
}

#[test]
fn levels_beyond_the_configured_maximum_spawn_nothing() {
    let dependencies = dependencies(vec![(2, 1, 1.0), (3, 2, 1.0)], SearchMode::Inline);
    let configuration = PresenceConfiguration {
        max_level: Some(1),
        ..growing(10)
    };
    let presence = Presence::new(configuration, dependencies).expect("valid presence");
    assert_eq!(presence.max_level(), 1);
    let mut harness = Harness::with_presence(presence);

    harness.place();
    assert!(harness.flock_ids().is_empty());

    harness.ticks(10);
    assert_eq!(harness.presence().growth_level(), Some(1));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(2)]);

    harness.ticks(10);
    assert_eq!(harness.presence().growth_level(), Some(2));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(2)]);
}

#[test]
fn table_maximum_bounds_presences_without_configured_maximum() {
    let dependencies = dependencies(vec![(1, 0, 1.0), (4, 3, 1.0)], SearchMode::Inline);
    let presence = Presence::new(growing(60), dependencies).expect("valid presence");
    assert_eq!(presence.max_level(), 3);
}

#[test]
fn rejected_wave_still_advances_the_level() {
    let dependencies = dependencies(
        vec![(1, 0, 1.0), (7, 1, 1.0), (2, 2, 1.0)],
        SearchMode::Inline,
    );
    let presence = Presence::new(growing(5), dependencies).expect("valid presence");
    let mut harness = Harness::new(Zone::new().with_member_capacity(3));
    harness.insert(presence);

    harness.place();
    harness.ticks(5);
    assert_eq!(harness.presence().growth_level(), Some(1));
    assert!(harness.events.iter().any(|event| matches!(
        event,
        Event::FlockSpawnRejected {
            reason: SpawnRejection::CapacityExceeded,
            ..
        }
    )));
    assert_eq!(query::member_count(&harness.zone), 1);

    harness.ticks(5);
    assert_eq!(harness.presence().growth_level(), Some(2));
    assert_eq!(query::member_count(&harness.zone), 3);
}

#[test]
fn unknown_wave_flock_removes_the_presence() {
    let dependencies = dependencies(vec![(1, 0, 1.0), (77, 1, 1.0)], SearchMode::Inline);
    let presence = Presence::new(growing(5), dependencies).expect("level zero resolves");
    let mut harness = Harness::with_presence(presence);

    harness.place();
    assert_eq!(query::member_count(&harness.zone), 1);

    harness.ticks(5);
    assert!(harness.roster.is_empty());
    assert_eq!(query::member_count(&harness.zone), 0);
}

#[test]
fn static_presence_respawns_after_expiry() {
    let dependencies = dependencies(Vec::new(), SearchMode::Inline);
    let presence =
        Presence::new(expiring(vec![2, 3], 30), dependencies).expect("valid presence");
    assert!(!presence.is_growing());
    let mut harness = Harness::with_presence(presence);

    harness.place();
    assert_eq!(harness.presence().state(), Some(StateKind::Placed));
    assert_eq!(query::member_count(&harness.zone), 5);
    let origin = harness.presence().spawn_origin();
    assert_eq!(query::spawn_origin(&harness.zone, PRESENCE), origin);

    harness.ticks(30);
    assert_eq!(harness.presence().cycles(), 1);
    assert_eq!(query::member_count(&harness.zone), 0);
    assert_eq!(
        query::spawn_origin(&harness.zone, PRESENCE),
        origin,
        "origin stays recorded until the next placement"
    );

    harness.place();
    assert_eq!(harness.presence().state(), Some(StateKind::Placed));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(2), FlockId::new(3)]);
    assert_eq!(query::member_count(&harness.zone), 5);
}

#[test]
fn later_presences_avoid_earlier_origins() {
    let first = PresenceConfiguration {
        area: Area::new(100.0, 100.0, 100.0, 100.0),
        ..expiring(vec![1], 3_600)
    };
    let second = PresenceConfiguration {
        id: PresenceId::new(43),
        area: Area::new(200.0, 100.0, 200.0, 100.0),
        ..expiring(vec![1], 3_600)
    };
    let mut harness = Harness::with_presence(
        Presence::new(first, dependencies(Vec::new(), SearchMode::Inline)).expect("valid"),
    );
    harness.place();
    harness.insert(
        Presence::new(second, dependencies(Vec::new(), SearchMode::Inline)).expect("valid"),
    );

    harness.ticks(10);
    let second = harness.roster.get(PresenceId::new(43)).expect("still driven");
    assert_eq!(harness.presence().state(), Some(StateKind::Placed));
    assert_eq!(second.state(), Some(StateKind::Spawn));
    assert_eq!(second.spawn_origin(), None);
}

#[test]
fn background_search_places_the_presence() {
    let dependencies = dependencies(vec![(1, 0, 1.0)], SearchMode::Background);
    let presence = Presence::new(growing(60), dependencies).expect("valid presence");
    let mut harness = Harness::with_presence(presence);

    let deadline = Instant::now() + Duration::from_secs(5);
    while harness.presence().spawn_origin().is_none() {
        assert!(Instant::now() < deadline, "background search never reported");
        harness.tick(Duration::ZERO);
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(harness.presence().state(), Some(StateKind::Growth));
    assert_eq!(query::member_count(&harness.zone), 1);
}

#[test]
fn construction_rejects_invalid_configurations() {
    let unsupported = PresenceConfiguration {
        kind: PresenceKind::Roaming,
        ..growing(60)
    };
    assert_eq!(
        Presence::new(unsupported, dependencies(Vec::new(), SearchMode::Inline)).err(),
        Some(ConfigurationError::UnsupportedPresenceKind {
            presence: PRESENCE,
            kind: PresenceKind::Roaming,
        })
    );

    let no_growth = PresenceConfiguration {
        growth_seconds: None,
        ..growing(60)
    };
    assert_eq!(
        Presence::new(no_growth, dependencies(Vec::new(), SearchMode::Inline)).err(),
        Some(ConfigurationError::MissingGrowthDuration { presence: PRESENCE })
    );

    assert_eq!(
        Presence::new(
            expiring(vec![99], 60),
            dependencies(Vec::new(), SearchMode::Inline)
        )
        .err(),
        Some(ConfigurationError::UnknownFlock {
            flock: FlockId::new(99)
        })
    );
}

#[test]
fn expiring_kind_with_growth_interval_grows() {
    let configuration = PresenceConfiguration {
        growth_seconds: Some(30),
        ..expiring(Vec::new(), 60)
    };
    let presence = Presence::new(configuration, dependencies(Vec::new(), SearchMode::Inline))
        .expect("valid presence");
    assert!(presence.is_growing());
}

#[test]
fn presence_overhanging_the_zone_places_inside_it() {
    let dependencies = dependencies(vec![(1, 0, 1.0)], SearchMode::Inline);
    let configuration = PresenceConfiguration {
        area: Area::new(1_500.0, 1_500.0, 3_500.0, 3_500.0),
        ..growing(60)
    };
    let presence = Presence::new(configuration, dependencies).expect("valid presence");
    let mut harness = Harness::with_presence(presence);

    harness.place();
    let origin = harness.presence().spawn_origin().expect("placed");
    assert!(query::area(&harness.zone).contains(origin));
    assert_eq!(query::member_count(&harness.zone), 1);
    assert!(!harness
        .events
        .iter()
        .any(|event| matches!(event, Event::FlockSpawnRejected { .. })));
}

#[test]
fn expiry_discards_an_outstanding_background_search() {
    let mut dependencies = dependencies(vec![(1, 0, 1.0)], SearchMode::Background);
    dependencies.settings.search.candidates_per_search = 1_000_000;
    let configuration = PresenceConfiguration {
        area: Area::new(500.0, 500.0, 510.0, 510.0),
        dynamic_lifetime_secs: Some(3),
        ..growing(60)
    };
    let presence = Presence::new(configuration, dependencies).expect("valid presence");
    let mut harness = Harness::new(Zone::new());
    apply(
        &mut harness.zone,
        Command::MovePlayer {
            player: PlayerId::new(1),
            position: Position::new(505.0, 505.0),
        },
        &mut harness.events,
    );
    harness.insert(presence);

    harness.ticks(3);
    assert_eq!(harness.presence().cycles(), 1);
    assert_eq!(harness.presence().state(), Some(StateKind::Spawn));
    assert_eq!(harness.presence().spawn_origin(), None);

    for _ in 0..20 {
        harness.tick(Duration::ZERO);
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(harness.presence().cycles(), 1);
    assert_eq!(harness.presence().state(), Some(StateKind::Spawn));
    assert_eq!(harness.presence().spawn_origin(), None);
    assert_eq!(query::spawn_origin(&harness.zone, PRESENCE), None);
    assert!(!harness
        .events
        .iter()
        .any(|event| matches!(event, Event::SpawnOriginRecorded { .. })));
}

#[test]
fn zero_growth_interval_escalates_every_tick() {
    let dependencies = dependencies(vec![(1, 0, 1.0)], SearchMode::Inline);
    let presence = Presence::new(growing(0), dependencies).expect("valid presence");
    let mut harness = Harness::with_presence(presence);

    harness.place();
    harness.ticks(5);
    assert_eq!(harness.presence().growth_level(), Some(5));
    assert_eq!(harness.flock_ids(), vec![FlockId::new(1)]);
}
