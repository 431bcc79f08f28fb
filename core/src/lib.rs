#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the hostile presence engine.
//!
//! This crate defines the message surface that connects presences, the
//! authoritative zone, and the pure systems that decide where and when flocks
//! appear. Presences submit [`Command`] values describing desired zone
//! mutations, the zone executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values describing what actually happened.
//! Configuration records, the injectable [`RandomSource`], and the
//! [`FlockConfigurationRepository`] collaborator also live here so every
//! system agrees on a single vocabulary.

use std::{collections::HashMap, fmt, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Exclusion radius kept around docking structures and other presences' spawn origins.
pub const BASE_RADIUS: f32 = 300.0;

/// Exclusion radius kept around players and teleports.
pub const PLAYER_RADIUS: f32 = 150.0;

/// Commands that express all permissible zone mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the zone bounds and gamma flag.
    ConfigureZone {
        /// Playable bounds of the zone.
        area: Area,
        /// Whether the zone is a gamma zone hosting player-built docking structures.
        is_gamma: bool,
    },
    /// Advances the zone clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places a static unit that never moves for the lifetime of the zone.
    PlaceStaticUnit {
        /// Category of the static unit.
        kind: StaticUnitKind,
        /// Location of the unit.
        position: Position,
    },
    /// Moves a player character, inserting it if the zone has not seen it yet.
    MovePlayer {
        /// Identifier of the player character.
        player: PlayerId,
        /// New location of the player.
        position: Position,
    },
    /// Removes a player character from the zone.
    RemovePlayer {
        /// Identifier of the player character.
        player: PlayerId,
    },
    /// Announces a presence to the zone's presence registry.
    RegisterPresence {
        /// Identifier of the presence.
        presence: PresenceId,
        /// Kind of presence, which decides whether its origin excludes others.
        kind: PresenceKind,
    },
    /// Records the location a presence settled on after its spawn-site search.
    RecordSpawnOrigin {
        /// Identifier of the presence.
        presence: PresenceId,
        /// Accepted spawn coordinate.
        origin: Position,
    },
    /// Requests that every member of a flock be spawned around an origin.
    SpawnFlockMembers {
        /// Flock instance that will own the members.
        flock: FlockKey,
        /// Number of members to create.
        count: u32,
        /// Centre of the spawn ring.
        origin: Position,
        /// Radius of the spawn ring measured in world units.
        spawn_radius: f32,
    },
    /// Requests removal of every member belonging to a flock.
    RemoveFlockMembers {
        /// Flock instance whose members leave the zone.
        flock: FlockKey,
        /// Removes members at once when set, otherwise on the next tick.
        immediate: bool,
    },
    /// Marks a single NPC member as dead.
    KillMember {
        /// Identifier of the member.
        unit: UnitId,
    },
}

/// Events broadcast by the zone after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the zone clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the zone bounds changed.
    ZoneConfigured {
        /// New playable bounds.
        area: Area,
    },
    /// Confirms that a static unit was placed.
    StaticUnitPlaced {
        /// Category of the placed unit.
        kind: StaticUnitKind,
        /// Location of the placed unit.
        position: Position,
    },
    /// Confirms that a player moved or entered the zone.
    PlayerMoved {
        /// Identifier of the player character.
        player: PlayerId,
        /// Location after the move.
        position: Position,
    },
    /// Confirms that a player left the zone.
    PlayerRemoved {
        /// Identifier of the player character.
        player: PlayerId,
    },
    /// Confirms that a presence joined the registry.
    PresenceRegistered {
        /// Identifier of the presence.
        presence: PresenceId,
    },
    /// Confirms that a presence's spawn origin was recorded.
    SpawnOriginRecorded {
        /// Identifier of the presence.
        presence: PresenceId,
        /// Recorded origin.
        origin: Position,
    },
    /// Confirms that a flock's members entered the zone.
    FlockMembersSpawned {
        /// Flock instance owning the members.
        flock: FlockKey,
        /// Identifiers allocated to the new members.
        members: Vec<UnitId>,
    },
    /// Reports that a flock spawn request could not be honoured.
    FlockSpawnRejected {
        /// Flock instance that failed to spawn.
        flock: FlockKey,
        /// Specific reason the spawn failed.
        reason: SpawnRejection,
    },
    /// Confirms that a flock's members left the zone or were scheduled to leave.
    FlockMembersRemoved {
        /// Flock instance whose members were removed.
        flock: FlockKey,
        /// Number of members affected.
        count: u32,
    },
    /// Confirms that a member died.
    MemberKilled {
        /// Identifier of the member.
        unit: UnitId,
        /// Flock instance the member belonged to.
        flock: FlockKey,
    },
}

/// Reasons a flock spawn request may be rejected by the zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnRejection {
    /// The requested origin lies outside the zone bounds.
    OutsideZone,
    /// The zone cannot host any more NPC members.
    CapacityExceeded,
}

/// Categories of static units relevant to spawn-site exclusion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticUnitKind {
    /// Permanent docking base.
    DockingBase,
    /// Player-built docking base found in gamma zones.
    PbsDockingBase,
    /// Teleport column.
    Teleport,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a presence configuration.
    PresenceId
);
numeric_id!(
    /// Identifier of a flock configuration.
    FlockId
);
numeric_id!(
    /// Identifier of a single NPC member inside the zone.
    UnitId
);
numeric_id!(
    /// Identifier of a player character.
    PlayerId
);

/// Identifies one flock instance created by a presence.
///
/// A presence may instantiate the same [`FlockId`] many times across growth
/// waves and reset cycles; the serial keeps every instance distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlockKey {
    presence: PresenceId,
    serial: u32,
}

impl FlockKey {
    /// Creates a flock key owned by the provided presence.
    #[must_use]
    pub const fn new(presence: PresenceId, serial: u32) -> Self {
        Self { presence, serial }
    }

    /// Presence that owns the flock instance.
    #[must_use]
    pub const fn presence(&self) -> PresenceId {
        self.presence
    }

    /// Serial allocated by the owning presence.
    #[must_use]
    pub const fn serial(&self) -> u32 {
        self.serial
    }
}

impl fmt::Display for FlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.presence, self.serial)
    }
}

/// Planar zone coordinate measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to `other` ignoring altitude.
    #[must_use]
    pub fn distance_2d(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Reports whether `other` lies within `range` of this coordinate, inclusive.
    #[must_use]
    pub fn is_in_range_of_2d(self, other: Position, range: f32) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy <= range * range
    }
}

/// Axis-aligned rectangle of the zone, inclusive on every edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "AreaBounds", into = "AreaBounds")]
pub struct Area {
    min: Position,
    max: Position,
}

impl Area {
    /// Creates an area from two opposite corners given in any order.
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Position::new(x1.min(x2), y1.min(y2)),
            max: Position::new(x1.max(x2), y1.max(y2)),
        }
    }

    /// Corner with the smallest coordinates.
    #[must_use]
    pub const fn min(&self) -> Position {
        self.min
    }

    /// Corner with the largest coordinates.
    #[must_use]
    pub const fn max(&self) -> Position {
        self.max
    }

    /// Horizontal extent of the area.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent of the area.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Reports whether the coordinate lies inside the area.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.y >= self.min.y
            && position.y <= self.max.y
    }

    /// Moves the coordinate onto the nearest point inside the area.
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.clamp(self.min.x, self.max.x),
            position.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Region covered by both areas, if they overlap.
    #[must_use]
    pub fn intersection(&self, other: &Area) -> Option<Area> {
        let min = Position::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Position::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        (min.x <= max.x && min.y <= max.y).then_some(Area { min, max })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct AreaBounds {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl From<AreaBounds> for Area {
    fn from(bounds: AreaBounds) -> Self {
        Self::new(bounds.x1, bounds.y1, bounds.x2, bounds.y2)
    }
}

impl From<Area> for AreaBounds {
    fn from(area: Area) -> Self {
        Self {
            x1: area.min.x,
            y1: area.min.y,
            x2: area.max.x,
            y2: area.max.y,
        }
    }
}

/// Presence categories known to the zone, encoded by their numeric table code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PresenceKind {
    /// Fixed presence with static flocks.
    Normal,
    /// Presence that roams along a path.
    Roaming,
    /// Presence created on demand.
    Dynamic,
    /// Presence placed at a random location.
    Random,
    /// Dynamic presence drawn from a pool.
    DynamicPool,
    /// Roaming presence without a fixed path.
    FreeRoaming,
    /// Presence bound to a direct spawn request.
    Direct,
    /// Presence that moves between zones.
    Interzone,
    /// Roaming presence that moves between zones.
    InterzoneRoaming,
    /// Dynamic presence with extended behaviour.
    DynamicExtended,
    /// Randomly placed presence that expires and respawns elsewhere.
    ExpiringRandom,
    /// Randomly placed presence that escalates in waves before expiring.
    EscalatingRandomPresence,
}

impl PresenceKind {
    /// Numeric code used by persisted presence tables.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Roaming => 1,
            Self::Dynamic => 2,
            Self::Random => 3,
            Self::DynamicPool => 4,
            Self::FreeRoaming => 5,
            Self::Direct => 6,
            Self::Interzone => 7,
            Self::InterzoneRoaming => 8,
            Self::DynamicExtended => 9,
            Self::ExpiringRandom => 10,
            Self::EscalatingRandomPresence => 11,
        }
    }

    /// Resolves a persisted numeric code.
    pub fn from_code(code: u8) -> Result<Self, ConfigurationError> {
        Ok(match code {
            0 => Self::Normal,
            1 => Self::Roaming,
            2 => Self::Dynamic,
            3 => Self::Random,
            4 => Self::DynamicPool,
            5 => Self::FreeRoaming,
            6 => Self::Direct,
            7 => Self::Interzone,
            8 => Self::InterzoneRoaming,
            9 => Self::DynamicExtended,
            10 => Self::ExpiringRandom,
            11 => Self::EscalatingRandomPresence,
            _ => return Err(ConfigurationError::UnknownPresenceKind { code }),
        })
    }

    /// Reports whether presences of this kind keep others away from their spawn origin.
    #[must_use]
    pub const fn is_roaming_capable(self) -> bool {
        matches!(
            self,
            Self::Roaming
                | Self::FreeRoaming
                | Self::InterzoneRoaming
                | Self::ExpiringRandom
                | Self::EscalatingRandomPresence
        )
    }
}

impl TryFrom<u8> for PresenceKind {
    type Error = ConfigurationError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<PresenceKind> for u8 {
    fn from(kind: PresenceKind) -> Self {
        kind.code()
    }
}

/// Immutable configuration of a single presence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfiguration {
    /// Identity used to look up escalation records.
    pub id: PresenceId,
    /// Human readable label used in logs.
    #[serde(default)]
    pub name: String,
    /// Presence category.
    pub kind: PresenceKind,
    /// Region inside which spawn sites are sampled.
    pub area: Area,
    /// Flocks owned by a static presence. Growing presences load theirs from escalation data.
    #[serde(default)]
    pub flocks: Vec<FlockId>,
    /// Lifetime override in seconds.
    #[serde(default)]
    pub dynamic_lifetime_secs: Option<u32>,
    /// Interval between growth waves in seconds; presence escalates when set.
    #[serde(default)]
    pub growth_seconds: Option<u32>,
    /// Narrower player exclusion distance.
    #[serde(default)]
    pub player_min_distance: Option<f32>,
    /// Highest escalation level this presence may reach.
    #[serde(default)]
    pub max_level: Option<u32>,
}

impl PresenceConfiguration {
    /// Configured lifetime override.
    #[must_use]
    pub fn dynamic_lifetime(&self) -> Option<Duration> {
        self.dynamic_lifetime_secs
            .map(|seconds| Duration::from_secs(u64::from(seconds)))
    }

    /// Configured interval between growth waves.
    #[must_use]
    pub fn growth_duration(&self) -> Option<Duration> {
        self.growth_seconds
            .map(|seconds| Duration::from_secs(u64::from(seconds)))
    }

    /// A presence with a growth interval is always escalation-capable.
    #[must_use]
    pub fn is_escalating(&self) -> bool {
        self.growth_seconds.is_some()
    }
}

/// Spawnable flock description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlockConfiguration {
    /// Identity referenced by presences and escalation records.
    pub id: FlockId,
    /// Human readable label used in logs.
    #[serde(default)]
    pub name: String,
    /// Number of NPC members created by a full spawn.
    pub member_count: u32,
    /// Radius of the ring members are spawned on.
    #[serde(default = "default_spawn_radius")]
    pub spawn_radius: f32,
}

const fn default_spawn_radius() -> f32 {
    10.0
}

/// One escalation entry: `flock` may join a presence at `level` with probability `chance`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    flock: FlockId,
    level: u32,
    chance: f64,
}

impl EscalationRecord {
    /// Creates a validated escalation record.
    pub fn new(
        presence: PresenceId,
        flock: FlockId,
        level: u32,
        chance: f64,
    ) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigurationError::ChanceOutOfRange {
                presence,
                flock,
                chance,
            });
        }
        Ok(Self {
            flock,
            level,
            chance,
        })
    }

    /// Flock that may be spawned.
    #[must_use]
    pub const fn flock(&self) -> FlockId {
        self.flock
    }

    /// Escalation level the record belongs to.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Inclusion probability in `[0, 1]`.
    #[must_use]
    pub const fn chance(&self) -> f64 {
        self.chance
    }
}

/// Raw escalation row as stored in the durable record set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EscalationRow {
    /// Presence the row belongs to.
    pub presence_id: u32,
    /// Flock the row may spawn.
    pub flock_id: u32,
    /// Escalation level; negative values are rejected.
    pub level: i64,
    /// Inclusion probability; values outside `[0, 1]` are rejected.
    pub chance: f64,
}

impl EscalationRow {
    /// Validates the row and converts it into a keyed [`EscalationRecord`].
    pub fn into_record(self) -> Result<(PresenceId, EscalationRecord), ConfigurationError> {
        let presence = PresenceId::new(self.presence_id);
        let flock = FlockId::new(self.flock_id);
        let level = u32::try_from(self.level).map_err(|_| ConfigurationError::InvalidLevel {
            presence,
            flock,
            level: self.level,
        })?;
        let record = EscalationRecord::new(presence, flock, level, self.chance)?;
        Ok((presence, record))
    }
}

/// Failures caused by corrupt or inconsistent authoritative data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// A flock identifier could not be resolved.
    #[error("flock configuration {flock} does not exist")]
    UnknownFlock {
        /// Unresolved identifier.
        flock: FlockId,
    },
    /// An escalation chance fell outside `[0, 1]`.
    #[error("presence {presence} flock {flock} has chance {chance} outside [0, 1]")]
    ChanceOutOfRange {
        /// Presence the record belongs to.
        presence: PresenceId,
        /// Flock the record references.
        flock: FlockId,
        /// Offending chance.
        chance: f64,
    },
    /// An escalation level was negative or did not fit the level range.
    #[error("presence {presence} flock {flock} has invalid level {level}")]
    InvalidLevel {
        /// Presence the record belongs to.
        presence: PresenceId,
        /// Flock the record references.
        flock: FlockId,
        /// Offending level.
        level: i64,
    },
    /// A presence kind code is not part of the code table.
    #[error("unknown presence kind code {code}")]
    UnknownPresenceKind {
        /// Offending code.
        code: u8,
    },
    /// The presence kind cannot be driven by this lifecycle.
    #[error("presence {presence} has unsupported kind {kind:?}")]
    UnsupportedPresenceKind {
        /// Presence being constructed.
        presence: PresenceId,
        /// Offending kind.
        kind: PresenceKind,
    },
    /// An escalating presence was configured without a growth interval.
    #[error("escalating presence {presence} has no growth interval")]
    MissingGrowthDuration {
        /// Presence being constructed.
        presence: PresenceId,
    },
}

/// Resolves flock identifiers to spawnable configurations.
pub trait FlockConfigurationRepository: Send + Sync {
    /// Returns the configuration for `flock`; unknown identifiers are fatal.
    fn get(&self, flock: FlockId) -> Result<FlockConfiguration, ConfigurationError>;
}

/// In-memory [`FlockConfigurationRepository`] keyed by flock identifier.
#[derive(Clone, Debug, Default)]
pub struct FlockLibrary {
    flocks: HashMap<FlockId, FlockConfiguration>,
}

impl FlockLibrary {
    /// Builds a library from configurations; later duplicates replace earlier ones.
    #[must_use]
    pub fn from_configurations(configurations: impl IntoIterator<Item = FlockConfiguration>) -> Self {
        let mut flocks = HashMap::new();
        for configuration in configurations {
            let _ = flocks.insert(configuration.id, configuration);
        }
        Self { flocks }
    }

    /// Number of known configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flocks.len()
    }

    /// Reports whether the library holds no configurations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flocks.is_empty()
    }
}

impl FlockConfigurationRepository for FlockLibrary {
    fn get(&self, flock: FlockId) -> Result<FlockConfiguration, ConfigurationError> {
        self.flocks
            .get(&flock)
            .cloned()
            .ok_or(ConfigurationError::UnknownFlock { flock })
    }
}

/// Uniform `[0, 1)` generator consumed by probabilistic selection.
pub trait RandomSource {
    /// Draws the next uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// ChaCha-backed [`RandomSource`] seeded per presence.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Derives the base seed of a presence from the simulation-wide seed.
#[must_use]
pub fn derive_presence_seed(global_seed: u64, presence: PresenceId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update(presence.get().to_le_bytes());
    finalize_seed(hasher)
}

/// Derives an independent labelled stream seed, e.g. one per search run.
#[must_use]
pub fn derive_stream_seed(base: u64, label: &str, index: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    hasher.update(index.to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Static unit captured in a [`PlacementView`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticUnitSnapshot {
    /// Category of the unit.
    pub kind: StaticUnitKind,
    /// Location of the unit.
    pub position: Position,
}

/// Recorded spawn origin of another presence captured in a [`PlacementView`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresenceOrigin {
    /// Presence that recorded the origin.
    pub presence: PresenceId,
    /// Recorded origin.
    pub origin: Position,
}

/// Owned snapshot of everything a spawn-site search must avoid.
///
/// The snapshot is detached from the zone so a background search can read it
/// while the zone keeps ticking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlacementView {
    is_gamma: bool,
    static_units: Vec<StaticUnitSnapshot>,
    presence_origins: Vec<PresenceOrigin>,
    players: Vec<Position>,
}

impl PlacementView {
    /// Captures a new placement view.
    #[must_use]
    pub fn new(
        is_gamma: bool,
        static_units: Vec<StaticUnitSnapshot>,
        presence_origins: Vec<PresenceOrigin>,
        players: Vec<Position>,
    ) -> Self {
        Self {
            is_gamma,
            static_units,
            presence_origins,
            players,
        }
    }

    /// Whether the zone hosts player-built docking structures.
    #[must_use]
    pub const fn is_gamma(&self) -> bool {
        self.is_gamma
    }

    /// Positions of static units of one category.
    pub fn static_units_of(&self, kind: StaticUnitKind) -> impl Iterator<Item = Position> + '_ {
        self.static_units
            .iter()
            .filter(move |unit| unit.kind == kind)
            .map(|unit| unit.position)
    }

    /// Spawn origins recorded by other roaming-capable presences.
    #[must_use]
    pub fn presence_origins(&self) -> &[PresenceOrigin] {
        &self.presence_origins
    }

    /// Player positions.
    #[must_use]
    pub fn players(&self) -> &[Position] {
        &self.players
    }
}
