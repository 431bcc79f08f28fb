use std::{sync::Arc, time::Duration};

use hostile_presence_core::{
    derive_presence_seed, derive_stream_seed, Command, ConfigurationError, FlockConfiguration,
    FlockConfigurationRepository, FlockKey, Position, PresenceConfiguration, PresenceId,
    PresenceKind, RandomSource, SeededRandom,
};
use hostile_presence_system_escalation::EscalatingFlockSelector;
use hostile_presence_system_placement::ExclusionRules;
use hostile_presence_zone::Zone;
use tracing::{debug, info, warn};

use crate::{
    config::LifecycleSettings,
    flock::Flock,
    stack::PushdownMachine,
    states::{PresenceEffect, PresenceState, SpawnState, SpawnVariant, StateContext, StateKind},
};

const ESCALATION_STREAM: &str = "escalation";
const BASE_LEVEL: u32 = 0;

/// Shared services a presence consults.
#[derive(Clone)]
pub struct PresenceDependencies {
    /// Picks the flocks of each escalation level.
    pub selector: Arc<dyn EscalatingFlockSelector>,
    /// Resolves the flocks of static presences.
    pub flocks: Arc<dyn FlockConfigurationRepository>,
    /// Zone-wide lifecycle tunables.
    pub settings: LifecycleSettings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Growth {
    Static,
    Growing(Duration),
}

/// A hostile presence that finds a spawn site, optionally escalates, and
/// restarts its whole cycle when its lifetime runs out.
pub struct Presence {
    configuration: PresenceConfiguration,
    growth: Growth,
    selector: Arc<dyn EscalatingFlockSelector>,
    repository: Arc<dyn FlockConfigurationRepository>,
    random: Box<dyn RandomSource>,
    settings: LifecycleSettings,
    rules: ExclusionRules,
    seed: u64,
    machine: PushdownMachine<PresenceState>,
    flocks: Vec<Flock>,
    next_flock_serial: u32,
    lifetime: Duration,
    despawn_timer: Duration,
    spawn_origin: Option<Position>,
    search_runs: u64,
    cycles: u32,
    exiting: bool,
}

impl Presence {
    /// Builds a presence whose escalation draws come from the settings seed.
    pub fn new(
        configuration: PresenceConfiguration,
        dependencies: PresenceDependencies,
    ) -> Result<Self, ConfigurationError> {
        let seed = derive_presence_seed(dependencies.settings.seed, configuration.id);
        let random = SeededRandom::new(derive_stream_seed(seed, ESCALATION_STREAM, 0));
        Self::with_random(configuration, dependencies, Box::new(random))
    }

    /// Builds a presence that draws escalation rolls from `random`.
    ///
    /// Static presences resolve their flocks through the repository, growing
    /// presences load their level-0 set through the selector. Either failure
    /// aborts construction.
    pub fn with_random(
        configuration: PresenceConfiguration,
        dependencies: PresenceDependencies,
        random: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigurationError> {
        let growth = resolve_growth(&configuration)?;
        let lifetime = configuration
            .dynamic_lifetime()
            .unwrap_or_else(|| dependencies.settings.default_lifetime());

        let mut presence = Self {
            rules: ExclusionRules::for_presence(&configuration),
            seed: derive_presence_seed(dependencies.settings.seed, configuration.id),
            configuration,
            growth,
            selector: dependencies.selector,
            repository: dependencies.flocks,
            random,
            settings: dependencies.settings,
            machine: PushdownMachine::new(),
            flocks: Vec::new(),
            next_flock_serial: 0,
            lifetime,
            despawn_timer: Duration::ZERO,
            spawn_origin: None,
            search_runs: 0,
            cycles: 0,
            exiting: false,
        };
        presence.load_flocks()?;
        let initial = presence.initial_state();
        presence.machine.push(initial);
        Ok(presence)
    }

    /// Advances the presence by one tick, pushing the zone commands it needs.
    ///
    /// A configuration error leaves the presence unusable; the caller is
    /// expected to tear it down.
    pub fn update(
        &mut self,
        elapsed: Duration,
        zone: &Zone,
        out: &mut Vec<Command>,
    ) -> Result<(), ConfigurationError> {
        self.despawn_timer = self.despawn_timer.saturating_add(elapsed);
        if self.despawn_timer >= self.lifetime {
            return self.expire(out);
        }

        let mut context = StateContext {
            zone,
            presence: self.configuration.id,
            area: self.configuration.area,
            rules: self.rules,
            search: self.settings.search,
            seed: self.seed,
            search_runs: &mut self.search_runs,
            flocks: &self.flocks,
            exiting: self.exiting,
            effects: Vec::new(),
        };
        self.machine.update(elapsed, &mut context);
        let effects = context.effects;

        // Waves raised this tick are spawned before the tick ends.
        for effect in effects {
            match effect {
                PresenceEffect::Spawned { origin } => self.on_spawned(origin, out),
                PresenceEffect::SpawnWave { level } => self.spawn_wave(level, out)?,
            }
        }
        Ok(())
    }

    /// Marks the presence as shutting down; a wiped out presence stops escalating.
    pub fn begin_exit(&mut self) {
        self.exiting = true;
    }

    /// Reports whether [`Presence::begin_exit`] was called.
    #[must_use]
    pub const fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Stops the state machine and removes every member from the zone.
    pub fn teardown(&mut self, out: &mut Vec<Command>) {
        self.machine.clear();
        for flock in &self.flocks {
            flock.remove_all_members_from_zone(true, out);
        }
    }

    /// Identity of the presence.
    #[must_use]
    pub const fn id(&self) -> PresenceId {
        self.configuration.id
    }

    /// Configuration the presence was built from.
    #[must_use]
    pub fn configuration(&self) -> &PresenceConfiguration {
        &self.configuration
    }

    /// State currently receiving ticks.
    #[must_use]
    pub fn state(&self) -> Option<StateKind> {
        self.machine.top().map(PresenceState::kind)
    }

    /// Escalation level of the active growth state.
    #[must_use]
    pub fn growth_level(&self) -> Option<u32> {
        match self.machine.top() {
            Some(PresenceState::Growth(growth)) => Some(growth.level()),
            _ => None,
        }
    }

    /// Highest level the presence asks the selector for.
    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.configuration
            .max_level
            .or_else(|| self.selector.max_level(self.configuration.id))
            .unwrap_or(BASE_LEVEL)
    }

    /// Flocks the presence currently owns.
    #[must_use]
    pub fn flocks(&self) -> &[Flock] {
        &self.flocks
    }

    /// Last site a search placed the presence at.
    #[must_use]
    pub const fn spawn_origin(&self) -> Option<Position> {
        self.spawn_origin
    }

    /// Lifetime after which the presence resets.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Number of completed expiry resets.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Reports whether the presence escalates over time.
    #[must_use]
    pub fn is_growing(&self) -> bool {
        matches!(self.growth, Growth::Growing(_))
    }

    fn initial_state(&self) -> PresenceState {
        let variant = match self.growth {
            Growth::Static => SpawnVariant::Static,
            Growth::Growing(growth) => SpawnVariant::Grow { growth },
        };
        PresenceState::Spawn(SpawnState::new(variant))
    }

    fn load_flocks(&mut self) -> Result<(), ConfigurationError> {
        let configurations = match self.growth {
            Growth::Static => self
                .configuration
                .flocks
                .iter()
                .map(|flock| self.repository.get(*flock))
                .collect::<Result<Vec<_>, _>>()?,
            Growth::Growing(_) => self.selector.flocks_for_level(
                self.configuration.id,
                BASE_LEVEL,
                &mut *self.random,
            )?,
        };
        for configuration in configurations {
            let flock = self.create_flock(configuration);
            self.flocks.push(flock);
        }
        Ok(())
    }

    fn create_flock(&mut self, configuration: FlockConfiguration) -> Flock {
        let key = FlockKey::new(self.configuration.id, self.next_flock_serial);
        self.next_flock_serial = self.next_flock_serial.wrapping_add(1);
        Flock::new(key, configuration)
    }

    fn on_spawned(&mut self, origin: Position, out: &mut Vec<Command>) {
        self.spawn_origin = Some(origin);
        self.despawn_timer = Duration::ZERO;
        out.push(Command::RecordSpawnOrigin {
            presence: self.configuration.id,
            origin,
        });
        for flock in &self.flocks {
            flock.spawn_all_members(origin, out);
        }
        info!(
            presence = %self.configuration.id,
            x = origin.x(),
            y = origin.y(),
            flocks = self.flocks.len(),
            "presence placed"
        );
    }

    fn spawn_wave(&mut self, level: u32, out: &mut Vec<Command>) -> Result<(), ConfigurationError> {
        let max_level = self.max_level();
        if level > max_level {
            debug!(presence = %self.configuration.id, level, max_level, "level beyond escalation range");
            return Ok(());
        }

        let configurations =
            self.selector
                .flocks_for_level(self.configuration.id, level, &mut *self.random)?;
        let Some(origin) = self.spawn_origin else {
            warn!(presence = %self.configuration.id, level, "wave raised before placement");
            return Ok(());
        };

        let spawned = configurations.len();
        for configuration in configurations {
            let flock = self.create_flock(configuration);
            flock.spawn_all_members(origin, out);
            self.flocks.push(flock);
        }
        info!(presence = %self.configuration.id, level, flocks = spawned, "growth wave spawned");
        Ok(())
    }

    fn expire(&mut self, out: &mut Vec<Command>) -> Result<(), ConfigurationError> {
        info!(
            presence = %self.configuration.id,
            level = self.growth_level().unwrap_or(BASE_LEVEL),
            flocks = self.flocks.len(),
            "presence expired"
        );
        self.machine.clear();
        for flock in &self.flocks {
            flock.remove_all_members_from_zone(true, out);
        }
        self.despawn_timer = Duration::ZERO;
        self.cycles = self.cycles.saturating_add(1);
        let initial = self.initial_state();
        self.machine.push(initial);

        if self.is_growing() {
            self.flocks.clear();
            self.load_flocks()?;
        }
        Ok(())
    }
}

fn resolve_growth(configuration: &PresenceConfiguration) -> Result<Growth, ConfigurationError> {
    let presence = configuration.id;
    match configuration.kind {
        PresenceKind::ExpiringRandom | PresenceKind::EscalatingRandomPresence => {}
        kind => return Err(ConfigurationError::UnsupportedPresenceKind { presence, kind }),
    }
    match configuration.growth_duration() {
        Some(growth) => Ok(Growth::Growing(growth)),
        None if configuration.kind == PresenceKind::EscalatingRandomPresence => {
            Err(ConfigurationError::MissingGrowthDuration { presence })
        }
        None => Ok(Growth::Static),
    }
}
