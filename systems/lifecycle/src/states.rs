use std::time::Duration;

use hostile_presence_core::{derive_stream_seed, Area, Position, PresenceId};
use hostile_presence_system_placement::{
    ExclusionRules, SearchHandle, SearchOutcome, SearchPoll, SearchRequest, SpawnSiteSearch,
};
use hostile_presence_zone::{query, Zone};
use tracing::debug;

use crate::{
    config::SearchSettings,
    flock::Flock,
    stack::{TickState, Transition},
};

const PLACEMENT_STREAM: &str = "placement";

/// Public view of the state a presence is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    /// Searching for a spawn site.
    Spawn,
    /// Placed with nothing further to do until expiry.
    Placed,
    /// Placed and escalating on a timer.
    Growth,
}

/// Requests raised by states and carried out by the owning presence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PresenceEffect {
    /// A spawn site was found.
    Spawned { origin: Position },
    /// The growth timer elapsed and the level advanced.
    SpawnWave { level: u32 },
}

/// Everything a state may read during one tick of its presence.
pub(crate) struct StateContext<'a> {
    pub(crate) zone: &'a Zone,
    pub(crate) presence: PresenceId,
    pub(crate) area: Area,
    pub(crate) rules: ExclusionRules,
    pub(crate) search: SearchSettings,
    pub(crate) seed: u64,
    pub(crate) search_runs: &'a mut u64,
    pub(crate) flocks: &'a [Flock],
    pub(crate) exiting: bool,
    pub(crate) effects: Vec<PresenceEffect>,
}

impl StateContext<'_> {
    fn all_members_dead(&self) -> bool {
        self.flocks
            .iter()
            .all(|flock| flock.liveness(self.zone).alive == 0)
    }

    /// Candidates are drawn only where the presence area overlaps the zone.
    fn next_search_request(&mut self) -> Option<SearchRequest> {
        let area = self.area.intersection(&query::area(self.zone))?;
        let run = *self.search_runs;
        *self.search_runs += 1;
        Some(SearchRequest {
            area,
            view: query::placement_view(self.zone, self.presence),
            rules: self.rules,
            seed: derive_stream_seed(self.seed, PLACEMENT_STREAM, run),
            max_candidates: self.search.candidates_per_search,
        })
    }
}

/// States stacked inside a presence's pushdown machine.
pub(crate) enum PresenceState {
    Spawn(SpawnState),
    Placed,
    Growth(GrowthState),
}

impl PresenceState {
    pub(crate) fn kind(&self) -> StateKind {
        match self {
            Self::Spawn(_) => StateKind::Spawn,
            Self::Placed => StateKind::Placed,
            Self::Growth(_) => StateKind::Growth,
        }
    }
}

impl<'a> TickState<StateContext<'a>> for PresenceState {
    fn update(&mut self, elapsed: Duration, context: &mut StateContext<'a>) -> Transition<Self> {
        match self {
            Self::Spawn(state) => state.update(context),
            Self::Placed => Transition::Stay,
            Self::Growth(state) => {
                state.update(elapsed, context);
                Transition::Stay
            }
        }
    }
}

/// What a spawn state pushes once its site is found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SpawnVariant {
    Static,
    Grow { growth: Duration },
}

/// Runs spawn-site searches until one succeeds.
pub(crate) struct SpawnState {
    variant: SpawnVariant,
    search: Option<SearchHandle>,
}

impl SpawnState {
    pub(crate) const fn new(variant: SpawnVariant) -> Self {
        Self {
            variant,
            search: None,
        }
    }

    fn update(&mut self, context: &mut StateContext<'_>) -> Transition<PresenceState> {
        if let Some(handle) = self.search.as_mut() {
            match handle.poll() {
                SearchPoll::Pending => return Transition::Stay,
                SearchPoll::Finished(SearchOutcome::Found(origin)) => {
                    self.search = None;
                    context.effects.push(PresenceEffect::Spawned { origin });
                    return Transition::Push(self.next_state());
                }
                SearchPoll::Finished(SearchOutcome::Exhausted { candidates }) => {
                    debug!(
                        presence = %context.presence,
                        candidates,
                        "no spawn site found, retrying next tick"
                    );
                    self.search = None;
                    return Transition::Stay;
                }
                SearchPoll::Finished(SearchOutcome::Cancelled) => {
                    self.search = None;
                    return Transition::Stay;
                }
            }
        }

        let Some(request) = context.next_search_request() else {
            debug!(presence = %context.presence, "presence area lies outside the zone");
            return Transition::Stay;
        };
        debug!(presence = %context.presence, seed = request.seed, "spawn-site search started");
        self.search = Some(SpawnSiteSearch::start(request, context.search.mode));
        Transition::Stay
    }

    fn next_state(&self) -> PresenceState {
        match self.variant {
            SpawnVariant::Static => PresenceState::Placed,
            SpawnVariant::Grow { growth } => PresenceState::Growth(GrowthState::new(growth)),
        }
    }
}

/// Advances the escalation level every time its growth interval elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GrowthState {
    growth: Duration,
    timer: Duration,
    level: u32,
}

impl GrowthState {
    pub(crate) const fn new(growth: Duration) -> Self {
        Self {
            growth,
            timer: Duration::ZERO,
            level: 0,
        }
    }

    pub(crate) const fn level(&self) -> u32 {
        self.level
    }

    fn update(&mut self, elapsed: Duration, context: &mut StateContext<'_>) {
        if context.exiting && context.all_members_dead() {
            return;
        }

        self.timer = self.timer.saturating_add(elapsed);
        if self.timer < self.growth {
            return;
        }

        self.timer = Duration::ZERO;
        self.level = self.level.saturating_add(1);
        context.effects.push(PresenceEffect::SpawnWave { level: self.level });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostile_presence_core::{Command, FlockConfiguration, FlockId, FlockKey};
    use hostile_presence_system_placement::SearchMode;

    const PRESENCE: PresenceId = PresenceId::new(1);

    fn context<'a>(zone: &'a Zone, runs: &'a mut u64, flocks: &'a [Flock]) -> StateContext<'a> {
        StateContext {
            zone,
            presence: PRESENCE,
            area: Area::new(0.0, 0.0, 1_000.0, 1_000.0),
            rules: ExclusionRules::default(),
            search: SearchSettings {
                mode: SearchMode::Inline,
                candidates_per_search: 200,
            },
            seed: 7,
            search_runs: runs,
            flocks,
            exiting: false,
            effects: Vec::new(),
        }
    }

    fn secs(seconds: u64) -> Duration {
        Duration::from_secs(seconds)
    }

    #[test]
    fn growth_level_holds_until_interval_elapses() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        let mut growth = GrowthState::new(secs(60));

        for _ in 0..59 {
            growth.update(secs(1), &mut context);
        }
        assert_eq!(growth.level(), 0);
        assert!(context.effects.is_empty());

        growth.update(secs(1), &mut context);
        assert_eq!(growth.level(), 1);
        assert_eq!(context.effects, vec![PresenceEffect::SpawnWave { level: 1 }]);
        assert_eq!(growth.timer, Duration::ZERO, "timer resets, level does not");
    }

    #[test]
    fn oversized_tick_increments_level_once() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        let mut growth = GrowthState::new(secs(60));

        growth.update(secs(150), &mut context);
        assert_eq!(growth.level(), 1);
        assert_eq!(context.effects.len(), 1);
    }

    #[test]
    fn zero_interval_growth_saturates_at_the_top_level() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        let mut growth = GrowthState {
            level: u32::MAX - 1,
            ..GrowthState::new(Duration::ZERO)
        };

        growth.update(Duration::ZERO, &mut context);
        growth.update(Duration::ZERO, &mut context);
        assert_eq!(growth.level(), u32::MAX);
        assert_eq!(
            context.effects,
            vec![
                PresenceEffect::SpawnWave { level: u32::MAX },
                PresenceEffect::SpawnWave { level: u32::MAX },
            ]
        );
    }

    #[test]
    fn search_is_confined_to_the_zone() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        context.area = Area::new(1_500.0, 1_500.0, 3_500.0, 3_500.0);
        let request = context.next_search_request().expect("areas overlap");
        assert_eq!(request.area, Area::new(1_500.0, 1_500.0, 2_048.0, 2_048.0));

        context.area = Area::new(3_000.0, 3_000.0, 3_500.0, 3_500.0);
        let mut state = SpawnState::new(SpawnVariant::Static);
        assert!(matches!(state.update(&mut context), Transition::Stay));
        assert!(state.search.is_none());
        assert_eq!(*context.search_runs, 1);
    }

    #[test]
    fn exiting_presence_with_dead_members_does_not_escalate() {
        let mut zone = Zone::new();
        let key = FlockKey::new(PRESENCE, 0);
        let mut events = Vec::new();
        hostile_presence_zone::apply(
            &mut zone,
            Command::SpawnFlockMembers {
                flock: key,
                count: 1,
                origin: Position::new(100.0, 100.0),
                spawn_radius: 5.0,
            },
            &mut events,
        );
        let unit = query::flock_members(&zone, key)[0].id;
        hostile_presence_zone::apply(&mut zone, Command::KillMember { unit }, &mut events);

        let flocks = [Flock::new(
            key,
            FlockConfiguration {
                id: FlockId::new(1),
                name: String::new(),
                member_count: 1,
                spawn_radius: 5.0,
            },
        )];
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &flocks);
        let mut growth = GrowthState::new(secs(1));

        context.exiting = true;
        growth.update(secs(5), &mut context);
        assert_eq!(growth.level(), 0);

        context.exiting = false;
        growth.update(secs(5), &mut context);
        assert_eq!(growth.level(), 1);
    }

    #[test]
    fn spawn_state_reports_found_site_on_the_following_tick() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        let mut state = SpawnState::new(SpawnVariant::Grow { growth: secs(60) });

        assert!(matches!(state.update(&mut context), Transition::Stay));
        assert!(context.effects.is_empty(), "results land on the next tick");

        match state.update(&mut context) {
            Transition::Push(PresenceState::Growth(growth)) => assert_eq!(growth.level(), 0),
            _ => panic!("expected growth state to be pushed"),
        }
        assert!(matches!(
            context.effects.as_slice(),
            [PresenceEffect::Spawned { .. }]
        ));
        assert_eq!(*context.search_runs, 1);
    }

    #[test]
    fn exhausted_search_restarts_with_a_fresh_run() {
        let zone = Zone::new();
        let mut runs = 0;
        let mut context = context(&zone, &mut runs, &[]);
        context.search.candidates_per_search = 0;
        let mut state = SpawnState::new(SpawnVariant::Static);

        for _ in 0..4 {
            assert!(matches!(state.update(&mut context), Transition::Stay));
        }
        assert_eq!(*context.search_runs, 2, "start, exhaust, start, exhaust");
        assert!(context.effects.is_empty());
    }
}
