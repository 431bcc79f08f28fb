#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless runner that drives hostile presences through a scenario file.

mod scenario;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use hostile_presence_core::{Command, Event, FlockLibrary};
use hostile_presence_system_escalation::EscalationSelector;
use hostile_presence_system_lifecycle::{Presence, PresenceDependencies, PresenceRoster};
use hostile_presence_zone::{apply, query, Zone};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(
    name = "hostile-presence",
    version,
    about = "Run growing hostile presences through a zone scenario"
)]
struct Cli {
    /// Scenario file describing the zone, flocks, presences and escalations.
    scenario: PathBuf,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Simulated length of one tick in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    tick_ms: u64,
    /// Overrides the scenario seed.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the hostile presence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut scenario = Scenario::from_path(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.settings.seed = seed;
    }

    let mut zone = Zone::new();
    if let Some(capacity) = scenario.zone.member_capacity {
        zone = zone.with_member_capacity(capacity);
    }
    let mut events = Vec::new();
    for command in scenario.setup_commands() {
        apply(&mut zone, command, &mut events);
    }

    let table = scenario.escalation_table()?;
    let flocks = Arc::new(FlockLibrary::from_configurations(scenario.flocks.clone()));
    let dependencies = PresenceDependencies {
        selector: Arc::new(EscalationSelector::new(table, flocks.clone())),
        flocks,
        settings: scenario.settings,
    };

    let mut roster = PresenceRoster::new();
    for configuration in scenario.presences.clone() {
        let id = configuration.id;
        let presence = Presence::new(configuration, dependencies.clone())
            .with_context(|| format!("presence {id} cannot be built"))?;
        roster.insert(&mut zone, presence, &mut events);
    }
    info!(
        presences = roster.len(),
        players = query::player_count(&zone),
        "scenario loaded"
    );

    let dt = Duration::from_millis(cli.tick_ms);
    for _ in 0..cli.ticks {
        events.clear();
        apply(&mut zone, Command::Tick { dt }, &mut events);
        roster.tick(&mut zone, dt, &mut events);
        log_events(&events);
    }

    for presence in roster.iter() {
        info!(
            presence = %presence.id(),
            state = ?presence.state(),
            level = ?presence.growth_level(),
            flocks = presence.flocks().len(),
            cycles = presence.cycles(),
            "presence summary"
        );
    }
    println!(
        "{} ticks simulated, {} presences active, {} members in zone",
        cli.ticks,
        roster.len(),
        query::member_count(&zone)
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::FlockMembersSpawned { flock, members } => {
                debug!(%flock, members = members.len(), "members spawned");
            }
            Event::FlockMembersRemoved { flock, count } => {
                debug!(%flock, count, "members removed");
            }
            Event::SpawnOriginRecorded { presence, origin } => {
                debug!(%presence, x = origin.x(), y = origin.y(), "spawn origin recorded");
            }
            _ => {}
        }
    }
}
