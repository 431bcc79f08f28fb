use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use hostile_presence_core::{
    Area, Command, EscalationRow, FlockConfiguration, PlayerId, Position, PresenceConfiguration,
    StaticUnitKind,
};
use hostile_presence_system_escalation::{
    EscalationSource, EscalationTable, JsonEscalationSource, StaticEscalationSource,
    TomlEscalationSource,
};
use hostile_presence_system_lifecycle::LifecycleSettings;
use serde::Deserialize;

const DEFAULT_ZONE_EXTENT: f32 = 2_048.0;

/// Zone contents and presence definitions loaded from a TOML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub(crate) zone: ZoneSection,
    #[serde(default)]
    pub(crate) static_units: Vec<StaticUnitEntry>,
    #[serde(default)]
    pub(crate) players: Vec<PlayerEntry>,
    #[serde(default)]
    pub(crate) flocks: Vec<FlockConfiguration>,
    #[serde(default)]
    pub(crate) presences: Vec<PresenceConfiguration>,
    #[serde(default)]
    pub(crate) escalations: Vec<EscalationRow>,
    /// External escalation data, resolved relative to the scenario file.
    #[serde(default)]
    pub(crate) escalation_file: Option<PathBuf>,
    #[serde(default)]
    pub(crate) settings: LifecycleSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ZoneSection {
    pub(crate) area: Area,
    pub(crate) gamma: bool,
    pub(crate) member_capacity: Option<usize>,
}

impl Default for ZoneSection {
    fn default() -> Self {
        Self {
            area: Area::new(0.0, 0.0, DEFAULT_ZONE_EXTENT, DEFAULT_ZONE_EXTENT),
            gamma: false,
            member_capacity: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StaticUnitEntry {
    kind: StaticUnitKind,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlayerEntry {
    id: u32,
    x: f32,
    y: f32,
}

impl Scenario {
    /// Reads and parses a scenario file.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let mut scenario =
            Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))?;
        if let (Some(file), Some(directory)) = (scenario.escalation_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = directory.join(&*file);
            }
        }
        Ok(scenario)
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("scenario is not valid TOML")
    }

    /// Commands that populate an empty zone with the scenario's fixed contents.
    pub(crate) fn setup_commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::ConfigureZone {
            area: self.zone.area,
            is_gamma: self.zone.gamma,
        }];
        commands.extend(self.static_units.iter().map(|unit| Command::PlaceStaticUnit {
            kind: unit.kind,
            position: Position::new(unit.x, unit.y),
        }));
        commands.extend(self.players.iter().map(|player| Command::MovePlayer {
            player: PlayerId::new(player.id),
            position: Position::new(player.x, player.y),
        }));
        commands
    }

    /// Loads the escalation table from the inline rows and the optional external file.
    pub(crate) fn escalation_table(&self) -> Result<Arc<EscalationTable>> {
        let mut rows = self.escalations.clone();
        if let Some(path) = &self.escalation_file {
            let source: Box<dyn EscalationSource> =
                match path.extension().and_then(|extension| extension.to_str()) {
                    Some("json") => Box::new(JsonEscalationSource::from_path(path)?),
                    _ => Box::new(TomlEscalationSource::from_path(path)?),
                };
            rows.extend(
                source
                    .load_rows()
                    .with_context(|| format!("invalid escalation file {}", path.display()))?,
            );
        }
        let table = EscalationTable::initialize(&StaticEscalationSource::new(rows))?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostile_presence_core::{FlockId, PresenceId, PresenceKind};
    use hostile_presence_system_lifecycle::SearchSettings;

    const SAMPLE: &str = include_str!("../scenarios/growing_outpost.toml");

    #[test]
    fn sample_scenario_parses() {
        let scenario = Scenario::parse(SAMPLE).expect("sample scenario is valid");
        assert!(scenario.zone.gamma);
        assert_eq!(scenario.zone.member_capacity, Some(256));
        assert_eq!(scenario.flocks.len(), 3);
        assert_eq!(scenario.presences.len(), 2);
        assert_eq!(scenario.presences[1].kind, PresenceKind::EscalatingRandomPresence);
        assert_eq!(scenario.presences[0].flocks, vec![FlockId::new(1)]);
        assert_eq!(scenario.settings.seed, 20_240_611);
        assert_eq!(scenario.settings.search, SearchSettings::default());

        let table = scenario.escalation_table().expect("valid escalation rows");
        assert_eq!(table.len(), 3);
        assert_eq!(table.max_level(PresenceId::new(42)), Some(2));

        // zone, three static units, one player
        assert_eq!(scenario.setup_commands().len(), 5);
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let scenario = Scenario::parse("").expect("empty scenario is valid");
        assert!(!scenario.zone.gamma);
        assert_eq!(scenario.zone.area.width(), DEFAULT_ZONE_EXTENT);
        assert!(scenario.presences.is_empty());
        assert_eq!(scenario.settings, LifecycleSettings::default());
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(Scenario::parse("[zones]\ngamma = true").is_err());
    }
}
