use std::{fmt, sync::Arc};

use hostile_presence_core::{
    ConfigurationError, FlockConfiguration, FlockConfigurationRepository, PresenceId,
    RandomSource,
};

use crate::table::EscalationTable;

/// Chooses the flocks that join a presence at a given escalation level.
pub trait EscalatingFlockSelector: Send + Sync {
    /// Rolls every record of exactly `level` and resolves the winners.
    ///
    /// Each call draws fresh values, so repeated calls may disagree.
    fn flocks_for_level(
        &self,
        presence: PresenceId,
        level: u32,
        random: &mut dyn RandomSource,
    ) -> Result<Vec<FlockConfiguration>, ConfigurationError>;

    /// Highest level the presence has escalation data for.
    fn max_level(&self, presence: PresenceId) -> Option<u32>;
}

/// [`EscalatingFlockSelector`] backed by the shared [`EscalationTable`].
pub struct EscalationSelector {
    table: Arc<EscalationTable>,
    flocks: Arc<dyn FlockConfigurationRepository>,
}

impl EscalationSelector {
    /// Creates a selector over the published table and flock repository.
    #[must_use]
    pub fn new(table: Arc<EscalationTable>, flocks: Arc<dyn FlockConfigurationRepository>) -> Self {
        Self { table, flocks }
    }

    /// Table the selector reads from.
    #[must_use]
    pub fn table(&self) -> &EscalationTable {
        &self.table
    }
}

impl fmt::Debug for EscalationSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscalationSelector")
            .field("records", &self.table.len())
            .finish_non_exhaustive()
    }
}

impl EscalatingFlockSelector for EscalationSelector {
    fn flocks_for_level(
        &self,
        presence: PresenceId,
        level: u32,
        random: &mut dyn RandomSource,
    ) -> Result<Vec<FlockConfiguration>, ConfigurationError> {
        let mut selected = Vec::new();
        for record in self
            .table
            .records_for(presence)
            .iter()
            .filter(|record| record.level() == level)
        {
            let roll = random.next_unit();
            // A zero chance must never win, even on a zero roll.
            if record.chance() > 0.0 && record.chance() >= roll {
                selected.push(self.flocks.get(record.flock())?);
            }
        }
        Ok(selected)
    }

    fn max_level(&self, presence: PresenceId) -> Option<u32> {
        self.table.max_level(presence)
    }
}
