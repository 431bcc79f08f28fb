use std::{collections::HashMap, sync::Arc};

use hostile_presence_core::{ConfigurationError, EscalationRecord, EscalationRow, PresenceId};
use tracing::info;

use crate::source::{EscalationLoadError, EscalationSource};

/// Immutable lookup from presence identity to its escalation records.
#[derive(Debug, Default)]
pub struct EscalationTable {
    by_presence: HashMap<PresenceId, Vec<EscalationRecord>>,
    record_count: usize,
}

impl EscalationTable {
    /// Performs the one bulk load and publishes the table for sharing.
    pub fn initialize(source: &dyn EscalationSource) -> Result<Arc<Self>, EscalationLoadError> {
        let rows = source.load_rows()?;
        let table = Self::from_rows(rows)?;
        info!(
            records = table.record_count,
            presences = table.by_presence.len(),
            "escalation table loaded"
        );
        Ok(Arc::new(table))
    }

    /// Validates and groups rows by presence, keeping their input order.
    pub fn from_rows(
        rows: impl IntoIterator<Item = EscalationRow>,
    ) -> Result<Self, ConfigurationError> {
        let mut by_presence: HashMap<PresenceId, Vec<EscalationRecord>> = HashMap::new();
        let mut record_count = 0;
        for row in rows {
            let (presence, record) = row.into_record()?;
            by_presence.entry(presence).or_default().push(record);
            record_count += 1;
        }
        Ok(Self {
            by_presence,
            record_count,
        })
    }

    /// Records of one presence; unknown presences have none.
    #[must_use]
    pub fn records_for(&self, presence: PresenceId) -> &[EscalationRecord] {
        self.by_presence
            .get(&presence)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Highest level any record of the presence belongs to.
    #[must_use]
    pub fn max_level(&self, presence: PresenceId) -> Option<u32> {
        self.records_for(presence)
            .iter()
            .map(EscalationRecord::level)
            .max()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.record_count
    }

    /// Reports whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
