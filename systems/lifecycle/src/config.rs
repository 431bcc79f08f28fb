use std::time::Duration;

use hostile_presence_system_placement::SearchMode;
use serde::{Deserialize, Serialize};

const DEFAULT_LIFETIME_SECS: u32 = 3_600;
const DEFAULT_CANDIDATES_PER_SEARCH: u32 = 200;

/// Tunables shared by every presence driven in a zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Lifetime of presences without a dynamic lifetime, in seconds.
    pub default_lifetime_secs: u32,
    /// Global seed every presence derives its random streams from.
    pub seed: u64,
    /// Spawn-site search behaviour.
    pub search: SearchSettings,
}

impl LifecycleSettings {
    /// Lifetime applied when a presence configures none.
    #[must_use]
    pub fn default_lifetime(&self) -> Duration {
        Duration::from_secs(u64::from(self.default_lifetime_secs))
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            default_lifetime_secs: DEFAULT_LIFETIME_SECS,
            seed: 0,
            search: SearchSettings::default(),
        }
    }
}

/// How spawn-site searches are run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Thread the search runs on.
    pub mode: SearchMode,
    /// Candidates sampled per run before it reports exhaustion.
    pub candidates_per_search: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: SearchMode::Background,
            candidates_per_search: DEFAULT_CANDIDATES_PER_SEARCH,
        }
    }
}
