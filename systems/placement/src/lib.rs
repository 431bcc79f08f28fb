#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn-site selection for randomly placed presences.
//!
//! [`ExclusionRules`] decide whether a single candidate coordinate is
//! acceptable; [`SpawnSiteSearch`] samples candidates inside a presence area
//! on a background thread until one passes, the candidate budget runs out, or
//! the search is cancelled.

mod rules;
mod search;

pub use rules::{ExclusionRules, Rejection};
pub use search::{
    run_search, CancellationToken, SearchHandle, SearchMode, SearchOutcome, SearchPoll,
    SearchRequest, SpawnSiteSearch,
};
