use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread,
};

use hostile_presence_core::{Area, PlacementView, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rules::ExclusionRules;

/// Where a search run executes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// On a dedicated worker thread.
    #[default]
    Background,
    /// On the calling thread; the result is still delivered through the handle.
    Inline,
}

/// Shared flag a running search checks before every candidate.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Reports whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Everything a search run needs, detached from the zone.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    /// Region candidates are sampled from.
    pub area: Area,
    /// Obstacles captured when the search started.
    pub view: PlacementView,
    /// Distances candidates must respect.
    pub rules: ExclusionRules,
    /// Seed of the candidate sampler.
    pub seed: u64,
    /// Number of candidates sampled before the run gives up.
    pub max_candidates: u32,
}

/// Result of one search run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchOutcome {
    /// A candidate passed every rule.
    Found(Position),
    /// Every sampled candidate was rejected.
    Exhausted {
        /// Number of candidates sampled.
        candidates: u32,
    },
    /// The run stopped because its token was cancelled.
    Cancelled,
}

/// State of an outstanding search observed from the owning tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchPoll {
    /// The run has not reported yet.
    Pending,
    /// The run reported an outcome.
    Finished(SearchOutcome),
}

/// Entry point for starting spawn-site searches.
#[derive(Debug, Default)]
pub struct SpawnSiteSearch;

impl SpawnSiteSearch {
    /// Starts a search run and returns the handle its outcome arrives on.
    #[must_use]
    pub fn start(request: SearchRequest, mode: SearchMode) -> SearchHandle {
        let (sender, receiver) = mpsc::channel();
        let token = CancellationToken::new();

        match mode {
            SearchMode::Inline => {
                let _ = sender.send(run_search(&request, &token));
            }
            SearchMode::Background => {
                let worker_token = token.clone();
                let spawned = thread::Builder::new()
                    .name("spawn-site-search".to_owned())
                    .spawn(move || {
                        let outcome = run_search(&request, &worker_token);
                        // The owner may have been torn down; a closed channel is fine.
                        let _ = sender.send(outcome);
                    });
                if let Err(error) = spawned {
                    warn!(%error, "search thread unavailable, search will retry");
                }
            }
        }

        SearchHandle { receiver, token }
    }
}

/// Owning end of a search run; dropping it cancels the run.
#[derive(Debug)]
pub struct SearchHandle {
    receiver: Receiver<SearchOutcome>,
    token: CancellationToken,
}

impl SearchHandle {
    /// Checks for an outcome without blocking.
    ///
    /// A run that ended without reporting is surfaced as cancelled.
    pub fn poll(&mut self) -> SearchPoll {
        match self.receiver.try_recv() {
            Ok(outcome) => SearchPoll::Finished(outcome),
            Err(TryRecvError::Empty) => SearchPoll::Pending,
            Err(TryRecvError::Disconnected) => SearchPoll::Finished(SearchOutcome::Cancelled),
        }
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token shared with the run.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Samples candidates until one passes, the budget runs out, or `token` is cancelled.
#[must_use]
pub fn run_search(request: &SearchRequest, token: &CancellationToken) -> SearchOutcome {
    let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
    for _ in 0..request.max_candidates {
        if token.is_cancelled() {
            return SearchOutcome::Cancelled;
        }
        let candidate = sample_candidate(&request.area, &mut rng);
        if request.rules.check(&request.view, candidate).is_ok() {
            return SearchOutcome::Found(candidate);
        }
    }
    SearchOutcome::Exhausted {
        candidates: request.max_candidates,
    }
}

fn sample_candidate(area: &Area, rng: &mut ChaCha8Rng) -> Position {
    let min = area.min();
    let max = area.max();
    Position::new(
        rng.gen_range(min.x()..=max.x()),
        rng.gen_range(min.y()..=max.y()),
    )
}
