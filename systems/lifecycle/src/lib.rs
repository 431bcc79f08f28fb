#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presence lifecycle: pushdown state machine, spawn and growth states, expiry
//! handling, and a roster that drives many presences against one zone.
//!
//! Presences never mutate the zone directly. Each update pushes
//! [`hostile_presence_core::Command`] values that the owner applies through
//! [`hostile_presence_zone::apply`].

mod config;
mod flock;
mod presence;
mod roster;
mod stack;
mod states;

pub use config::{LifecycleSettings, SearchSettings};
pub use flock::Flock;
pub use presence::{Presence, PresenceDependencies};
pub use roster::PresenceRoster;
pub use stack::{PushdownMachine, TickState, Transition};
pub use states::StateKind;
