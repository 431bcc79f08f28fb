#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Escalation data and the probabilistic selection of flocks per growth level.
//!
//! The [`EscalationTable`] is loaded once from an [`EscalationSource`] and is
//! immutable afterwards; presences share it through an `Arc`. The
//! [`EscalationSelector`] rolls each record of a requested level independently
//! against an injected [`hostile_presence_core::RandomSource`].

mod selector;
mod source;
mod table;

pub use selector::{EscalatingFlockSelector, EscalationSelector};
pub use source::{
    EscalationLoadError, EscalationSource, JsonEscalationSource, StaticEscalationSource,
    TomlEscalationSource,
};
pub use table::EscalationTable;
