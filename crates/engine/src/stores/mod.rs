//! In-memory state storage.
//!
//! - `StateStore` - the mirrored game state, its index and outbound propagation
//! - `RosterView` - numbered, read-only roster summaries

mod roster_view;
mod state_store;

pub use roster_view::{CharacterSummary, MonsterSummary, RosterView, StandeeSummary};
pub use state_store::{
    ConditionChange, MonsterAdjustment, Mutation, ReconcileOutcome, SequencingAnomaly,
    StaleIndexPolicy, StateStore, StoreError, StorePolicy, INITIAL_INDEX,
};
