// Market session alert system.
//
// Architecture:
// - model.rs: Zone roles, events and notification descriptors
// - catalog.rs: Validated, ordered table of session events
// - triggers.rs: Per-tick zone snapshot and exact-second matching
// - engine.rs: Scheduler that applies the daily fire state and dispatches

pub mod catalog;
pub mod engine;
pub mod model;
pub mod triggers;
