//! In-memory machine state storage
//!
//! Holds the latest scored reading per machine. No history is retained and
//! nothing is persisted; a restart starts from an empty fleet.

mod machine_state;

pub use machine_state::MachineStateStore;
