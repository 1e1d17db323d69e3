//! Processing Pipeline Module
//!
//! ## Per-machine Processing
//!
//! ```text
//! Reading ──> validate ──> score ──> classify ──> MachineStateStore
//! ```
//!
//! Every machine gets its own worker task. Within a machine, readings are
//! handled strictly in arrival order and the store always reflects the most
//! recently processed one. Across machines there is no ordering and no
//! shared lock: a slow or silent machine never holds up the rest.
//!
//! Readings arrive either pushed through [`PipelineCoordinator::ingest`] or
//! pulled from a [`ReadingSource`] attached with
//! [`PipelineCoordinator::attach_source`].

mod coordinator;
pub mod processing_loop;
pub mod source;
mod state;

pub use coordinator::{PipelineCoordinator, PipelineError};
pub use processing_loop::{MachineWorker, WorkerExit};
pub use source::{ChannelSource, ReadingSource, SourceEvent, StdinSource};
pub use state::PipelineStats;
