//! Pipeline Coordinator
//!
//! Owns one processing loop per machine and routes readings to them:
//!
//! ```text
//! ingest(reading) ──> per-machine queue ──> MachineWorker ──┐
//! attach_source(id, source) ───────────────> MachineWorker ──┼──> MachineStateStore ──> FleetView
//!                                                            ┘
//! ```
//!
//! A machine's worker is created on its first `ingest` (or `attach_source`).
//! Readings for one machine are processed in arrival order; different
//! machines are processed concurrently and independently.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::processing_loop::MachineWorker;
use super::source::{ChannelSource, ReadingSource, SourceEvent};
use super::state::{PipelineCounters, PipelineStats};
use crate::api::FleetView;
use crate::config::{ConfigError, FactoryConfig};
use crate::storage::MachineStateStore;
use crate::types::{MachineId, Reading};

/// Errors from pipeline lifecycle and routing operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("machine {0} has been stopped")]
    MachineStopped(MachineId),

    #[error("machine {0} already has a running processing loop")]
    AlreadyRunning(MachineId),

    #[error("machine {0} is fed by an attached source, not by ingest")]
    SourceAttached(MachineId),

    #[error("pipeline is shut down")]
    ShutDown,
}

/// How a machine's worker receives readings.
enum Feed {
    /// Push queue filled by `ingest`
    Channel(mpsc::Sender<Reading>),
    /// Worker owns its source
    Attached,
    /// Stopped; the stored state stays queryable
    Stopped,
}

struct MachineHandle {
    feed: Feed,
    cancel: CancellationToken,
}

/// Runs and routes the per-machine processing loops.
pub struct PipelineCoordinator {
    config: Arc<FactoryConfig>,
    store: Arc<MachineStateStore>,
    counters: Arc<PipelineCounters>,
    machines: DashMap<MachineId, MachineHandle>,
    tracker: TaskTracker,
    /// Parent of every machine token; cancelled on drop
    root_token: CancellationToken,
}

impl PipelineCoordinator {
    /// Validate the configuration and create an empty pipeline.
    ///
    /// Nothing is spawned until the first reading or source arrives.
    pub fn start(config: FactoryConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        info!(
            plant = %config.plant.name,
            profile = config.plant.profile.display_name(),
            vibration_mode = %config.scoring.vibration_mode,
            channel_capacity = config.pipeline.channel_capacity,
            "[Pipeline] Started"
        );
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(MachineStateStore::new()),
            counters: Arc::new(PipelineCounters::default()),
            machines: DashMap::new(),
            tracker: TaskTracker::new(),
            root_token: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Queue a reading for its machine, starting the machine's worker on
    /// first sight.
    ///
    /// Waits while the machine's queue is full, which applies backpressure to
    /// the producer of that machine only. Validation happens in the worker;
    /// an invalid reading is accepted here and discarded there.
    pub async fn ingest(&self, reading: Reading) -> Result<(), PipelineError> {
        let machine_id = reading.machine_id.clone();
        // The map guard must be released before awaiting on the queue
        let sender = {
            let entry = self.machines.entry(machine_id.clone());
            // Checked under the shard guard: shutdown closes the tracker before
            // walking the map, so an entry inserted here is either seen by the
            // walk or refused
            if self.tracker.is_closed() {
                return Err(PipelineError::ShutDown);
            }
            let handle = match entry {
                Entry::Occupied(entry) => entry.into_ref(),
                Entry::Vacant(entry) => {
                    let (sender, source) = ChannelSource::channel(self.config.pipeline.channel_capacity);
                    let cancel = self.spawn_worker(machine_id.clone(), source);
                    entry.insert(MachineHandle {
                        feed: Feed::Channel(sender),
                        cancel,
                    })
                }
            };
            match &handle.feed {
                Feed::Channel(sender) => sender.clone(),
                Feed::Attached => return Err(PipelineError::SourceAttached(machine_id)),
                Feed::Stopped => return Err(PipelineError::MachineStopped(machine_id)),
            }
        };

        sender
            .send(reading)
            .await
            .map_err(|_| PipelineError::MachineStopped(machine_id))
    }

    /// Pump a multi-machine source (e.g. stdin) into `ingest` until the source
    /// ends or `cancel` fires. Returns the number of readings accepted.
    ///
    /// One machine's full queue pauses the pump for every machine behind it;
    /// cancellation is still observed during that wait.
    pub async fn ingest_from<S: ReadingSource>(
        &self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> anyhow::Result<u64> {
        let mut accepted = 0u64;
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = source.next_reading() => event?,
            };
            let reading = match event {
                SourceEvent::Reading(reading) => reading,
                SourceEvent::Eof => break,
            };
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.ingest(reading) => result,
            };
            match result {
                Ok(()) => accepted += 1,
                Err(PipelineError::ShutDown) => break,
                Err(e) => warn!(source = source.source_name(), error = %e, "[Pipeline] Reading not accepted"),
            }
        }
        Ok(accepted)
    }

    /// Run a machine's processing loop on its own pull source.
    ///
    /// A stopped machine may be re-attached; a running one may not.
    pub fn attach_source<S: ReadingSource>(
        &self,
        machine_id: MachineId,
        source: S,
    ) -> Result<(), PipelineError> {
        let entry = self.machines.entry(machine_id.clone());
        if self.tracker.is_closed() {
            return Err(PipelineError::ShutDown);
        }

        match entry {
            Entry::Occupied(mut entry) => {
                if !matches!(entry.get().feed, Feed::Stopped) {
                    return Err(PipelineError::AlreadyRunning(machine_id));
                }
                let cancel = self.spawn_worker(machine_id, source);
                entry.insert(MachineHandle {
                    feed: Feed::Attached,
                    cancel,
                });
            }
            Entry::Vacant(entry) => {
                let cancel = self.spawn_worker(machine_id, source);
                entry.insert(MachineHandle {
                    feed: Feed::Attached,
                    cancel,
                });
            }
        }
        Ok(())
    }

    /// Stop one machine's processing loop without affecting the others.
    ///
    /// Queued readings not yet processed are dropped. The last stored state
    /// remains visible to consumers. Returns `false` if the machine was
    /// unknown or already stopped.
    pub fn stop_machine(&self, machine_id: &MachineId) -> bool {
        let Some(mut handle) = self.machines.get_mut(machine_id) else {
            return false;
        };
        if matches!(handle.feed, Feed::Stopped) {
            return false;
        }
        handle.feed = Feed::Stopped;
        handle.cancel.cancel();
        info!(machine_id = %machine_id, "[Pipeline] Machine stopped");
        true
    }

    /// Stop accepting work and wait for every worker to finish.
    ///
    /// Push-fed machines drain the readings already queued; machines with an
    /// attached source are cancelled. Safe to call more than once, and safe to
    /// race with `ingest` / `attach_source`: the tracker is closed before the
    /// map walk takes each shard lock.
    pub async fn shutdown(&self) -> PipelineStats {
        self.tracker.close();

        for mut handle in self.machines.iter_mut() {
            match std::mem::replace(&mut handle.feed, Feed::Stopped) {
                // Dropping the last sender lets the worker drain then see Eof
                Feed::Channel(sender) => drop(sender),
                Feed::Attached => handle.cancel.cancel(),
                Feed::Stopped => {}
            }
        }

        debug!(workers = self.tracker.len(), "[Pipeline] Waiting for workers");
        self.tracker.wait().await;

        let stats = self.stats();
        info!(%stats, "[Pipeline] Shut down");
        stats
    }

    /// Read-only consumer handle on machine state.
    pub fn view(&self) -> FleetView {
        FleetView::new(Arc::clone(&self.store))
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            readings_processed: self.counters.processed(),
            readings_discarded: self.counters.discarded(),
            known_machines: self.store.len(),
            running_workers: self.tracker.len(),
        }
    }

    fn spawn_worker<S: ReadingSource>(&self, machine_id: MachineId, source: S) -> CancellationToken {
        let cancel = self.root_token.child_token();
        let worker = MachineWorker::new(
            machine_id.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.store),
            Arc::clone(&self.counters),
            cancel.clone(),
        );
        self.tracker.spawn(async move {
            let exit = worker.run(source).await;
            debug!(machine_id = %machine_id, ?exit, "Worker task finished");
        });
        cancel
    }
}

impl Drop for PipelineCoordinator {
    fn drop(&mut self) {
        if !self.tracker.is_closed() && !self.tracker.is_empty() {
            warn!(
                workers = self.tracker.len(),
                "[Pipeline] Dropped without shutdown, cancelling workers"
            );
        }
        self.root_token.cancel();
    }
}
