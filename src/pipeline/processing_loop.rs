//! Per-machine processing loop.
//!
//! One [`MachineWorker`] runs for each machine: it waits for the machine's
//! next reading, scores and classifies it, and writes the result to the
//! state store. Workers share nothing mutable except the store, so a stalled
//! feed or a rejected reading on one machine never delays another.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::source::{ReadingSource, SourceEvent};
use super::state::PipelineCounters;
use crate::acquisition::{validate_reading, ReadingError};
use crate::config::FactoryConfig;
use crate::processing;
use crate::storage::MachineStateStore;
use crate::types::{HealthStatus, MachineId, Reading, ScoredReading};

/// Why a worker loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The machine was stopped or the pipeline dropped
    Cancelled,
    /// The source reported end of data (closed channel, EOF)
    SourceExhausted,
    /// The source returned an unrecoverable error
    SourceFailed,
}

/// Scoring loop for a single machine.
pub struct MachineWorker {
    machine_id: MachineId,
    config: Arc<FactoryConfig>,
    store: Arc<MachineStateStore>,
    counters: Arc<PipelineCounters>,
    cancel_token: CancellationToken,
    last_status: Option<HealthStatus>,
}

impl MachineWorker {
    pub(crate) fn new(
        machine_id: MachineId,
        config: Arc<FactoryConfig>,
        store: Arc<MachineStateStore>,
        counters: Arc<PipelineCounters>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            machine_id,
            config,
            store,
            counters,
            cancel_token,
            last_status: None,
        }
    }

    /// Run until the source is exhausted or the worker is cancelled.
    ///
    /// Cancellation is checked before every receive, so a stopped worker
    /// takes no further readings from its source. A reading that has already
    /// been received is always scored and stored.
    pub async fn run<S: ReadingSource>(mut self, mut source: S) -> WorkerExit {
        info!(
            machine_id = %self.machine_id,
            source = source.source_name(),
            "[MachineWorker] Started"
        );

        let mut processed = 0u64;
        let mut discarded = 0u64;

        let exit = loop {
            // Cancellation wins over queued readings
            let event = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => break WorkerExit::Cancelled,
                result = source.next_reading() => match result {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(machine_id = %self.machine_id, error = %e, "[MachineWorker] Source error");
                        break WorkerExit::SourceFailed;
                    }
                },
            };

            let reading = match event {
                SourceEvent::Reading(reading) => reading,
                SourceEvent::Eof => break WorkerExit::SourceExhausted,
            };

            match self.process(reading) {
                Ok(_) => processed += 1,
                Err(e) => {
                    discarded += 1;
                    warn!(machine_id = %self.machine_id, error = %e, "[MachineWorker] Reading discarded, keeping previous state");
                }
            }
        };

        info!(
            machine_id = %self.machine_id,
            processed,
            discarded,
            exit = ?exit,
            "[MachineWorker] Stopped"
        );
        exit
    }

    /// Validate, score, classify and store one reading.
    ///
    /// A rejected reading leaves the stored state untouched.
    pub(crate) fn process(&mut self, reading: Reading) -> Result<HealthStatus, ReadingError> {
        let outcome = self.evaluate(reading);
        match &outcome {
            Ok(scored) => {
                self.counters.record_processed();
                let status = scored.status;
                self.note_transition(status, scored);
                self.store.upsert(self.machine_id.clone(), scored.clone());
            }
            Err(_) => self.counters.record_discarded(),
        }
        outcome.map(|scored| scored.status)
    }

    fn evaluate(&self, reading: Reading) -> Result<ScoredReading, ReadingError> {
        if reading.machine_id != self.machine_id {
            return Err(ReadingError::MachineMismatch {
                expected: self.machine_id.clone(),
                actual: reading.machine_id,
            });
        }
        validate_reading(&reading)?;

        let scored = processing::evaluate(reading, &self.config.scoring, &self.config.limits);
        debug!(
            machine_id = %self.machine_id,
            efficiency = scored.efficiency,
            status = %scored.status,
            "Reading scored"
        );
        Ok(scored)
    }

    fn note_transition(&mut self, status: HealthStatus, scored: &ScoredReading) {
        let previous = self.last_status.replace(status);
        if previous == Some(status) {
            return;
        }
        if status == HealthStatus::Critical {
            let trigger = processing::critical_trigger(
                &scored.reading,
                scored.efficiency,
                &self.config.limits,
                self.config.scoring.vibration_mode,
            );
            warn!(
                machine_id = %self.machine_id,
                efficiency = scored.efficiency,
                trigger = trigger.unwrap_or("unknown"),
                "Machine is CRITICAL"
            );
        } else {
            info!(
                machine_id = %self.machine_id,
                efficiency = scored.efficiency,
                from = previous.map_or("none", |s| s.as_str()),
                to = %status,
                "Machine status changed"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::source::ChannelSource;

    fn worker(store: &Arc<MachineStateStore>, counters: &Arc<PipelineCounters>) -> MachineWorker {
        MachineWorker::new(
            MachineId::from("M1"),
            Arc::new(FactoryConfig::default()),
            Arc::clone(store),
            Arc::clone(counters),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_invalid_reading_keeps_previous_state() {
        let store = Arc::new(MachineStateStore::new());
        let counters = Arc::new(PipelineCounters::default());
        let mut w = worker(&store, &counters);

        let status = w.process(Reading::now("M1", 72.0, 20.0, 1.0, 100.0, 80.0)).unwrap();
        assert_eq!(status, HealthStatus::Warning);
        let before = store.get(&MachineId::from("M1")).unwrap();

        let err = w
            .process(Reading::now("M1", f64::NAN, 20.0, 1.0, 100.0, 80.0))
            .unwrap_err();
        assert!(matches!(err, ReadingError::NonFinite { field: "temperature", .. }));
        assert_eq!(store.get(&MachineId::from("M1")).unwrap(), before);
        assert_eq!(counters.processed(), 1);
        assert_eq!(counters.discarded(), 1);
    }

    #[test]
    fn test_foreign_machine_reading_rejected() {
        let store = Arc::new(MachineStateStore::new());
        let counters = Arc::new(PipelineCounters::default());
        let mut w = worker(&store, &counters);

        let err = w
            .process(Reading::now("M2", 70.0, 20.0, 1.0, 100.0, 80.0))
            .unwrap_err();
        assert!(matches!(err, ReadingError::MachineMismatch { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_channel_in_order() {
        let store = Arc::new(MachineStateStore::new());
        let counters = Arc::new(PipelineCounters::default());
        let (tx, source) = ChannelSource::channel(8);
        for output in [90.0, 85.0, 50.0] {
            tx.send(Reading::now("M1", 70.0, 10.0, 1.0, 100.0, output))
                .await
                .unwrap();
        }
        drop(tx);

        let exit = worker(&store, &counters).run(source).await;
        assert_eq!(exit, WorkerExit::SourceExhausted);
        let latest = store.get(&MachineId::from("M1")).unwrap();
        assert_eq!(latest.reading.output, 50.0);
        assert_eq!(latest.status, HealthStatus::Critical);
        assert_eq!(counters.processed(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_worker_ignores_queued_readings() {
        let store = Arc::new(MachineStateStore::new());
        let counters = Arc::new(PipelineCounters::default());
        let (tx, source) = ChannelSource::channel(8);
        for output in [90.0, 85.0, 50.0] {
            tx.send(Reading::now("M1", 70.0, 10.0, 1.0, 100.0, output))
                .await
                .unwrap();
        }
        let w = worker(&store, &counters);
        w.cancel_token.cancel();

        assert_eq!(w.run(source).await, WorkerExit::Cancelled);
        assert_eq!(counters.processed(), 0);
        assert!(store.is_empty());
    }
}
