//! Consumer API
//!
//! Read-only view of the machine state store for dashboards and alerting.
//! Queries never block pipeline workers beyond a shard read lock and have no
//! side effects.

use serde::Serialize;
use std::sync::Arc;

use crate::storage::MachineStateStore;
use crate::types::{HealthStatus, MachineId, ScoredReading};

/// Fleet-wide status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub normal: usize,
    pub warning: usize,
    pub critical: usize,
}

impl FleetSummary {
    /// Worst status in the fleet, `None` for an empty fleet.
    pub fn worst(&self) -> Option<HealthStatus> {
        if self.critical > 0 {
            Some(HealthStatus::Critical)
        } else if self.warning > 0 {
            Some(HealthStatus::Warning)
        } else if self.normal > 0 {
            Some(HealthStatus::Normal)
        } else {
            None
        }
    }

    fn count(&mut self, status: HealthStatus) {
        self.total += 1;
        match status {
            HealthStatus::Normal => self.normal += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
        }
    }
}

/// Cloneable read handle on the pipeline's machine state.
#[derive(Clone)]
pub struct FleetView {
    store: Arc<MachineStateStore>,
}

impl FleetView {
    pub fn new(store: Arc<MachineStateStore>) -> Self {
        Self { store }
    }

    /// Latest state of one machine; `None` means no reading has arrived yet.
    pub fn get(&self, machine_id: &MachineId) -> Option<Arc<ScoredReading>> {
        self.store.get(machine_id)
    }

    /// Every known machine with its latest state, in first-seen order.
    pub fn snapshot(&self) -> Vec<(MachineId, Arc<ScoredReading>)> {
        self.store.snapshot()
    }

    pub fn summary(&self) -> FleetSummary {
        let mut summary = FleetSummary::default();
        for (_, scored) in self.store.snapshot() {
            summary.count(scored.status);
        }
        summary
    }

    /// Machines currently CRITICAL, in first-seen order.
    pub fn critical(&self) -> Vec<(MachineId, Arc<ScoredReading>)> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|(_, scored)| scored.status == HealthStatus::Critical)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reading;

    fn put(store: &MachineStateStore, id: &str, status: HealthStatus) {
        store.upsert(
            MachineId::from(id),
            ScoredReading {
                reading: Reading::now(id, 70.0, 20.0, 1.0, 100.0, 80.0),
                efficiency: 70.0,
                status,
            },
        );
    }

    #[test]
    fn test_empty_fleet_summary() {
        let view = FleetView::new(Arc::new(MachineStateStore::new()));
        assert_eq!(view.summary(), FleetSummary::default());
        assert_eq!(view.summary().worst(), None);
    }

    #[test]
    fn test_summary_counts_and_critical_list() {
        let store = Arc::new(MachineStateStore::new());
        put(&store, "M1", HealthStatus::Normal);
        put(&store, "M2", HealthStatus::Critical);
        put(&store, "M3", HealthStatus::Warning);
        put(&store, "M4", HealthStatus::Critical);

        let view = FleetView::new(Arc::clone(&store));
        let summary = view.summary();
        assert_eq!(
            summary,
            FleetSummary {
                total: 4,
                normal: 1,
                warning: 1,
                critical: 2
            }
        );
        assert_eq!(summary.worst(), Some(HealthStatus::Critical));

        let critical: Vec<String> = view.critical().into_iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(critical, vec!["M2", "M4"]);
    }
}
