// core/memory.rs

// Bounded trajectory log of telemetry records. Kept for the external plotter and saved as
// YAML once a run ends.

use log::info;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;

use super::api::Telemetry;
use super::state::ActionState;
use crate::BcfError;

/// Most recent telemetry records, oldest evicted first
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "StoredTrajectory")]
pub struct TrajectoryLog {
    capacity: usize,
    records: VecDeque<Telemetry>,
}

/// On-disk layout, replayed through `record` so a loaded log keeps its bound
#[derive(Deserialize)]
struct StoredTrajectory {
    capacity: usize,
    records: Vec<Telemetry>,
}

impl From<StoredTrajectory> for TrajectoryLog {
    fn from(stored: StoredTrajectory) -> Self {
        let mut log = TrajectoryLog::new(stored.capacity);
        for telemetry in stored.records {
            log.record(telemetry);
        }
        log
    }
}

impl TrajectoryLog {
    /// Log holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        TrajectoryLog {
            capacity: capacity.max(1),
            records: VecDeque::with_capacity(capacity.clamp(1, 1024)),
        }
    }

    /// Appends a record, dropping the oldest when full.
    pub fn record(&mut self, telemetry: Telemetry) {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(telemetry);
    }

    /// Records, oldest first.
    pub fn records(&self) -> &VecDeque<Telemetry> {
        &self.records
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before the first record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&Telemetry> {
        self.records.back()
    }

    /// Number of logged ticks with the given label.
    pub fn count(&self, action: ActionState) -> usize {
        self.records.iter().filter(|t| t.action() == action).count()
    }

    /// Serializes the log to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), BcfError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        info!("Saved {} telemetry records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Loads a log written by [`TrajectoryLog::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BcfError> {
        let file = File::open(path.as_ref())?;
        Ok(serde_yaml::from_reader(file)?)
    }
}
