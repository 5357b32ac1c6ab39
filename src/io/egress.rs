//! Event egress - writes event payloads to file
//!
//! Payloads are written in JSONL format (one JSON object per line). Used by
//! the replay binary; the engine itself performs no I/O.

use crate::domain::event::RoiEvent;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};

/// Append-only JSONL sink for event payloads
pub struct EventLog {
    file_path: String,
}

impl EventLog {
    pub fn new(file_path: &str) -> Self {
        Self { file_path: file_path.to_string() }
    }

    /// Write one event's payload; returns true on success
    pub fn write_event(&self, event: &RoiEvent) -> bool {
        let json = match serde_json::to_string(&event.payload()) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "event_serialize_failed");
                return false;
            }
        };

        match self.append_line(&json) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    zone_id = %event.zone_id,
                    track_id = %event.track_id,
                    error = %e,
                    "event_egress_failed"
                );
                false
            }
        }
    }

    /// Write multiple events, returning how many succeeded
    pub fn write_events(&self, events: &[RoiEvent]) -> usize {
        events.iter().filter(|e| self.write_event(e)).count()
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let path = Path::new(&self.file_path);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        debug!(file = %self.file_path, bytes = %line.len(), "egress_written");
        Ok(())
    }
}
