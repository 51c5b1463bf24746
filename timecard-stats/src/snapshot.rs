//! Record snapshots
//!
//! The immutable input of one computation, as delivered by the
//! record-fetching layer.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::Directory;
use crate::models::{Employee, Team, TimeBlock};

/// Snapshot loading errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Time blocks plus the employee and team directories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub time_blocks: Vec<TimeBlock>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Snapshot {
    pub fn new(time_blocks: Vec<TimeBlock>, employees: Vec<Employee>, teams: Vec<Team>) -> Self {
        Self {
            time_blocks,
            employees,
            teams,
        }
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let snapshot = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            blocks = snapshot.time_blocks.len(),
            employees = snapshot.employees.len(),
            teams = snapshot.teams.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Lookup tables for this snapshot
    pub fn directory(&self) -> Directory {
        Directory::new(&self.employees, &self.teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot() {
        let json = r##"{
            "time_blocks": [{
                "id": "b-1",
                "user_id": "u-1",
                "date": "2024-01-15",
                "start_time": "2024-01-15T09:00:00+01:00",
                "end_time": "2024-01-15T17:00:00+01:00",
                "break_minutes": 30,
                "overtime_minutes": -15,
                "location_type": "office",
                "auto_stopped": true,
                "notes": "Inventur"
            }],
            "employees": [
                {"user_id": "u-1", "first_name": "Anna", "last_name": "Berg", "team_ids": ["t-1"]}
            ],
            "teams": [{"id": "t-1", "name": "Empfang", "color": "#ff0000"}]
        }"##;
        let snapshot = Snapshot::from_json_str(json).unwrap();
        assert_eq!(snapshot.time_blocks.len(), 1);
        assert_eq!(snapshot.time_blocks[0].worked_minutes(), 450);
        assert!(snapshot.time_blocks[0].auto_stopped);
        assert!(snapshot.directory().is_member("u-1", "t-1"));
    }

    #[test]
    fn test_lenient_fields_keep_whole_snapshot() {
        let json = r#"{
            "time_blocks": [
                {"id": "b-1", "user_id": "u-1", "date": "2024-01-15",
                 "start_time": "2024-01-15T08:00:00Z", "end_time": "2024-01-15T12:00:00Z",
                 "location_type": "office"},
                {"id": "b-2", "user_id": "u-1", "date": "2024-01-16",
                 "start_time": "2024-01-16T08:00:00Z", "end_time": "2024-01-16T10:00:00Z",
                 "location_type": "remote", "break_minutes": null, "overtime_minutes": null}
            ]
        }"#;
        let snapshot = Snapshot::from_json_str(json).unwrap();
        assert_eq!(snapshot.time_blocks.len(), 2);
        assert_eq!(snapshot.time_blocks[1].location_type.label(), "remote");
        assert_eq!(snapshot.time_blocks[1].worked_minutes(), 120);
    }

    #[test]
    fn test_invalid_json() {
        let result = Snapshot::from_json_str("{\"time_blocks\": 3}");
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Snapshot::from_path("/nonexistent/snapshot.json");
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }
}
