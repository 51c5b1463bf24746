use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::{BlockFilter, Selection};

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Snapshot file to aggregate
    pub snapshot_path: PathBuf,

    /// Employee selector (`all` for everyone)
    pub employee: Selection,

    /// Team selector (`all` for every team)
    pub team: Selection,

    /// Free-text search over names and notes
    pub search: String,

    /// Pretty-print the JSON report
    pub pretty: bool,

    /// Service version
    pub version: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./snapshot.json"),
            employee: Selection::All,
            team: Selection::All,
            search: String::new(),
            pretty: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StatsConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("TIMECARD_SNAPSHOT_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }

        if let Ok(employee) = std::env::var("TIMECARD_EMPLOYEE") {
            config.employee = Selection::parse(&employee);
        }

        if let Ok(team) = std::env::var("TIMECARD_TEAM") {
            config.team = Selection::parse(&team);
        }

        if let Ok(search) = std::env::var("TIMECARD_SEARCH") {
            config.search = search;
        }

        if let Ok(pretty) = std::env::var("TIMECARD_PRETTY") {
            config.pretty = pretty.to_lowercase() == "true" || pretty == "1";
        }

        config
    }

    /// Filter criteria described by this configuration
    pub fn filter(&self) -> BlockFilter {
        BlockFilter {
            employee: self.employee.clone(),
            team: self.team.clone(),
            search: self.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StatsConfig::default();
        assert_eq!(config.snapshot_path, PathBuf::from("./snapshot.json"));
        assert_eq!(config.employee, Selection::All);
        assert!(!config.pretty);
        assert_eq!(config.filter(), BlockFilter::default());
    }
}
