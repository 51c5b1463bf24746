//! Employee and team directory
//!
//! Lookup tables built once per computation. Misses are tolerated:
//! callers record them in [`LookupDiagnostics`] and carry on.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{Employee, Team};

/// Directory misses observed during one computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupDiagnostics {
    /// Owner ids referenced by blocks but absent from the employee directory
    pub unknown_employees: BTreeSet<String>,
    /// Team ids referenced by employees but absent from the team directory
    pub unknown_teams: BTreeSet<String>,
}

impl LookupDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.unknown_employees.is_empty() && self.unknown_teams.is_empty()
    }

    /// Total number of distinct missing ids
    pub fn miss_count(&self) -> usize {
        self.unknown_employees.len() + self.unknown_teams.len()
    }
}

/// Employee and team lookup
#[derive(Debug, Clone, Default)]
pub struct Directory {
    employees: HashMap<String, Employee>,
    teams: Vec<Team>,
}

impl Directory {
    /// Build a directory. Later duplicates of an id are ignored.
    pub fn new(employees: &[Employee], teams: &[Team]) -> Self {
        let mut by_id = HashMap::with_capacity(employees.len());
        for employee in employees {
            by_id
                .entry(employee.user_id.clone())
                .or_insert_with(|| employee.clone());
        }

        let mut seen = BTreeSet::new();
        let teams = teams
            .iter()
            .filter(|team| seen.insert(team.id.clone()))
            .cloned()
            .collect();

        Self {
            employees: by_id,
            teams,
        }
    }

    pub fn employee(&self, user_id: &str) -> Option<&Employee> {
        self.employees.get(user_id)
    }

    /// Teams in directory order
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn has_team(&self, team_id: &str) -> bool {
        self.teams.iter().any(|team| team.id == team_id)
    }

    /// Full name of the owner, or `None` when the owner is unknown
    pub fn full_name(&self, user_id: &str) -> Option<String> {
        self.employee(user_id).map(Employee::full_name)
    }

    /// Whether `user_id` is a member of `team_id`.
    /// Unknown owners belong to no team.
    pub fn is_member(&self, user_id: &str, team_id: &str) -> bool {
        self.employee(user_id)
            .map(|employee| employee.team_ids.iter().any(|id| id == team_id))
            .unwrap_or(false)
    }
}
