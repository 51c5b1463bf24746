//! Filter stage
//!
//! Narrows a block snapshot by employee, team and free-text search.
//! All active criteria must match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::directory::Directory;
use crate::models::TimeBlock;

/// Selector value meaning "no restriction"
pub const ALL: &str = "all";

/// An "all or one id" selector.
///
/// Serialized as a plain string: `"all"` or the selected id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parse a selector; empty and `all` mean no restriction
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(id) => Some(id),
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::All => ALL.to_string(),
            Selection::Only(id) => id,
        }
    }
}

/// Filter criteria for one computation
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockFilter {
    #[serde(default)]
    pub employee: Selection,
    #[serde(default)]
    pub team: Selection,
    #[serde(default)]
    pub search: String,
}

impl BlockFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employee(mut self, user_id: impl Into<String>) -> Self {
        self.employee = Selection::Only(user_id.into());
        self
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team = Selection::Only(team_id.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Whether a single block passes every active criterion
    pub fn matches(&self, block: &TimeBlock, directory: &Directory) -> bool {
        if let Some(user_id) = self.employee.as_id() {
            if block.user_id != user_id {
                return false;
            }
        }

        if let Some(team_id) = self.team.as_id() {
            if !directory.is_member(&block.user_id, team_id) {
                return false;
            }
        }

        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let name = directory.full_name(&block.user_id).unwrap_or_default();
            let notes = block.notes.as_deref().unwrap_or_default();
            if !name.to_lowercase().contains(&needle) && !notes.to_lowercase().contains(&needle) {
                return false;
            }
        }

        true
    }
}

/// Most recent first: date descending, then start time descending.
/// Ties fall back to the block id so the order is total.
pub fn most_recent_first(a: &TimeBlock, b: &TimeBlock) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.start_time.cmp(&a.start_time))
        .then_with(|| a.id.cmp(&b.id))
}

/// Return the matching blocks, most recent first. The input is not touched.
pub fn filter_blocks(
    blocks: &[TimeBlock],
    directory: &Directory,
    filter: &BlockFilter,
) -> Vec<TimeBlock> {
    let mut matched: Vec<TimeBlock> = blocks
        .iter()
        .filter(|block| filter.matches(block, directory))
        .cloned()
        .collect();
    matched.sort_by(most_recent_first);

    tracing::debug!(
        total = blocks.len(),
        matched = matched.len(),
        "Filtered time blocks"
    );
    matched
}
