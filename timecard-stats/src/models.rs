//! Time-block models
//!
//! Domain models for time tracking statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Where a session was worked.
///
/// Unrecognized tags are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationType {
    #[default]
    Office,
    HomeOffice,
    Mobile,
    Other(String),
}

impl LocationType {
    /// Label shown in reports; unknown tags are shown as-is
    pub fn label(&self) -> &str {
        match self {
            LocationType::Office => "Praxis",
            LocationType::HomeOffice => "Home Office",
            LocationType::Mobile => "Mobil",
            LocationType::Other(tag) => tag,
        }
    }

    /// Tag as stored in the record
    pub fn as_tag(&self) -> &str {
        match self {
            LocationType::Office => "office",
            LocationType::HomeOffice => "homeoffice",
            LocationType::Mobile => "mobile",
            LocationType::Other(tag) => tag,
        }
    }
}

impl From<String> for LocationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "office" => Self::Office,
            "homeoffice" => Self::HomeOffice,
            "mobile" => Self::Mobile,
            _ => Self::Other(tag),
        }
    }
}

impl From<LocationType> for String {
    fn from(location: LocationType) -> Self {
        match location {
            LocationType::Other(tag) => tag,
            known => known.as_tag().to_string(),
        }
    }
}

/// Lifecycle state of a recorded session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockStatus {
    Active,
    #[default]
    Completed,
    Cancelled,
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One recorded work session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub break_minutes: u32,
    /// Stored deviation from the planned hours; negative means under plan.
    #[serde(default, deserialize_with = "null_as_default")]
    pub overtime_minutes: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_type: LocationType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_stopped: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BlockStatus,
    #[serde(default)]
    pub planned_hours: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeBlock {
    /// Create a new open block starting at `start_time`
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        date: NaiveDate,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            date,
            start_time,
            end_time: None,
            break_minutes: 0,
            overtime_minutes: 0,
            location_type: LocationType::default(),
            auto_stopped: false,
            status: BlockStatus::default(),
            planned_hours: None,
            notes: None,
        }
    }

    /// Whether the session has been closed
    pub fn is_closed(&self) -> bool {
        self.end_time.is_some()
    }

    /// Net worked time in whole seconds.
    ///
    /// Open sessions yield 0. Breaks longer than the elapsed time and
    /// end times before the start clamp to 0 instead of going negative.
    pub fn worked_seconds(&self) -> i64 {
        match self.end_time {
            Some(end_time) => {
                let elapsed = end_time.signed_duration_since(self.start_time);
                let break_duration = chrono::Duration::minutes(i64::from(self.break_minutes));
                (elapsed - break_duration).num_seconds().max(0)
            }
            None => 0,
        }
    }

    /// Net worked minutes, floored
    pub fn worked_minutes(&self) -> i64 {
        self.worked_seconds() / 60
    }
}

/// Employee directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub team_ids: Vec<String>,
}

impl Employee {
    pub fn new(
        user_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            team_ids: Vec::new(),
        }
    }

    /// Add a team membership
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_ids.push(team_id.into());
        self
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Team directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn block_at(start: (u32, u32), end: Option<(u32, u32)>, break_minutes: u32) -> TimeBlock {
        let mut block = TimeBlock::new(
            "B1",
            "EMP001",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, start.0, start.1, 0).unwrap(),
        );
        block.end_time = end.map(|(h, m)| Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap());
        block.break_minutes = break_minutes;
        block
    }

    #[test]
    fn test_worked_minutes_calculation() {
        let block = block_at((9, 0), Some((17, 0)), 30);
        assert_eq!(block.worked_minutes(), 450);
        assert_eq!(block.worked_seconds(), 450 * 60);
    }

    #[test]
    fn test_worked_minutes_open_session() {
        let block = block_at((9, 0), None, 0);
        assert!(!block.is_closed());
        assert_eq!(block.worked_minutes(), 0);
    }

    #[test]
    fn test_break_longer_than_session_clamps_to_zero() {
        let block = block_at((9, 0), Some((9, 20)), 45);
        assert_eq!(block.worked_seconds(), 0);
    }

    #[test]
    fn test_end_before_start_clamps_to_zero() {
        let block = block_at((17, 0), Some((9, 0)), 0);
        assert_eq!(block.worked_minutes(), 0);
    }

    #[test]
    fn test_sub_minute_precision_is_kept_in_seconds() {
        let mut block = block_at((9, 0), None, 0);
        block.end_time = Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 10, 45).unwrap());
        assert_eq!(block.worked_seconds(), 645);
        assert_eq!(block.worked_minutes(), 10);
    }

    #[test]
    fn test_deserialize_block_defaults() {
        let json = r#"{
            "id": "b-1",
            "user_id": "u-1",
            "date": "2024-01-15",
            "start_time": "2024-01-15T08:00:00Z",
            "location_type": "homeoffice"
        }"#;
        let block: TimeBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.location_type, LocationType::HomeOffice);
        assert_eq!(block.status, BlockStatus::Completed);
        assert_eq!(block.break_minutes, 0);
        assert!(block.end_time.is_none());
    }

    #[test]
    fn test_deserialize_null_numbers_as_zero() {
        let json = r#"{
            "id": "b-2",
            "user_id": "u-1",
            "date": "2024-01-15",
            "start_time": "2024-01-15T08:00:00Z",
            "end_time": "2024-01-15T09:00:00Z",
            "break_minutes": null,
            "overtime_minutes": null,
            "location_type": null,
            "auto_stopped": null,
            "status": null
        }"#;
        let block: TimeBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.break_minutes, 0);
        assert_eq!(block.overtime_minutes, 0);
        assert_eq!(block.location_type, LocationType::Office);
        assert_eq!(block.status, BlockStatus::Completed);
        assert_eq!(block.worked_minutes(), 60);
    }

    #[test]
    fn test_unknown_location_tag_is_kept() {
        let json = r#"{
            "id": "b-3",
            "user_id": "u-1",
            "date": "2024-01-15",
            "start_time": "2024-01-15T08:00:00Z",
            "location_type": "remote"
        }"#;
        let block: TimeBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.location_type, LocationType::Other("remote".into()));
        assert_eq!(block.location_type.label(), "remote");

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["location_type"], "remote");
    }

    #[test]
    fn test_location_labels() {
        assert_eq!(LocationType::from("homeoffice".to_string()), LocationType::HomeOffice);
        assert_eq!(LocationType::HomeOffice.label(), "Home Office");
        assert_eq!(String::from(LocationType::Mobile), "mobile");
    }

    #[test]
    fn test_full_name() {
        let employee = Employee::new("u-1", "Anna", "Berg").with_team("t-1");
        assert_eq!(employee.full_name(), "Anna Berg");
        assert_eq!(employee.team_ids, vec!["t-1".to_string()]);
    }
}
