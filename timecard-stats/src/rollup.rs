//! Rollups
//!
//! Folds a filtered block list into per-employee, per-day, per-week and
//! per-team statistics. Each reducer is independent and order-insensitive.
//!
//! Worked time is accumulated in seconds and floored to minutes only when a
//! bucket is finalized. Presence counts (days worked, users worked, team
//! members) are distinct-id sets and only consider closed blocks.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::directory::{Directory, LookupDiagnostics};
use crate::filter::most_recent_first;
use crate::models::{BlockStatus, LocationType, TimeBlock};

/// Per-employee statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRollup {
    pub user_id: String,
    pub display_name: String,
    pub total_worked_seconds: i64,
    pub total_worked_minutes: i64,
    pub total_overtime_minutes: i64,
    pub days_worked: usize,
    pub average_worked_minutes_per_day: i64,
    /// Owned blocks, most recent first
    pub blocks: Vec<TimeBlock>,
}

/// Per-day statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRollup {
    pub date: NaiveDate,
    pub total_worked_seconds: i64,
    pub total_worked_minutes: i64,
    pub total_overtime_minutes: i64,
    pub users_worked: usize,
}

/// Per-week statistics, Monday through Sunday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRollup {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
    pub total_worked_seconds: i64,
    pub total_worked_minutes: i64,
    pub total_overtime_minutes: i64,
    pub days_worked: usize,
}

/// Per-team statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRollup {
    pub team_id: String,
    pub team_name: String,
    pub team_color: String,
    pub total_worked_seconds: i64,
    pub total_worked_minutes: i64,
    pub total_overtime_minutes: i64,
    pub member_count: usize,
}

/// Totals over the whole filtered set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_worked_seconds: i64,
    pub total_worked_minutes: i64,
    pub total_overtime_minutes: i64,
    pub work_days: usize,
    pub entries_count: usize,
    /// Home-office blocks (not distinct dates)
    pub home_office_days: usize,
    /// Blocks whose status is not `completed`
    pub plausibility_warnings: usize,
}

/// All rollups of one filtered set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollups {
    pub by_employee: Vec<EmployeeRollup>,
    pub by_day: Vec<DayRollup>,
    pub by_week: Vec<WeekRollup>,
    pub by_team: Vec<TeamRollup>,
    pub summary: StatsSummary,
    pub diagnostics: LookupDiagnostics,
}

/// Keyed accumulator shared by all reducers
struct Bucket<K> {
    worked_seconds: i64,
    overtime_minutes: i64,
    present: BTreeSet<K>,
}

impl<K: Ord> Bucket<K> {
    fn new() -> Self {
        Self {
            worked_seconds: 0,
            overtime_minutes: 0,
            present: BTreeSet::new(),
        }
    }

    fn add(&mut self, block: &TimeBlock, presence: K) {
        self.worked_seconds += block.worked_seconds();
        self.overtime_minutes += i64::from(block.overtime_minutes);
        if block.is_closed() {
            self.present.insert(presence);
        }
    }

    fn worked_minutes(&self) -> i64 {
        self.worked_seconds / 60
    }
}

/// Monday of the week containing `date`, clamped to `NaiveDate::MIN`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = Duration::days(i64::from(date.weekday().num_days_from_monday()));
    date.checked_sub_signed(offset).unwrap_or(NaiveDate::MIN)
}

/// Sunday of the week starting at `start`, clamped to `NaiveDate::MAX`
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MAX)
}

/// Group by owner, ordered by display name
pub fn by_employee(blocks: &[TimeBlock], directory: &Directory) -> Vec<EmployeeRollup> {
    let mut buckets: BTreeMap<&str, (Bucket<NaiveDate>, Vec<TimeBlock>)> = BTreeMap::new();
    for block in blocks {
        let (bucket, owned) = buckets
            .entry(block.user_id.as_str())
            .or_insert_with(|| (Bucket::new(), Vec::new()));
        bucket.add(block, block.date);
        owned.push(block.clone());
    }

    let mut rollups: Vec<EmployeeRollup> = buckets
        .into_iter()
        .map(|(user_id, (bucket, mut owned))| {
            owned.sort_by(most_recent_first);
            let days_worked = bucket.present.len();
            let average_worked_minutes_per_day = if days_worked > 0 {
                bucket.worked_seconds / days_worked as i64 / 60
            } else {
                0
            };
            EmployeeRollup {
                user_id: user_id.to_string(),
                display_name: directory
                    .full_name(user_id)
                    .unwrap_or_else(|| user_id.to_string()),
                total_worked_seconds: bucket.worked_seconds,
                total_worked_minutes: bucket.worked_minutes(),
                total_overtime_minutes: bucket.overtime_minutes,
                days_worked,
                average_worked_minutes_per_day,
                blocks: owned,
            }
        })
        .collect();

    rollups.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    rollups
}

/// Group by calendar day, most recent day first
pub fn by_day(blocks: &[TimeBlock]) -> Vec<DayRollup> {
    let mut buckets: BTreeMap<NaiveDate, Bucket<&str>> = BTreeMap::new();
    for block in blocks {
        buckets
            .entry(block.date)
            .or_insert_with(Bucket::new)
            .add(block, block.user_id.as_str());
    }

    buckets
        .into_iter()
        .rev()
        .map(|(date, bucket)| DayRollup {
            date,
            total_worked_seconds: bucket.worked_seconds,
            total_worked_minutes: bucket.worked_minutes(),
            total_overtime_minutes: bucket.overtime_minutes,
            users_worked: bucket.present.len(),
        })
        .collect()
}

/// Group by Monday-start week, most recent week first
pub fn by_week(blocks: &[TimeBlock]) -> Vec<WeekRollup> {
    let mut buckets: BTreeMap<NaiveDate, Bucket<NaiveDate>> = BTreeMap::new();
    for block in blocks {
        buckets
            .entry(week_start(block.date))
            .or_insert_with(Bucket::new)
            .add(block, block.date);
    }

    buckets
        .into_iter()
        .rev()
        .map(|(start, bucket)| {
            let iso = start.iso_week();
            WeekRollup {
                week_start: start,
                week_end: week_end(start),
                iso_year: iso.year(),
                iso_week: iso.week(),
                total_worked_seconds: bucket.worked_seconds,
                total_worked_minutes: bucket.worked_minutes(),
                total_overtime_minutes: bucket.overtime_minutes,
                days_worked: bucket.present.len(),
            }
        })
        .collect()
}

/// One row per directory team, ordered by team name.
///
/// A block counts in full toward every team its owner belongs to.
/// Blocks of unknown owners and memberships of unknown teams are skipped.
pub fn by_team(blocks: &[TimeBlock], directory: &Directory) -> Vec<TeamRollup> {
    let mut buckets: BTreeMap<&str, Bucket<&str>> = directory
        .teams()
        .iter()
        .map(|team| (team.id.as_str(), Bucket::new()))
        .collect();

    for block in blocks {
        let Some(owner) = directory.employee(&block.user_id) else {
            continue;
        };
        let mut seen = HashSet::new();
        for team_id in &owner.team_ids {
            if !seen.insert(team_id.as_str()) {
                continue;
            }
            if let Some(bucket) = buckets.get_mut(team_id.as_str()) {
                bucket.add(block, block.user_id.as_str());
            }
        }
    }

    let mut rollups: Vec<TeamRollup> = directory
        .teams()
        .iter()
        .map(|team| {
            let (worked_seconds, overtime_minutes, member_count) = buckets
                .get(team.id.as_str())
                .map(|b| (b.worked_seconds, b.overtime_minutes, b.present.len()))
                .unwrap_or_default();
            TeamRollup {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                team_color: team.color.clone(),
                total_worked_seconds: worked_seconds,
                total_worked_minutes: worked_seconds / 60,
                total_overtime_minutes: overtime_minutes,
                member_count,
            }
        })
        .collect();

    rollups.sort_by(|a, b| {
        a.team_name
            .to_lowercase()
            .cmp(&b.team_name.to_lowercase())
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    rollups
}

/// Totals over the whole set.
///
/// Status does not change any total; non-completed blocks are only
/// counted as plausibility warnings.
pub fn summarize(blocks: &[TimeBlock]) -> StatsSummary {
    let mut total: Bucket<NaiveDate> = Bucket::new();
    let mut home_office_days = 0;
    let mut plausibility_warnings = 0;
    for block in blocks {
        total.add(block, block.date);
        if block.location_type == LocationType::HomeOffice {
            home_office_days += 1;
        }
        if block.status != BlockStatus::Completed {
            plausibility_warnings += 1;
        }
    }

    StatsSummary {
        total_worked_seconds: total.worked_seconds,
        total_worked_minutes: total.worked_minutes(),
        total_overtime_minutes: total.overtime_minutes,
        work_days: total.present.len(),
        entries_count: blocks.len(),
        home_office_days,
        plausibility_warnings,
    }
}

/// Collect directory misses referenced by `blocks`
pub fn lookup_diagnostics(blocks: &[TimeBlock], directory: &Directory) -> LookupDiagnostics {
    let mut diagnostics = LookupDiagnostics::default();
    for block in blocks {
        match directory.employee(&block.user_id) {
            Some(owner) => {
                for team_id in &owner.team_ids {
                    if !directory.has_team(team_id) {
                        diagnostics.unknown_teams.insert(team_id.clone());
                    }
                }
            }
            None => {
                diagnostics.unknown_employees.insert(block.user_id.clone());
            }
        }
    }
    diagnostics
}

/// Compute every rollup for an already filtered block list
pub fn aggregate(blocks: &[TimeBlock], directory: &Directory) -> Rollups {
    let diagnostics = lookup_diagnostics(blocks, directory);
    if !diagnostics.is_empty() {
        tracing::warn!(
            unknown_employees = diagnostics.unknown_employees.len(),
            unknown_teams = diagnostics.unknown_teams.len(),
            "Directory lookup misses while aggregating time blocks"
        );
    }

    let rollups = Rollups {
        by_employee: by_employee(blocks, directory),
        by_day: by_day(blocks),
        by_week: by_week(blocks),
        by_team: by_team(blocks, directory),
        summary: summarize(blocks),
        diagnostics,
    };

    tracing::debug!(
        blocks = blocks.len(),
        employees = rollups.by_employee.len(),
        days = rollups.by_day.len(),
        weeks = rollups.by_week.len(),
        teams = rollups.by_team.len(),
        "Aggregated time blocks"
    );
    rollups
}
