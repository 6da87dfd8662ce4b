//! SQLite-backed analytics projections.
//!
//! # Invariants
//! - Per-project reports list projects in creation order and skip projects
//!   contributing nothing.
//! - Completion buckets are UTC calendar dates in ascending order.

use crate::analytics::{AnalyticsError, AnalyticsResult, CompletionRange};
use crate::model::project::ProjectId;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use log::debug;
use rusqlite::{Connection, Row};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Completed vs pending task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub completed: i64,
    pub pending: i64,
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskCount {
    pub project_id: ProjectId,
    pub project_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHours {
    pub project_id: ProjectId,
    pub project_name: String,
    /// Summed `time_spent` in hours, rounded to two decimals.
    pub hours: f64,
}

/// Completed tasks bucketed by the UTC date of their last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPoint {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub total_projects: i64,
}

pub fn tasks_by_status(conn: &Connection) -> AnalyticsResult<StatusBreakdown> {
    let (completed, total) = completed_and_total(conn, "tasks")?;
    Ok(StatusBreakdown {
        completed,
        pending: total - completed,
    })
}

pub fn tasks_by_priority(conn: &Connection) -> AnalyticsResult<PriorityBreakdown> {
    let mut breakdown = PriorityBreakdown {
        low: 0,
        medium: 0,
        high: 0,
    };
    let mut stmt = conn.prepare("SELECT priority, COUNT(*) FROM tasks GROUP BY priority;")?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let priority: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        match priority.as_str() {
            "low" => breakdown.low = count,
            "medium" => breakdown.medium = count,
            "high" => breakdown.high = count,
            other => {
                return Err(AnalyticsError::InvalidData(format!(
                    "invalid priority `{other}`"
                )))
            }
        }
    }
    Ok(breakdown)
}

/// Task count per project; projects without tasks are omitted.
pub fn tasks_by_project(conn: &Connection) -> AnalyticsResult<Vec<ProjectTaskCount>> {
    let mut stmt = conn.prepare(
        "SELECT projects.id AS id, projects.name AS name, COUNT(tasks.id) AS value
         FROM projects
         JOIN tasks ON tasks.project_id = projects.id
         GROUP BY projects.id
         ORDER BY projects.created_at ASC, projects.rowid ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut counts = Vec::new();
    while let Some(row) = rows.next()? {
        let (project_id, project_name) = parse_project_columns(row)?;
        counts.push(ProjectTaskCount {
            project_id,
            project_name,
            count: row.get("value")?,
        });
    }
    Ok(counts)
}

/// Tracked hours per project; projects with zero total time are omitted.
pub fn time_by_project(conn: &Connection) -> AnalyticsResult<Vec<ProjectHours>> {
    let mut stmt = conn.prepare(
        "SELECT projects.id AS id, projects.name AS name, SUM(tasks.time_spent) AS value
         FROM projects
         JOIN tasks ON tasks.project_id = projects.id
         GROUP BY projects.id
         HAVING SUM(tasks.time_spent) > 0
         ORDER BY projects.created_at ASC, projects.rowid ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut hours = Vec::new();
    while let Some(row) = rows.next()? {
        let (project_id, project_name) = parse_project_columns(row)?;
        let seconds: i64 = row.get("value")?;
        hours.push(ProjectHours {
            project_id,
            project_name,
            hours: seconds_to_hours(seconds),
        });
    }
    Ok(hours)
}

/// Completed vs pending checklist items across all tasks.
pub fn checklist_progress(conn: &Connection) -> AnalyticsResult<StatusBreakdown> {
    let (completed, total) = completed_and_total(conn, "checklist_items")?;
    Ok(StatusBreakdown {
        completed,
        pending: total - completed,
    })
}

/// Completed tasks per calendar date within `range`, relative to now.
pub fn completion_over_time(
    conn: &Connection,
    range: CompletionRange,
) -> AnalyticsResult<Vec<CompletionPoint>> {
    completion_over_time_at(conn, range, Utc::now())
}

/// Same as [`completion_over_time`] with an explicit reference instant.
pub fn completion_over_time_at(
    conn: &Connection,
    range: CompletionRange,
    now: DateTime<Utc>,
) -> AnalyticsResult<Vec<CompletionPoint>> {
    let since_ms = range_start(range, now)?.map(|start| start.timestamp_millis());

    let mut stmt = conn.prepare(
        "SELECT updated_at
         FROM tasks
         WHERE completed = 1
           AND (?1 IS NULL OR updated_at >= ?1);",
    )?;
    let mut rows = stmt.query([since_ms])?;
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let updated_at: i64 = row.get(0)?;
        let date = DateTime::from_timestamp_millis(updated_at)
            .ok_or_else(|| {
                AnalyticsError::InvalidData(format!("invalid updated_at `{updated_at}`"))
            })?
            .date_naive();
        *buckets.entry(date).or_insert(0) += 1;
    }

    debug!(
        "event=analytics_completion module=analytics status=ok range={} buckets={}",
        range.as_str(),
        buckets.len()
    );

    Ok(buckets
        .into_iter()
        .map(|(date, count)| CompletionPoint { date, count })
        .collect())
}

pub fn summary(conn: &Connection) -> AnalyticsResult<Summary> {
    let (completed_tasks, total_tasks) = completed_and_total(conn, "tasks")?;
    let total_projects: i64 = conn.query_row("SELECT COUNT(*) FROM projects;", [], |row| {
        row.get(0)
    })?;
    Ok(Summary {
        total_tasks,
        completed_tasks,
        pending_tasks: total_tasks - completed_tasks,
        total_projects,
    })
}

fn range_start(
    range: CompletionRange,
    now: DateTime<Utc>,
) -> AnalyticsResult<Option<DateTime<Utc>>> {
    match range {
        CompletionRange::All => Ok(None),
        CompletionRange::Week => Ok(Some(now - Duration::days(7))),
        CompletionRange::Month => now
            .checked_sub_months(Months::new(1))
            .map(Some)
            .ok_or_else(|| AnalyticsError::InvalidData(format!("month before `{now}`"))),
    }
}

/// `table` is a fixed identifier from this module, never caller input.
fn completed_and_total(conn: &Connection, table: &str) -> AnalyticsResult<(i64, i64)> {
    Ok(conn.query_row(
        &format!("SELECT COALESCE(SUM(completed), 0), COUNT(*) FROM {table};"),
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?)
}

fn parse_project_columns(row: &Row<'_>) -> AnalyticsResult<(ProjectId, String)> {
    let id_text: String = row.get("id")?;
    let project_id = Uuid::parse_str(&id_text)
        .map_err(|_| AnalyticsError::InvalidData(format!("invalid uuid `{id_text}`")))?;
    Ok((project_id, row.get("name")?))
}

fn seconds_to_hours(seconds: i64) -> f64 {
    ((seconds as f64 / SECONDS_PER_HOUR) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{range_start, seconds_to_hours};
    use crate::analytics::CompletionRange;
    use chrono::{TimeZone, Utc};

    #[test]
    fn hours_round_to_two_decimals() {
        assert_eq!(seconds_to_hours(7200), 2.0);
        assert_eq!(seconds_to_hours(5400), 1.5);
        assert_eq!(seconds_to_hours(100), 0.03);
    }

    #[test]
    fn month_range_steps_back_one_calendar_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let start = range_start(CompletionRange::Month, now).unwrap().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
        assert_eq!(range_start(CompletionRange::All, now).unwrap(), None);
    }
}
