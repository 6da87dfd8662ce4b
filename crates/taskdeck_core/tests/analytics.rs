use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    checklist_progress, completion_over_time_at, summary, tasks_by_priority, tasks_by_project,
    tasks_by_status, time_by_project, ChecklistItemInput, CompletionPoint, CompletionRange,
    CreateTaskRequest, Priority, ProjectId, ProjectService, SqliteProjectRepository,
    SqliteTaskRepository, TaskId, TaskService,
};

struct Fixture {
    conn: Connection,
    empty: ProjectId,
    work: ProjectId,
    home: ProjectId,
}

fn create_task(
    conn: &Connection,
    project_id: ProjectId,
    priority: Priority,
    completed: bool,
    time_spent: i64,
) -> TaskId {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn).unwrap());
    let mut request = CreateTaskRequest::new(project_id, "task");
    request.priority = Some(priority);
    request.completed = Some(completed);
    request.time_spent = Some(time_spent);
    service.create_task(request).unwrap().task.id
}

fn set_updated_at(conn: &Connection, id: TaskId, updated_at_ms: i64) {
    conn.execute(
        "UPDATE tasks SET updated_at = ?2 WHERE id = ?1;",
        rusqlite::params![id.to_string(), updated_at_ms],
    )
    .unwrap();
}

fn fixture() -> Fixture {
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let empty = projects.create_project("Empty", None).unwrap().id;
    let work = projects.create_project("Work", None).unwrap().id;
    let home = projects.create_project("Home", None).unwrap().id;

    create_task(&conn, work, Priority::High, true, 7200);
    create_task(&conn, work, Priority::High, false, 0);
    create_task(&conn, work, Priority::Low, true, 0);
    create_task(&conn, home, Priority::Medium, false, 0);

    Fixture {
        conn,
        empty,
        work,
        home,
    }
}

#[test]
fn status_priority_and_summary_count_all_tasks() {
    let fx = fixture();

    let status = tasks_by_status(&fx.conn).unwrap();
    assert_eq!((status.completed, status.pending), (2, 2));

    let priority = tasks_by_priority(&fx.conn).unwrap();
    assert_eq!((priority.low, priority.medium, priority.high), (1, 1, 2));

    let totals = summary(&fx.conn).unwrap();
    assert_eq!(totals.total_tasks, 4);
    assert_eq!(totals.completed_tasks, 2);
    assert_eq!(totals.pending_tasks, 2);
    assert_eq!(totals.total_projects, 3);
}

#[test]
fn per_project_reports_skip_empty_projects() {
    let fx = fixture();

    let counts = tasks_by_project(&fx.conn).unwrap();
    let counted: Vec<_> = counts
        .iter()
        .map(|row| (row.project_id, row.project_name.as_str(), row.count))
        .collect();
    assert_eq!(counted, vec![(fx.work, "Work", 3), (fx.home, "Home", 1)]);
    assert!(counts.iter().all(|row| row.project_id != fx.empty));

    let hours = time_by_project(&fx.conn).unwrap();
    assert_eq!(hours.len(), 1);
    assert_eq!(hours[0].project_id, fx.work);
    assert_eq!(hours[0].hours, 2.0);
}

#[test]
fn checklist_progress_counts_items_across_tasks() {
    let fx = fixture();
    let service = TaskService::new(SqliteTaskRepository::try_new(&fx.conn).unwrap());
    let mut request = CreateTaskRequest::new(fx.home, "with items");
    let mut done = ChecklistItemInput::new("done");
    done.completed = Some(true);
    request.checklist = vec![done, ChecklistItemInput::new("open"), ChecklistItemInput::new("open 2")];
    service.create_task(request).unwrap();

    let progress = checklist_progress(&fx.conn).unwrap();
    assert_eq!((progress.completed, progress.pending), (1, 2));
}

#[test]
fn completion_over_time_buckets_by_date_within_range() {
    let conn = open_db_in_memory().unwrap();
    let projects = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());
    let project = projects.create_project("Trend", None).unwrap().id;
    let now = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
    let at = |d: u32, h: u32| {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0)
            .unwrap()
            .timestamp_millis()
    };

    for (day, hour) in [(19, 8), (19, 23), (15, 1), (1, 9)] {
        let id = create_task(&conn, project, Priority::Medium, true, 0);
        set_updated_at(&conn, id, at(day, hour));
    }
    let pending = create_task(&conn, project, Priority::Medium, false, 0);
    set_updated_at(&conn, pending, at(19, 10));
    let last_year = create_task(&conn, project, Priority::Medium, true, 0);
    set_updated_at(
        &conn,
        last_year,
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
            .unwrap()
            .timestamp_millis(),
    );

    let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    let week = completion_over_time_at(&conn, CompletionRange::Week, now).unwrap();
    assert_eq!(
        week,
        vec![
            CompletionPoint { date: date(2025, 3, 15), count: 1 },
            CompletionPoint { date: date(2025, 3, 19), count: 2 },
        ]
    );

    let month = completion_over_time_at(&conn, CompletionRange::Month, now).unwrap();
    assert_eq!(month.first().unwrap().date, date(2025, 3, 1));
    assert_eq!(month.iter().map(|point| point.count).sum::<i64>(), 4);

    let all = completion_over_time_at(&conn, CompletionRange::All, now).unwrap();
    assert_eq!(all.first().unwrap().date, date(2024, 1, 2));
    assert_eq!(all.len(), 4);
}

#[test]
fn reports_serialize_with_camel_case_fields() {
    let fx = fixture();
    let value = serde_json::to_value(summary(&fx.conn).unwrap()).unwrap();
    assert_eq!(value["totalTasks"], 4);
    assert_eq!(value["totalProjects"], 3);

    let hours = serde_json::to_value(time_by_project(&fx.conn).unwrap()).unwrap();
    assert_eq!(hours[0]["projectName"], "Work");
    assert_eq!(hours[0]["hours"], 2.0);
}
