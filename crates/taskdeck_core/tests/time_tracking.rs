use rusqlite::Connection;
use std::thread;
use taskdeck_core::db::{open_db, open_db_in_memory};
use taskdeck_core::{
    CreateTaskRequest, ErrorKind, ProjectService, SqliteProjectRepository, SqliteTaskRepository,
    TaskId, TaskService, UpdateTaskRequest,
};
use uuid::Uuid;

fn task_service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
}

fn seed_task(conn: &Connection) -> TaskId {
    let projects = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap());
    let project = projects.create_project("Timers", None).unwrap();
    task_service(conn)
        .create_task(CreateTaskRequest::new(project.id, "tracked"))
        .unwrap()
        .task
        .id
}

fn time_spent(conn: &Connection, id: TaskId) -> i64 {
    task_service(conn).get_task(id).unwrap().task.time_spent
}

#[test]
fn update_time_never_moves_backwards() {
    let conn = open_db_in_memory().unwrap();
    let id = seed_task(&conn);
    let service = task_service(&conn);

    service.update_time(id, 50).unwrap();
    service.update_time(id, 30).unwrap();
    assert_eq!(time_spent(&conn, id), 50);

    service.update_time(id, 50).unwrap();
    assert_eq!(time_spent(&conn, id), 50);
}

#[test]
fn update_timer_overwrites_unconditionally() {
    let conn = open_db_in_memory().unwrap();
    let id = seed_task(&conn);
    let service = task_service(&conn);

    service.update_time(id, 50).unwrap();
    service.update_time(id, 30).unwrap();
    service.update_timer(id, 30, false).unwrap();

    let task = service.get_task(id).unwrap().task;
    assert_eq!(task.time_spent, 30);
    assert!(!task.timer_active);

    service.update_timer(id, 45, true).unwrap();
    let task = service.get_task(id).unwrap().task;
    assert_eq!(task.time_spent, 45);
    assert!(task.timer_active);
}

#[test]
fn full_update_cannot_lower_time_spent() {
    let conn = open_db_in_memory().unwrap();
    let id = seed_task(&conn);
    let service = task_service(&conn);
    service.update_time(id, 120).unwrap();

    let stale: UpdateTaskRequest =
        serde_json::from_str(r#"{"timeSpent":60,"timerActive":true}"#).unwrap();
    let updated = service.update_task(id, stale).unwrap();
    assert_eq!(updated.task.time_spent, 120);
    assert!(updated.task.timer_active);

    let ahead: UpdateTaskRequest = serde_json::from_str(r#"{"timeSpent":180}"#).unwrap();
    let updated = service.update_task(id, ahead).unwrap();
    assert_eq!(updated.task.time_spent, 180);
}

#[test]
fn time_operations_report_missing_task_and_negative_values() {
    let conn = open_db_in_memory().unwrap();
    let id = seed_task(&conn);
    let service = task_service(&conn);

    let missing = Uuid::new_v4();
    assert_eq!(
        service.update_time(missing, 10).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.update_timer(missing, 10, true).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.update_time(id, -1).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        service.update_timer(id, -5, false).unwrap_err().kind(),
        ErrorKind::Validation
    );
}

#[test]
fn concurrent_pings_converge_on_largest_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timers.db");
    let id = {
        let conn = open_db(&path).unwrap();
        seed_task(&conn)
    };

    let handles: Vec<_> = [12_i64, 10, 11, 12, 3]
        .into_iter()
        .map(|seconds| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                task_service(&conn).update_time(id, seconds).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(time_spent(&conn, id), 12);
}
