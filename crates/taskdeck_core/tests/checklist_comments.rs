use rusqlite::Connection;
use taskdeck_core::db::open_db_in_memory;
use taskdeck_core::{
    ChecklistItemPatch, ChecklistService, CommentService, CreateTaskRequest, ErrorKind,
    ProjectPatch, ProjectService, SqliteChecklistRepository, SqliteCommentRepository,
    SqliteProjectRepository, SqliteTaskRepository, TaskId, TaskService,
};
use uuid::Uuid;

fn seed_task(conn: &Connection) -> TaskId {
    let projects = ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap());
    let project = projects.create_project("Inbox", None).unwrap();
    let tasks = TaskService::new(SqliteTaskRepository::try_new(conn).unwrap());
    tasks
        .create_task(CreateTaskRequest::new(project.id, "host"))
        .unwrap()
        .task
        .id
}

#[test]
fn checklist_items_list_in_creation_order_and_update_in_place() {
    let conn = open_db_in_memory().unwrap();
    let task_id = seed_task(&conn);
    let service = ChecklistService::new(SqliteChecklistRepository::try_new(&conn).unwrap());

    let first = service.add_item(task_id, " first ", false).unwrap();
    let second = service.add_item(task_id, "second", true).unwrap();
    assert_eq!(first.text, "first");
    assert!(second.completed);

    let ids: Vec<_> = service
        .list_items(task_id)
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let updated = service
        .update_item(
            first.id,
            ChecklistItemPatch {
                text: None,
                completed: Some(true),
            },
        )
        .unwrap();
    assert_eq!(updated.text, "first");
    assert!(updated.completed);
    assert_eq!(updated.task_id, task_id);

    service.delete_item(second.id).unwrap();
    assert_eq!(service.list_items(task_id).unwrap().len(), 1);
}

#[test]
fn checklist_operations_validate_and_report_missing_records() {
    let conn = open_db_in_memory().unwrap();
    let task_id = seed_task(&conn);
    let service = ChecklistService::new(SqliteChecklistRepository::try_new(&conn).unwrap());

    assert_eq!(
        service.add_item(task_id, "  ", false).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        service
            .add_item(Uuid::new_v4(), "orphan", false)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service
            .update_item(Uuid::new_v4(), ChecklistItemPatch::default())
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        service.delete_item(Uuid::new_v4()).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn comments_list_newest_first_and_edit_text_only() {
    let conn = open_db_in_memory().unwrap();
    let task_id = seed_task(&conn);
    let service = CommentService::new(SqliteCommentRepository::try_new(&conn).unwrap());

    let older = service.add_comment(task_id, "older").unwrap();
    let newer = service.add_comment(task_id, "newer").unwrap();

    let ids: Vec<_> = service
        .list_comments(task_id)
        .unwrap()
        .into_iter()
        .map(|comment| comment.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let edited = service.update_comment(older.id, "edited").unwrap();
    assert_eq!(edited.text, "edited");
    assert_eq!(edited.created_at, older.created_at);
    assert_eq!(edited.task_id, task_id);

    assert_eq!(
        service.update_comment(older.id, "").unwrap_err().kind(),
        ErrorKind::Validation
    );
    service.delete_comment(newer.id).unwrap();
    assert_eq!(
        service.delete_comment(newer.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn aggregate_read_lists_comments_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let task_id = seed_task(&conn);
    let comments = CommentService::new(SqliteCommentRepository::try_new(&conn).unwrap());
    comments.add_comment(task_id, "one").unwrap();
    comments.add_comment(task_id, "two").unwrap();

    let tasks = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
    let aggregate = tasks.get_task(task_id).unwrap();
    let texts: Vec<_> = aggregate
        .comments
        .iter()
        .map(|comment| comment.text.as_str())
        .collect();
    assert_eq!(texts, vec!["one", "two"]);
}

#[test]
fn project_crud_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let service = ProjectService::new(SqliteProjectRepository::try_new(&conn).unwrap());

    let alpha = service
        .create_project(" Alpha ", Some("first".to_string()))
        .unwrap();
    let beta = service.create_project("Beta", None).unwrap();
    assert_eq!(alpha.name, "Alpha");

    let names: Vec<_> = service
        .list_projects()
        .unwrap()
        .into_iter()
        .map(|project| project.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let patch: ProjectPatch =
        serde_json::from_str(r#"{"name":"Alpha 2","description":null}"#).unwrap();
    let renamed = service.update_project(alpha.id, patch).unwrap();
    assert_eq!(renamed.name, "Alpha 2");
    assert_eq!(renamed.description, None);
    assert_eq!(service.get_project(beta.id).unwrap().name, "Beta");

    assert_eq!(
        service.create_project("   ", None).unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        service.get_project(Uuid::new_v4()).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}
