// ==========================================
// 事务边界集成测试
// ==========================================
// 测试目标: 验证工作单元的提交/回滚、错误分类与连接配置
// ==========================================


use diy_projects::config::DbConfig;
use diy_projects::logging;
use diy_projects::repository::{
    run_in_transaction, ConnectionProvider, DaoError, DaoResult, ErrorKind,
    SqliteConnectionProvider,
};
use diy_projects::{Project, ProjectRepository};
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_helpers::{count_rows, open_conn};

/// 统计连接获取次数的提供者
struct CountingProvider {
    inner: SqliteConnectionProvider,
    opened: AtomicUsize,
}

impl ConnectionProvider for CountingProvider {
    fn get_connection(&self) -> DaoResult<Connection> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.inner.get_connection()
    }
}

#[test]
fn test_constraint_violation_rolls_back_whole_unit() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let provider = SqliteConnectionProvider::for_path(db_path.as_str());

    let err = run_in_transaction(&provider, "seed_children", |conn| {
        conn.execute("INSERT INTO project (project_name) VALUES ('Birdhouse')", [])?;
        conn.execute(
            "INSERT INTO step (project_id, step_text, step_order) VALUES (9999, 'Orphan', 1)",
            [],
        )?;
        Ok(())
    })
    .unwrap_err();

    assert_eq!(err.operation(), "seed_children");
    assert_eq!(err.kind(), ErrorKind::Constraint);
    assert!(err.rollback_error().is_none());

    let conn = open_conn(&db_path);
    assert_eq!(count_rows(&conn, "project"), 0);
    assert_eq!(count_rows(&conn, "step"), 0);
}

#[test]
fn test_each_operation_uses_its_own_connection() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let provider = Arc::new(CountingProvider {
        inner: SqliteConnectionProvider::for_path(db_path.as_str()),
        opened: AtomicUsize::new(0),
    });
    let repo = ProjectRepository::new(provider.clone());

    let id = repo
        .insert_project(Project::new("Birdhouse"))
        .unwrap()
        .project_id
        .unwrap();
    repo.fetch_project_by_id(id).unwrap();
    repo.fetch_all_projects().unwrap();
    repo.delete_project(id).unwrap();

    assert_eq!(provider.opened.load(Ordering::SeqCst), 4);
}

#[test]
fn test_repository_is_shareable_across_threads() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = Arc::new(ProjectRepository::open(&db_path));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                repo.insert_project(Project::new(format!("Project {}", i)))
                    .map(|p| p.project_id)
            })
        })
        .collect();

    let mut ids: Vec<i32> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap().unwrap())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(repo.fetch_all_projects().unwrap().len(), 4);
}

#[test]
fn test_repository_from_json_config() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let json = serde_json::json!({ "db_path": db_path, "busy_timeout_ms": 250 }).to_string();
    let config = DbConfig::from_json_str(&json).unwrap();
    assert_eq!(config.busy_timeout_ms, 250);
    assert!(config.foreign_keys);

    let repo = ProjectRepository::from_config(config);
    let saved = repo.insert_project(Project::new("Spice rack")).unwrap();
    assert!(saved.is_persisted());
}

#[test]
fn test_work_error_is_reported_as_cause() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let provider = SqliteConnectionProvider::for_path(db_path.as_str());

    let err = run_in_transaction::<(), _>(&provider, "custom_work", |conn| {
        conn.execute("INSERT INTO category (category_name) VALUES ('Garden')", [])?;
        Err(DaoError::UnexpectedRowCount {
            expected: 1,
            actual: 0,
        })
    })
    .unwrap_err();

    assert!(matches!(
        err.into_cause(),
        DaoError::UnexpectedRowCount { expected: 1, actual: 0 }
    ));
    assert_eq!(count_rows(&open_conn(&db_path), "category"), 0);
}
