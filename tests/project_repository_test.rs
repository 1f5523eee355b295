// ==========================================
// ProjectRepository 集成测试
// ==========================================
// 测试目标: 验证项目 CRUD 与按 ID 聚合子记录的完整流程
// ==========================================


use diy_projects::logging;
use diy_projects::{DaoError, ErrorKind, Project, ProjectRepository};
use rust_decimal::Decimal;
use test_helpers::{add_material, add_step, count_rows, link_category, open_conn};

fn build_shed() -> Project {
    Project::new("Build shed")
        .with_estimated_hours(Decimal::new(105, 1))
        .with_difficulty(3)
        .with_notes("weekend project")
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_build_shed_example() {
    logging::init_test();

    println!("\n=== 测试：新建项目并按名称排序查询 ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    repo.insert_project(Project::new("Assemble desk")).unwrap();
    repo.insert_project(Project::new("Tile bathroom")).unwrap();

    let shed = repo.insert_project(build_shed()).unwrap();
    assert!(shed.project_id.is_some());
    assert!(shed.actual_hours.is_none());

    let fetched = repo
        .fetch_project_by_id(shed.project_id.unwrap())
        .unwrap()
        .expect("inserted project should be found");
    assert_eq!(fetched.estimated_hours, Some(Decimal::new(1050, 2)));
    assert_eq!(fetched.estimated_hours.unwrap().to_string(), "10.50");
    assert!(fetched.actual_hours.is_none());
    assert_eq!(fetched.difficulty, Some(3));
    assert_eq!(fetched.notes.as_deref(), Some("weekend project"));

    let names: Vec<String> = repo
        .fetch_all_projects()
        .unwrap()
        .into_iter()
        .map(|p| p.project_name)
        .collect();
    assert_eq!(names, vec!["Assemble desk", "Build shed", "Tile bathroom"]);

    println!("✓ 项目顺序: {:?}", names);
}

#[test]
fn test_fetch_by_id_aggregates_children() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    let id = repo.insert_project(build_shed()).unwrap().project_id.unwrap();
    let other = repo
        .insert_project(Project::new("Paint fence"))
        .unwrap()
        .project_id
        .unwrap();

    let conn = open_conn(&db_path);
    link_category(&conn, id, "Outdoor");
    link_category(&conn, id, "Carpentry");
    link_category(&conn, other, "Outdoor");
    add_step(&conn, id, "Pour slab", 1);
    add_step(&conn, id, "Frame walls", 2);
    add_step(&conn, id, "Roof", 3);
    add_step(&conn, other, "Sand", 1);
    add_material(&conn, id, "Lumber", 40, "12.00");
    add_material(&conn, id, "Nails", 500, "0.05");
    drop(conn);

    let project = repo.fetch_project_by_id(id).unwrap().unwrap();
    assert_eq!(project.categories.len(), 2);
    assert_eq!(project.steps.len(), 3);
    assert_eq!(project.materials.len(), 2);

    let mut category_names: Vec<&str> = project
        .categories
        .iter()
        .map(|c| c.category_name.as_str())
        .collect();
    category_names.sort();
    assert_eq!(category_names, vec!["Carpentry", "Outdoor"]);

    assert!(project.steps.iter().all(|s| s.project_id == Some(id)));
    let lumber = project
        .materials
        .iter()
        .find(|m| m.material_name == "Lumber")
        .unwrap();
    assert_eq!(lumber.num_required, Some(40));
    assert_eq!(lumber.cost, Some(Decimal::new(1200, 2)));

    // 列表查询不加载子集合
    let listed = repo.fetch_all_projects().unwrap();
    assert!(listed.iter().all(|p| p.steps.is_empty() && p.materials.is_empty()));

    println!("✓ 聚合结果: {}", project);
}

#[test]
fn test_update_then_fetch_reflects_changes() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    let mut project = repo.insert_project(build_shed()).unwrap();
    project.project_name = "Build shed v2".to_string();
    project.estimated_hours = Some(Decimal::new(2000, 2));
    project.actual_hours = Some(Decimal::new(2225, 2));
    project.difficulty = None;
    project.notes = Some("took longer".to_string());

    assert!(repo.modify_project_details(&project).unwrap());

    let fetched = repo
        .fetch_project_by_id(project.project_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(fetched, project);
}

#[test]
fn test_update_missing_id_mutates_nothing() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    let original = repo.insert_project(build_shed()).unwrap();
    let mut ghost = build_shed();
    ghost.project_id = Some(original.project_id.unwrap() + 100);
    ghost.project_name = "Ghost".to_string();

    assert!(!repo.modify_project_details(&ghost).unwrap());

    let all = repo.fetch_all_projects().unwrap();
    assert_eq!(all, vec![original]);
}

#[test]
fn test_delete_cascades_to_children() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    let id = repo.insert_project(build_shed()).unwrap().project_id.unwrap();
    let conn = open_conn(&db_path);
    link_category(&conn, id, "Outdoor");
    add_step(&conn, id, "Pour slab", 1);
    add_material(&conn, id, "Lumber", 40, "12.00");

    assert!(repo.delete_project(id).unwrap());
    assert!(!repo.delete_project(id).unwrap());

    assert_eq!(count_rows(&conn, "project"), 0);
    assert_eq!(count_rows(&conn, "step"), 0);
    assert_eq!(count_rows(&conn, "material"), 0);
    assert_eq!(count_rows(&conn, "project_category"), 0);
    // 分类本身不随项目删除
    assert_eq!(count_rows(&conn, "category"), 1);
}

#[test]
fn test_failure_mid_aggregation_returns_wrapped_error() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let repo = ProjectRepository::open(&db_path);

    let id = repo.insert_project(build_shed()).unwrap().project_id.unwrap();
    let conn = open_conn(&db_path);
    link_category(&conn, id, "Outdoor");
    add_step(&conn, id, "Pour slab", 1);
    conn.execute_batch("DROP TABLE material;").unwrap();
    drop(conn);

    let err = repo.fetch_project_by_id(id).unwrap_err();
    assert_eq!(err.operation(), "fetch_project_by_id");
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("fetch_project_by_id"));

    let source = std::error::Error::source(&err).expect("cause should be chained");
    assert!(source.to_string().contains("material"));
}

#[test]
fn test_unreachable_database_is_connectivity_error() {
    logging::init_test();

    let dir = tempfile::tempdir().unwrap();
    let mut config = diy_projects::DbConfig::for_path(
        dir.path().join("missing.db").to_string_lossy().to_string(),
    );
    config.create_if_missing = false;
    let repo = ProjectRepository::from_config(config);

    let err = repo.fetch_all_projects().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(matches!(err.cause(), DaoError::Connectivity { .. }));
}
