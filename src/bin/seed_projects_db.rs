// Small dev utility: create the schema and seed a demo project with children.
//
// Usage:
//   cargo run --bin seed_projects_db -- [db_path]
//
// Falls back to PROJECTS_DAO_DB_PATH, then the per-user data directory.

use anyhow::Context;
use diy_projects::config::DbConfig;
use diy_projects::db::{apply_schema, open_with_config};
use diy_projects::{logging, Project, ProjectRepository};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

const DEMO_CATEGORIES: &[&str] = &["Outdoor", "Carpentry"];
const DEMO_STEPS: &[&str] = &["Pour concrete slab", "Frame walls", "Install roof"];
const DEMO_MATERIALS: &[(&str, i32, &str)] = &[
    ("2x4 lumber", 40, "3.75"),
    ("Roofing shingles", 12, "28.50"),
    ("Concrete mix", 20, "6.25"),
];

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut config = DbConfig::from_env().context("加载数据库配置失败")?;
    if let Some(path) = std::env::args().nth(1) {
        config.db_path = path;
    }
    config.validate()?;

    let conn = open_with_config(&config)
        .with_context(|| format!("无法打开数据库: {}", config.db_path))?;
    apply_schema(&conn).context("建表失败")?;

    let repo = ProjectRepository::from_config(config.clone());
    let project = repo.insert_project(
        Project::new("Build shed")
            .with_estimated_hours(Decimal::new(1050, 2))
            .with_difficulty(3)
            .with_notes("weekend project"),
    )?;
    let project_id = project
        .project_id
        .context("插入后未返回 project_id")?;

    seed_children(&conn, project_id).context("写入子记录失败")?;
    drop(conn);

    let fetched = repo
        .fetch_project_by_id(project_id)?
        .context("种子项目未找到")?;

    tracing::info!(db_path = %config.db_path, project_id, "种子数据写入完成");
    println!("{}", fetched);
    println!("{}", serde_json::to_string_pretty(&fetched)?);
    Ok(())
}

fn seed_children(conn: &Connection, project_id: i32) -> rusqlite::Result<()> {
    for name in DEMO_CATEGORIES {
        conn.execute(
            "INSERT OR IGNORE INTO category (category_name) VALUES (?1)",
            params![name],
        )?;
        conn.execute(
            r#"
            INSERT OR IGNORE INTO project_category (project_id, category_id)
            SELECT ?1, category_id FROM category WHERE category_name = ?2
            "#,
            params![project_id, name],
        )?;
    }

    for (idx, text) in DEMO_STEPS.iter().enumerate() {
        conn.execute(
            "INSERT INTO step (project_id, step_text, step_order) VALUES (?1, ?2, ?3)",
            params![project_id, text, idx as i32 + 1],
        )?;
    }

    for (name, num_required, cost) in DEMO_MATERIALS {
        conn.execute(
            r#"
            INSERT INTO material (project_id, material_name, num_required, cost)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![project_id, name, num_required, cost],
        )?;
    }

    Ok(())
}
