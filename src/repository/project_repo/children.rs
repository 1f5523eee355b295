// ==========================================
// 项目聚合 - 子记录查询
// ==========================================
// 只在 fetch_project_by_id 的事务内调用,共用同一连接
// 子集合不加 ORDER BY,按数据库自然返回顺序
// ==========================================

use crate::domain::project::{Category, Material, Step};
use crate::repository::binder::bind_typed;
use crate::repository::error::DaoResult;
use crate::repository::row_mapper::query_entities;
use rusqlite::Connection;

const CATEGORIES_FOR_PROJECT_SQL: &str = r#"
    SELECT c.*
    FROM category c
    JOIN project_category pc USING (category_id)
    WHERE project_id = ?
"#;

const STEPS_FOR_PROJECT_SQL: &str = "SELECT * FROM step WHERE project_id = ?";

const MATERIALS_FOR_PROJECT_SQL: &str = "SELECT * FROM material WHERE project_id = ?";

/// 查询项目关联的分类 (经 project_category 连接)
pub(super) fn fetch_categories_for_project(
    conn: &Connection,
    project_id: i32,
) -> DaoResult<Vec<Category>> {
    let mut stmt = conn.prepare(CATEGORIES_FOR_PROJECT_SQL)?;
    bind_typed(&mut stmt, 1, Some(&project_id))?;
    query_entities(&mut stmt)
}

/// 查询项目步骤
pub(super) fn fetch_steps_for_project(conn: &Connection, project_id: i32) -> DaoResult<Vec<Step>> {
    let mut stmt = conn.prepare(STEPS_FOR_PROJECT_SQL)?;
    bind_typed(&mut stmt, 1, Some(&project_id))?;
    query_entities(&mut stmt)
}

/// 查询项目材料
pub(super) fn fetch_materials_for_project(
    conn: &Connection,
    project_id: i32,
) -> DaoResult<Vec<Material>> {
    let mut stmt = conn.prepare(MATERIALS_FOR_PROJECT_SQL)?;
    bind_typed(&mut stmt, 1, Some(&project_id))?;
    query_entities(&mut stmt)
}
