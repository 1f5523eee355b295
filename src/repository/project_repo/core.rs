use super::children::{
    fetch_categories_for_project, fetch_materials_for_project, fetch_steps_for_project,
};
use crate::config::DbConfig;
use crate::domain::project::Project;
use crate::repository::binder::bind_typed;
use crate::repository::connection::{ConnectionProvider, SqliteConnectionProvider};
use crate::repository::error::{DaoError, DaoResult, DataAccessResult};
use crate::repository::row_mapper::{query_entities, query_first_entity};
use crate::repository::transaction::run_in_transaction;
use rusqlite::Statement;
use std::sync::Arc;

const INSERT_PROJECT_SQL: &str = r#"
    INSERT INTO project
        (project_name, estimated_hours, actual_hours, difficulty, notes)
    VALUES
        (?, ?, ?, ?, ?)
"#;

const FETCH_ALL_PROJECTS_SQL: &str = "SELECT * FROM project ORDER BY project_name";

const FETCH_PROJECT_BY_ID_SQL: &str = "SELECT * FROM project WHERE project_id = ?";

const UPDATE_PROJECT_SQL: &str = r#"
    UPDATE project SET
        project_name = ?,
        estimated_hours = ?,
        actual_hours = ?,
        difficulty = ?,
        notes = ?
    WHERE project_id = ?
"#;

const DELETE_PROJECT_SQL: &str = "DELETE FROM project WHERE project_id = ?";

// ==========================================
// ProjectRepository - 项目仓储
// ==========================================
/// 项目仓储
/// 职责: 管理 project 表的 CRUD,以及按 ID 聚合子记录
/// 红线: 不含业务逻辑,只负责数据访问
pub struct ProjectRepository {
    provider: Arc<dyn ConnectionProvider>,
}

impl ProjectRepository {
    /// 从连接提供者创建仓储实例
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    /// 按数据库路径创建仓储实例
    pub fn open(db_path: &str) -> Self {
        Self::new(Arc::new(SqliteConnectionProvider::for_path(db_path)))
    }

    /// 按配置创建仓储实例
    pub fn from_config(config: DbConfig) -> Self {
        Self::new(Arc::new(SqliteConnectionProvider::new(config)))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 创建项目
    ///
    /// # 参数
    /// - `project`: 未持久化的项目 (project_id 被忽略)
    ///
    /// # 返回
    /// - `Ok(Project)`: 写入数据库分配的 project_id 后的项目
    /// - `Err(...)`: 任一步失败,事务已回滚
    ///
    /// # 说明
    /// - project_id 在同一连接、提交前读取 (last_insert_rowid)
    /// - 受影响行数必须为 1,否则视为失败并回滚
    pub fn insert_project(&self, mut project: Project) -> DataAccessResult<Project> {
        let project_id = run_in_transaction(self.provider.as_ref(), "insert_project", |conn| {
            let mut stmt = conn.prepare(INSERT_PROJECT_SQL)?;
            bind_project_attributes(&mut stmt, &project)?;

            let affected = stmt.raw_execute()?;
            if affected != 1 {
                return Err(DaoError::UnexpectedRowCount {
                    expected: 1,
                    actual: affected,
                });
            }

            let rowid = conn.last_insert_rowid();
            i32::try_from(rowid).map_err(|_| {
                DaoError::mapping(
                    "Project.project_id",
                    "last_insert_rowid",
                    format!("数据库分配的 ID 超出 i32 范围: {}", rowid),
                )
            })
        })?;

        project.project_id = Some(project_id);
        tracing::info!(project_id, project_name = %project.project_name, "项目已创建");
        Ok(project)
    }

    /// 更新项目详情 (按 project_id 全量覆盖五个属性)
    ///
    /// # 返回
    /// - `Ok(true)`: 恰好更新 1 行
    /// - `Ok(false)`: 未匹配或匹配多行 (调用方自行区分)
    /// - `Err(...)`: 数据库错误,事务已回滚
    pub fn modify_project_details(&self, project: &Project) -> DataAccessResult<bool> {
        let updated = run_in_transaction(self.provider.as_ref(), "modify_project_details", |conn| {
            let mut stmt = conn.prepare(UPDATE_PROJECT_SQL)?;
            bind_project_attributes(&mut stmt, project)?;
            bind_typed(&mut stmt, 6, project.project_id.as_ref())?;

            Ok(stmt.raw_execute()? == 1)
        })?;

        tracing::info!(project_id = ?project.project_id, updated, "项目更新");
        Ok(updated)
    }

    /// 删除项目 (子记录由数据库级联删除)
    ///
    /// # 返回
    /// - `Ok(true)`: 恰好删除 1 行
    /// - `Ok(false)`: 未匹配或匹配多行
    pub fn delete_project(&self, project_id: i32) -> DataAccessResult<bool> {
        let deleted = run_in_transaction(self.provider.as_ref(), "delete_project", |conn| {
            let mut stmt = conn.prepare(DELETE_PROJECT_SQL)?;
            bind_typed(&mut stmt, 1, Some(&project_id))?;

            Ok(stmt.raw_execute()? == 1)
        })?;

        tracing::info!(project_id, deleted, "项目删除");
        Ok(deleted)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 查询全部项目 (按名称排序,不含子集合)
    ///
    /// # 返回
    /// - `Ok(Vec<Project>)`: 可能为空
    pub fn fetch_all_projects(&self) -> DataAccessResult<Vec<Project>> {
        run_in_transaction(self.provider.as_ref(), "fetch_all_projects", |conn| {
            let mut stmt = conn.prepare(FETCH_ALL_PROJECTS_SQL)?;
            query_entities(&mut stmt)
        })
    }

    /// 按 ID 查询项目,并在同一事务内聚合分类、步骤、材料
    ///
    /// # 返回
    /// - `Ok(Some(Project))`: 找到项目,三个子集合均已填充
    /// - `Ok(None)`: 未找到
    /// - `Err(...)`: 任一查询失败,不返回部分结果
    pub fn fetch_project_by_id(&self, project_id: i32) -> DataAccessResult<Option<Project>> {
        run_in_transaction(self.provider.as_ref(), "fetch_project_by_id", |conn| {
            let mut stmt = conn.prepare(FETCH_PROJECT_BY_ID_SQL)?;
            bind_typed(&mut stmt, 1, Some(&project_id))?;

            let mut project: Project = match query_first_entity(&mut stmt)? {
                Some(project) => project,
                None => return Ok(None),
            };

            project.categories = fetch_categories_for_project(conn, project_id)?;
            project.steps = fetch_steps_for_project(conn, project_id)?;
            project.materials = fetch_materials_for_project(conn, project_id)?;

            tracing::debug!(
                project_id,
                categories = project.categories.len(),
                steps = project.steps.len(),
                materials = project.materials.len(),
                "项目聚合完成"
            );
            Ok(Some(project))
        })
    }
}

/// 按固定顺序绑定五个属性: 名称、预估工时、实际工时、难度、备注
fn bind_project_attributes(stmt: &mut Statement<'_>, project: &Project) -> DaoResult<()> {
    bind_typed(stmt, 1, Some(project.project_name.as_str()))?;
    bind_typed(stmt, 2, project.estimated_hours.as_ref())?;
    bind_typed(stmt, 3, project.actual_hours.as_ref())?;
    bind_typed(stmt, 4, project.difficulty.as_ref())?;
    bind_typed(stmt, 5, project.notes.as_deref())?;
    Ok(())
}
