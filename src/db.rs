// ==========================================
// DIY 项目管理 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有连接的 PRAGMA 行为 (外键级联删除依赖 foreign_keys=ON)
// - 统一 busy_timeout,减少并发写入时的偶发 busy 错误
// - 提供建表脚本 (生产库已存在,此处供测试与种子工具使用)
// ==========================================

use crate::config::DbConfig;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 建表脚本
///
/// 说明：
/// - 子表 (step / material / project_category) 通过 ON DELETE CASCADE 随项目删除
/// - 工时与成本列为 DECIMAL(7,2)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS project (
    project_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_name VARCHAR(128) NOT NULL,
    estimated_hours DECIMAL(7, 2),
    actual_hours DECIMAL(7, 2),
    difficulty INT,
    notes TEXT
);

CREATE TABLE IF NOT EXISTS category (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_name VARCHAR(128) NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS material (
    material_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INT NOT NULL REFERENCES project (project_id) ON DELETE CASCADE,
    material_name VARCHAR(128) NOT NULL,
    num_required INT,
    cost DECIMAL(7, 2)
);

CREATE TABLE IF NOT EXISTS step (
    step_id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id INT NOT NULL REFERENCES project (project_id) ON DELETE CASCADE,
    step_text TEXT NOT NULL,
    step_order INT NOT NULL
);

CREATE TABLE IF NOT EXISTS project_category (
    project_id INT NOT NULL REFERENCES project (project_id) ON DELETE CASCADE,
    category_id INT NOT NULL REFERENCES category (category_id) ON DELETE CASCADE,
    UNIQUE (project_id, category_id)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    configure_with(conn, DEFAULT_BUSY_TIMEOUT_MS, true)
}

fn configure_with(
    conn: &Connection,
    busy_timeout_ms: u64,
    foreign_keys: bool,
) -> rusqlite::Result<()> {
    if foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    } else {
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    }
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 按配置打开连接
///
/// - `create_if_missing=false` 时数据库文件不存在即失败
/// - `create_if_missing=true` 时会创建父目录
pub fn open_with_config(config: &DbConfig) -> rusqlite::Result<Connection> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    if config.create_if_missing {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
        if let Some(parent) = Path::new(&config.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(
                        db_path = %config.db_path,
                        parent = %parent.display(),
                        error = %e,
                        "创建数据库目录失败"
                    );
                }
            }
        }
    }

    let conn = Connection::open_with_flags(&config.db_path, flags)?;
    configure_with(&conn, config.busy_timeout_ms, config.foreign_keys)?;
    Ok(conn)
}

/// 建表 (幂等)
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// 判断表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
