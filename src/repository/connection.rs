// ==========================================
// DIY 项目管理 - 连接提供者
// ==========================================
// 职责: 每个仓储操作获取一条独立连接,用后即关闭
// 约束: 连接不在并发操作间共享
// ==========================================

use crate::config::DbConfig;
use crate::db::open_with_config;
use crate::perf::SqlTraceSettings;
use crate::repository::error::{DaoError, DaoResult};
use rusqlite::Connection;

/// 连接提供者
pub trait ConnectionProvider: Send + Sync {
    /// 打开一条新连接,所有权交给调用方 (drop 即关闭)
    ///
    /// # 错误
    /// - `DaoError::Connectivity`: 无法打开或配置连接
    fn get_connection(&self) -> DaoResult<Connection>;
}

// ==========================================
// SqliteConnectionProvider - 按配置打开 SQLite 文件
// ==========================================
#[derive(Debug, Clone)]
pub struct SqliteConnectionProvider {
    config: DbConfig,
    trace: SqlTraceSettings,
}

impl SqliteConnectionProvider {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            trace: SqlTraceSettings::from_env(),
        }
    }

    /// 覆盖语句追踪设置
    pub fn with_trace_settings(mut self, trace: SqlTraceSettings) -> Self {
        self.trace = trace;
        self
    }

    pub fn for_path(db_path: impl Into<String>) -> Self {
        Self::new(DbConfig::for_path(db_path))
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn get_connection(&self) -> DaoResult<Connection> {
        let mut conn = open_with_config(&self.config).map_err(|e| {
            tracing::error!(
                db_path = %self.config.db_path,
                error = %e,
                "打开数据库连接失败"
            );
            DaoError::connectivity(format!("无法打开数据库: {}", self.config.db_path), e)
        })?;

        self.trace.install(&mut conn);
        Ok(conn)
    }
}
