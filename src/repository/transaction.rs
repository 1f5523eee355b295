// ==========================================
// DIY 项目管理 - 事务协调器
// ==========================================
// 状态机: Idle → TransactionOpen → Executing…
//         → Committed | RolledBack → ConnectionClosed
// 红线: 每个开启的事务必须且只能走到 commit / rollback 之一
// 红线: 回滚失败不得覆盖原始错误 (挂在 rollback_error 上并记录日志)
// ==========================================

use crate::perf::PerfGuard;
use crate::repository::connection::ConnectionProvider;
use crate::repository::error::{DaoError, DaoResult, DataAccessError, DataAccessResult};
use rusqlite::Connection;
use std::time::Instant;

/// 开启事务 (关闭自动提交)
///
/// # 错误
/// - 连接已处于事务中
/// - BEGIN 执行失败
pub fn start_transaction(conn: &Connection) -> DaoResult<()> {
    if !conn.is_autocommit() {
        return Err(DaoError::Transaction {
            message: "连接已处于事务中".to_string(),
            source: None,
        });
    }
    conn.execute_batch("BEGIN")
        .map_err(|e| DaoError::transaction("BEGIN 失败", e))
}

/// 提交事务 (恢复自动提交)
pub fn commit_transaction(conn: &Connection) -> DaoResult<()> {
    conn.execute_batch("COMMIT")
        .map_err(|e| DaoError::transaction("COMMIT 失败", e))
}

/// 回滚事务 (恢复自动提交)
pub fn rollback_transaction(conn: &Connection) -> DaoResult<()> {
    conn.execute_batch("ROLLBACK")
        .map_err(|e| DaoError::transaction("ROLLBACK 失败", e))
}

/// 事务结束后连接必须回到自动提交模式
fn ensure_autocommit(conn: &Connection, stage: &'static str) {
    if !conn.is_autocommit() {
        tracing::error!(stage, "事务结束后连接仍未恢复自动提交");
    }
}

/// 提交失败: 提交错误 + 补偿回滚的错误 (若有)
#[derive(Debug)]
pub struct CommitFailure {
    pub error: DaoError,
    pub rollback_error: Option<DaoError>,
}

// ==========================================
// TransactionGuard - 事务作用域
// ==========================================
/// 事务守卫
///
/// 由 `start` 创建,由 `commit` / `rollback` 消费。
/// 未结束即被 drop (提前返回 / `?` / panic 展开) 时自动回滚。
pub struct TransactionGuard<'c> {
    conn: &'c Connection,
    finished: bool,
}

impl<'c> TransactionGuard<'c> {
    pub fn start(conn: &'c Connection) -> DaoResult<Self> {
        start_transaction(conn)?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    /// 提交; 提交失败时尝试回滚以恢复自动提交
    pub fn commit(mut self) -> Result<(), CommitFailure> {
        self.finished = true;

        match commit_transaction(self.conn) {
            Ok(()) => {
                ensure_autocommit(self.conn, "commit");
                Ok(())
            }
            Err(error) => {
                // 部分错误 (如 busy) 下事务仍处于打开状态
                let rollback_error = if self.conn.is_autocommit() {
                    None
                } else {
                    rollback_transaction(self.conn).err()
                };
                ensure_autocommit(self.conn, "commit_failed");
                Err(CommitFailure {
                    error,
                    rollback_error,
                })
            }
        }
    }

    /// 回滚
    pub fn rollback(mut self) -> DaoResult<()> {
        self.finished = true;
        let result = rollback_transaction(self.conn);
        ensure_autocommit(self.conn, "rollback");
        result
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!("事务未显式结束, 自动回滚");
        if let Err(e) = rollback_transaction(self.conn) {
            tracing::error!(error = %e, "自动回滚失败");
        }
        ensure_autocommit(self.conn, "drop");
    }
}

// ==========================================
// run_in_transaction - 单个工作单元
// ==========================================
/// 在独立连接 + 事务中执行一个工作单元
///
/// 流程: 取连接 → BEGIN → `work` → COMMIT / ROLLBACK → 关闭连接
///
/// # 错误
/// 任何一层的失败都包装为 `DataAccessError`:
/// - `cause`: 原始错误
/// - `rollback_error`: 回滚本身失败时附带
pub fn run_in_transaction<T, F>(
    provider: &dyn ConnectionProvider,
    operation: &'static str,
    work: F,
) -> DataAccessResult<T>
where
    F: FnOnce(&Connection) -> DaoResult<T>,
{
    let _perf = PerfGuard::new(operation);
    let started_at = Instant::now();

    let conn = provider
        .get_connection()
        .map_err(|e| DataAccessError::new(operation, e))?;

    let outcome = {
        let tx = TransactionGuard::start(&conn).map_err(|e| DataAccessError::new(operation, e))?;
        tracing::debug!(operation, "事务开始");

        match work(tx.connection()) {
            Ok(value) => match tx.commit() {
                Ok(()) => {
                    tracing::debug!(
                        operation,
                        elapsed_ms = started_at.elapsed().as_millis() as u64,
                        "事务提交"
                    );
                    Ok(value)
                }
                Err(failure) => {
                    tracing::warn!(operation, error = %failure.error, "事务提交失败");
                    if let Some(e) = &failure.rollback_error {
                        tracing::error!(operation, error = %e, "提交失败后回滚失败");
                    }
                    Err(DataAccessError::with_rollback_error(
                        operation,
                        failure.error,
                        failure.rollback_error,
                    ))
                }
            },
            Err(cause) => {
                tracing::warn!(operation, error = %cause, "操作失败, 回滚事务");
                let rollback_error = tx.rollback().err();
                if let Some(e) = &rollback_error {
                    tracing::error!(operation, error = %e, "回滚失败");
                }
                Err(DataAccessError::with_rollback_error(
                    operation,
                    cause,
                    rollback_error,
                ))
            }
        }
    };

    if let Err((_, e)) = conn.close() {
        tracing::warn!(operation, error = %e, "关闭数据库连接失败");
    }

    outcome
}
