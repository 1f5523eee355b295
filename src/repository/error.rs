// ==========================================
// DIY 项目管理 - 数据访问层错误类型
// ==========================================
// 分层错误: 映射 / 绑定 / 事务 / 连接 / 查询
// 对外统一: DataAccessError (操作边界包装)
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::sql_value::SqlType;
use thiserror::Error;

/// 数据访问层内部错误 (各组件产生)
#[derive(Error, Debug)]
pub enum DaoError {
    // ===== 行映射错误 =====
    #[error("行映射失败 (field={field}, column={column}): {message}")]
    Mapping {
        field: String,
        column: String,
        message: String,
    },

    // ===== 参数绑定错误 =====
    #[error("参数绑定失败 (ordinal={ordinal}, declared_type={declared_type}): {message}")]
    Binding {
        ordinal: usize,
        declared_type: SqlType,
        message: String,
    },

    // ===== 事务错误 =====
    #[error("数据库事务失败: {message}")]
    Transaction {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // ===== 连接错误 =====
    #[error("数据库连接失败: {message}")]
    Connectivity {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // ===== 数据库错误 =====
    #[error("约束违反: {0}")]
    ConstraintViolation(String),

    #[error("受影响行数异常: expected={expected}, actual={actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("数据库查询失败: {0}")]
    Query(#[source] rusqlite::Error),
}

impl DaoError {
    pub fn mapping(
        field: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DaoError::Mapping {
            field: field.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn binding(ordinal: usize, declared_type: SqlType, message: impl Into<String>) -> Self {
        DaoError::Binding {
            ordinal,
            declared_type,
            message: message.into(),
        }
    }

    pub fn transaction(message: impl Into<String>, source: rusqlite::Error) -> Self {
        DaoError::Transaction {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn connectivity(message: impl Into<String>, source: rusqlite::Error) -> Self {
        DaoError::Connectivity {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 错误分类 (用于诊断)
    pub fn kind(&self) -> ErrorKind {
        match self {
            DaoError::Mapping { .. } => ErrorKind::Mapping,
            DaoError::Binding { .. } => ErrorKind::Binding,
            DaoError::Transaction { .. } => ErrorKind::Transaction,
            DaoError::Connectivity { .. } => ErrorKind::Connectivity,
            DaoError::ConstraintViolation(_) => ErrorKind::Constraint,
            DaoError::UnexpectedRowCount { .. } | DaoError::Query(_) => ErrorKind::Query,
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for DaoError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(_, Some(msg))
                if msg.contains("UNIQUE")
                    || msg.contains("FOREIGN KEY")
                    || msg.contains("NOT NULL")
                    || msg.contains("CHECK") =>
            {
                DaoError::ConstraintViolation(msg.clone())
            }
            _ => DaoError::Query(err),
        }
    }
}

/// 组件内部 Result 类型别名
pub type DaoResult<T> = Result<T, DaoError>;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Mapping,
    Binding,
    Transaction,
    Connectivity,
    Constraint,
    Query,
}

// ==========================================
// DataAccessError - 操作边界统一错误
// ==========================================
/// 仓储操作对外唯一的错误类型
///
/// - `cause`: 触发回滚的原始错误 (作为 `source` 暴露)
/// - `rollback_error`: 回滚本身失败时附带,不覆盖原始错误
#[derive(Error, Debug)]
#[error("数据访问失败 (operation={operation}): {cause}")]
pub struct DataAccessError {
    operation: &'static str,
    #[source]
    cause: DaoError,
    rollback_error: Option<DaoError>,
}

impl DataAccessError {
    pub fn new(operation: &'static str, cause: DaoError) -> Self {
        Self {
            operation,
            cause,
            rollback_error: None,
        }
    }

    pub fn with_rollback_error(
        operation: &'static str,
        cause: DaoError,
        rollback_error: Option<DaoError>,
    ) -> Self {
        Self {
            operation,
            cause,
            rollback_error,
        }
    }

    /// 失败的仓储操作名
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// 原始错误
    pub fn cause(&self) -> &DaoError {
        &self.cause
    }

    /// 回滚失败 (若有)
    pub fn rollback_error(&self) -> Option<&DaoError> {
        self.rollback_error.as_ref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    pub fn into_cause(self) -> DaoError {
        self.cause
    }
}

/// 仓储操作 Result 类型别名
pub type DataAccessResult<T> = Result<T, DataAccessError>;
