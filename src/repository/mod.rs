// ==========================================
// DIY 项目管理 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod binder;
pub mod connection;
pub mod error;
pub mod project_repo;
pub mod row_mapper;
pub mod sql_value;
pub mod transaction;

// 重导出核心仓储
pub use connection::{ConnectionProvider, SqliteConnectionProvider};
pub use error::{DaoError, DaoResult, DataAccessError, DataAccessResult, ErrorKind};
pub use project_repo::ProjectRepository;
pub use row_mapper::{FieldMapping, MappedEntity, RowMapper};
pub use sql_value::{SqlParam, SqlType, SqlValue};
pub use transaction::{run_in_transaction, CommitFailure, TransactionGuard};
