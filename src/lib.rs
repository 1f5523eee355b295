// ==========================================
// DIY 项目管理 - 数据访问核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite)
// 系统定位: 项目/分类/步骤/材料的持久化层
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 数据库配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/Schema）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{Category, Material, Project, Step};

// 仓储与错误
pub use repository::{
    ConnectionProvider, DaoError, DataAccessError, DataAccessResult, ErrorKind,
    ProjectRepository, SqliteConnectionProvider,
};

// 配置
pub use config::DbConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "DIY 项目管理";
