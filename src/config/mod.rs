// ==========================================
// DIY 项目管理 - 配置层
// ==========================================
// 职责: 数据库连接配置 (路径 / busy_timeout / 外键 / 自动建库)
// 来源: 环境变量 > JSON 配置文件 > 默认值
// ==========================================

pub mod db_config;

// 重导出核心配置
pub use db_config::{default_db_path, env_keys, ConfigError, DbConfig};
