// ==========================================
// DIY 项目管理 - 数据库配置
// ==========================================
// 职责: 配置加载、校验
// 存储: 环境变量 / JSON 文件
// ==========================================

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 环境变量键
pub mod env_keys {
    pub const DB_PATH: &str = "PROJECTS_DAO_DB_PATH";
    pub const BUSY_TIMEOUT_MS: &str = "PROJECTS_DAO_BUSY_TIMEOUT_MS";
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// DbConfig - 数据库连接配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub db_path: String,        // 数据库文件路径
    pub busy_timeout_ms: u64,   // 锁等待超时
    pub create_if_missing: bool, // 文件不存在时是否创建
    pub foreign_keys: bool,     // 是否开启外键 (级联删除依赖此项)
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            create_if_missing: true,
            foreign_keys: true,
        }
    }
}

impl DbConfig {
    /// 指定路径,其余取默认值
    pub fn for_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// 从环境变量加载 (未设置的项取默认值)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(env_keys::DB_PATH) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                config.db_path = trimmed.to_string();
            }
        }

        if let Some(raw) = lookup(env_keys::BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms =
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: env_keys::BUSY_TIMEOUT_MS.to_string(),
                        message: format!("无法解析为整数 '{}': {}", raw, e),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 字符串加载
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DbConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "db_path".to_string(),
                message: "数据库路径不能为空".to_string(),
            });
        }
        Ok(())
    }
}

/// 默认数据库路径
///
/// 优先使用用户数据目录,开发构建使用独立目录,避免污染正式数据。
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./projects.db");

    if let Some(data_dir) = dirs::data_dir() {
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("diy-projects-dev").join("projects.db");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("diy-projects").join("projects.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::default();
        assert!(config.db_path.ends_with("projects.db"));
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert!(config.create_if_missing);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = DbConfig::from_lookup(lookup_from(&[
            (env_keys::DB_PATH, " /tmp/p.db "),
            (env_keys::BUSY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, "/tmp/p.db");
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = DbConfig::from_lookup(lookup_from(&[(env_keys::BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == env_keys::BUSY_TIMEOUT_MS
        ));
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let config = DbConfig::from_json_str(r#"{"db_path": "/data/p.db", "foreign_keys": false}"#)
            .unwrap();

        assert_eq!(config.db_path, "/data/p.db");
        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_from_json_rejects_empty_path() {
        let err = DbConfig::from_json_str(r#"{"db_path": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, r#"{"db_path": "/x/y.db", "busy_timeout_ms": 10}"#).unwrap();

        let config = DbConfig::from_json_file(&path).unwrap();
        assert_eq!(config.db_path, "/x/y.db");
        assert_eq!(config.busy_timeout_ms, 10);
    }
}
