// ==========================================
// DIY 项目管理 - 项目数据仓储
// ==========================================
// 对齐: schema project 表 + category / step / material / project_category
// 红线: Repository 不含业务逻辑
// 红线: 每个操作一条连接、一个事务,失败整体回滚
// ==========================================

mod children;
mod core;
pub mod mapping;


pub use self::core::ProjectRepository;
