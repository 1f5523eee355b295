// ==========================================
// DIY 项目管理 - 领域模型层
// ==========================================
// 职责: 定义项目聚合 (项目 + 分类/步骤/材料)
// 红线: 不含数据访问逻辑
// ==========================================

pub mod project;

// 重导出核心类型
pub use project::{Category, Material, Project, Step};
