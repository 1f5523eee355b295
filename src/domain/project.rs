// ==========================================
// DIY 项目管理 - 项目领域模型
// ==========================================
// 对齐: schema project / category / step / material / project_category
// 红线: 纯数据容器,不含数据访问逻辑
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Project - 项目 (聚合根)
// ==========================================
// 子集合只在按 ID 查询时填充,且三者同时填充
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: Option<i32>,          // 插入前为 None,由数据库分配
    pub project_name: String,             // 项目名称
    pub estimated_hours: Option<Decimal>, // 预估工时 DECIMAL(7,2)
    pub actual_hours: Option<Decimal>,    // 实际工时 DECIMAL(7,2)
    pub difficulty: Option<i32>,          // 难度 (1-5)
    pub notes: Option<String>,            // 备注

    // ===== 子集合 =====
    pub categories: Vec<Category>,
    pub steps: Vec<Step>,
    pub materials: Vec<Material>,
}

impl Project {
    /// 创建未持久化的项目 (无 ID,子集合为空)
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }

    pub fn with_estimated_hours(mut self, hours: Decimal) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_actual_hours(mut self, hours: Decimal) -> Self {
        self.actual_hours = Some(hours);
        self
    }

    pub fn with_difficulty(mut self, difficulty: i32) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 是否已持久化
    pub fn is_persisted(&self) -> bool {
        self.project_id.is_some()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID={} 名称={} 预估工时={} 实际工时={} 难度={} 备注={}",
            display_opt(&self.project_id),
            self.project_name,
            display_opt(&self.estimated_hours),
            display_opt(&self.actual_hours),
            display_opt(&self.difficulty),
            self.notes.as_deref().unwrap_or("-"),
        )?;

        if !self.categories.is_empty() || !self.steps.is_empty() || !self.materials.is_empty() {
            write!(
                f,
                " (分类={}, 步骤={}, 材料={})",
                self.categories.len(),
                self.steps.len(),
                self.materials.len()
            )?;
        }
        Ok(())
    }
}

// ==========================================
// Category - 分类 (与项目多对多)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: Option<i32>,
    pub category_name: String,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_opt(&self.category_id), self.category_name)
    }
}

// ==========================================
// Step - 步骤 (项目一对多)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: Option<i32>,
    pub project_id: Option<i32>,
    pub step_text: String,
    pub step_order: Option<i32>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", display_opt(&self.step_order), self.step_text)
    }
}

// ==========================================
// Material - 材料 (项目一对多)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub material_id: Option<i32>,
    pub project_id: Option<i32>,
    pub material_name: String,
    pub num_required: Option<i32>,
    pub cost: Option<Decimal>,
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} 成本={}",
            self.material_name,
            display_opt(&self.num_required),
            display_opt(&self.cost)
        )
    }
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
