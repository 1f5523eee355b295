// ==========================================
// 项目聚合 - 字段映射表
// ==========================================
// 对齐: schema project / category / step / material
// ==========================================

use crate::domain::project::{Category, Material, Project, Step};
use crate::repository::row_mapper::{FieldMapping, MappedEntity};
use crate::repository::sql_value::{SqlType, SqlValue};
use rust_decimal::Decimal;

/// 工时/成本列的小数位数 (DECIMAL(7,2))
pub const MONEY_SCALE: u32 = 2;

fn fixed_point(value: SqlValue) -> Result<Option<Decimal>, String> {
    Ok(value.into_decimal()?.map(|mut d| {
        d.rescale(MONEY_SCALE);
        d
    }))
}

fn required_text(value: SqlValue) -> Result<String, String> {
    value
        .into_text()?
        .ok_or_else(|| "列值为 NULL, 但字段不可为空".to_string())
}

// ===== Project =====

fn set_project_id(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.project_id = v.into_i32()?;
    Ok(())
}

fn set_project_name(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.project_name = required_text(v)?;
    Ok(())
}

fn set_estimated_hours(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.estimated_hours = fixed_point(v)?;
    Ok(())
}

fn set_actual_hours(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.actual_hours = fixed_point(v)?;
    Ok(())
}

fn set_difficulty(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.difficulty = v.into_i32()?;
    Ok(())
}

fn set_notes(p: &mut Project, v: SqlValue) -> Result<(), String> {
    p.notes = v.into_text()?;
    Ok(())
}

impl MappedEntity for Project {
    const ENTITY: &'static str = "Project";
    const FIELDS: &'static [FieldMapping<Self>] = &[
        FieldMapping {
            field: "project_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_project_id,
        },
        FieldMapping {
            field: "project_name",
            sql_type: SqlType::Text,
            nullable: false,
            set: set_project_name,
        },
        FieldMapping {
            field: "estimated_hours",
            sql_type: SqlType::Decimal,
            nullable: true,
            set: set_estimated_hours,
        },
        FieldMapping {
            field: "actual_hours",
            sql_type: SqlType::Decimal,
            nullable: true,
            set: set_actual_hours,
        },
        FieldMapping {
            field: "difficulty",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_difficulty,
        },
        FieldMapping {
            field: "notes",
            sql_type: SqlType::Text,
            nullable: true,
            set: set_notes,
        },
    ];
}

// ===== Category =====

fn set_category_id(c: &mut Category, v: SqlValue) -> Result<(), String> {
    c.category_id = v.into_i32()?;
    Ok(())
}

fn set_category_name(c: &mut Category, v: SqlValue) -> Result<(), String> {
    c.category_name = required_text(v)?;
    Ok(())
}

impl MappedEntity for Category {
    const ENTITY: &'static str = "Category";
    const FIELDS: &'static [FieldMapping<Self>] = &[
        FieldMapping {
            field: "category_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_category_id,
        },
        FieldMapping {
            field: "category_name",
            sql_type: SqlType::Text,
            nullable: false,
            set: set_category_name,
        },
    ];
}

// ===== Step =====

fn set_step_id(s: &mut Step, v: SqlValue) -> Result<(), String> {
    s.step_id = v.into_i32()?;
    Ok(())
}

fn set_step_project_id(s: &mut Step, v: SqlValue) -> Result<(), String> {
    s.project_id = v.into_i32()?;
    Ok(())
}

fn set_step_text(s: &mut Step, v: SqlValue) -> Result<(), String> {
    s.step_text = required_text(v)?;
    Ok(())
}

fn set_step_order(s: &mut Step, v: SqlValue) -> Result<(), String> {
    s.step_order = v.into_i32()?;
    Ok(())
}

impl MappedEntity for Step {
    const ENTITY: &'static str = "Step";
    const FIELDS: &'static [FieldMapping<Self>] = &[
        FieldMapping {
            field: "step_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_step_id,
        },
        FieldMapping {
            field: "project_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_step_project_id,
        },
        FieldMapping {
            field: "step_text",
            sql_type: SqlType::Text,
            nullable: false,
            set: set_step_text,
        },
        FieldMapping {
            field: "step_order",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_step_order,
        },
    ];
}

// ===== Material =====

fn set_material_id(m: &mut Material, v: SqlValue) -> Result<(), String> {
    m.material_id = v.into_i32()?;
    Ok(())
}

fn set_material_project_id(m: &mut Material, v: SqlValue) -> Result<(), String> {
    m.project_id = v.into_i32()?;
    Ok(())
}

fn set_material_name(m: &mut Material, v: SqlValue) -> Result<(), String> {
    m.material_name = required_text(v)?;
    Ok(())
}

fn set_num_required(m: &mut Material, v: SqlValue) -> Result<(), String> {
    m.num_required = v.into_i32()?;
    Ok(())
}

fn set_cost(m: &mut Material, v: SqlValue) -> Result<(), String> {
    m.cost = fixed_point(v)?;
    Ok(())
}

impl MappedEntity for Material {
    const ENTITY: &'static str = "Material";
    const FIELDS: &'static [FieldMapping<Self>] = &[
        FieldMapping {
            field: "material_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_material_id,
        },
        FieldMapping {
            field: "project_id",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_material_project_id,
        },
        FieldMapping {
            field: "material_name",
            sql_type: SqlType::Text,
            nullable: false,
            set: set_material_name,
        },
        FieldMapping {
            field: "num_required",
            sql_type: SqlType::Integer,
            nullable: true,
            set: set_num_required,
        },
        FieldMapping {
            field: "cost",
            sql_type: SqlType::Decimal,
            nullable: true,
            set: set_cost,
        },
    ];
}
