// ==========================================
// DIY 项目管理 - 通用行映射器
// ==========================================
// 职责: 结果行 → 实体,按"去下划线 + 忽略大小写"的名称匹配列与字段
// 方式: 每个实体声明一张静态映射表 (字段名, 声明类型, 可空, setter)
//       映射表按语句解析一次列序号,逐行复用
// ==========================================

use crate::repository::error::{DaoError, DaoResult};
use crate::repository::sql_value::{SqlType, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::{FromSql, ValueRef};
use rusqlite::{Row, Statement};
use rust_decimal::Decimal;
use std::str::FromStr;

/// 字段映射描述符
pub struct FieldMapping<T> {
    /// 实体字段名
    pub field: &'static str,
    /// 字段声明类型
    pub sql_type: SqlType,
    /// 是否允许 NULL
    pub nullable: bool,
    /// 写入字段 (值已按声明类型转换)
    pub set: fn(&mut T, SqlValue) -> Result<(), String>,
}

/// 可由行映射器构造的实体
pub trait MappedEntity: Default + Sized + 'static {
    /// 实体名 (用于日志与错误)
    const ENTITY: &'static str;

    /// 字段映射表
    const FIELDS: &'static [FieldMapping<Self>];
}

/// 名称规范化: 去掉下划线并转小写
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

struct ColumnBinding<T: 'static> {
    index: usize,
    column: String,
    mapping: &'static FieldMapping<T>,
}

// ==========================================
// RowMapper - 已解析列序号的映射器
// ==========================================
pub struct RowMapper<T: MappedEntity> {
    bindings: Vec<ColumnBinding<T>>,
}

impl<T: MappedEntity> RowMapper<T> {
    /// 按结果集列名解析映射
    ///
    /// # 错误
    /// - 字段找不到对应列
    /// - 字段匹配到多于一列 (歧义)
    pub fn for_columns<S: AsRef<str>>(columns: &[S]) -> DaoResult<Self> {
        let normalized: Vec<String> = columns
            .iter()
            .map(|c| normalize_name(c.as_ref()))
            .collect();

        let mut bindings = Vec::with_capacity(T::FIELDS.len());
        for mapping in T::FIELDS {
            let key = normalize_name(mapping.field);
            let matches: Vec<usize> = normalized
                .iter()
                .enumerate()
                .filter(|(_, name)| **name == key)
                .map(|(idx, _)| idx)
                .collect();

            match matches.as_slice() {
                [index] => bindings.push(ColumnBinding {
                    index: *index,
                    column: columns[*index].as_ref().to_string(),
                    mapping,
                }),
                [] => {
                    return Err(DaoError::mapping(
                        format!("{}.{}", T::ENTITY, mapping.field),
                        "-",
                        "结果集中缺少对应列",
                    ))
                }
                many => {
                    let names = many
                        .iter()
                        .map(|idx| columns[*idx].as_ref())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(DaoError::mapping(
                        format!("{}.{}", T::ENTITY, mapping.field),
                        names,
                        "多个列匹配同一字段",
                    ));
                }
            }
        }

        Ok(Self { bindings })
    }

    /// 按预编译语句的列名解析映射
    pub fn for_statement(stmt: &Statement<'_>) -> DaoResult<Self> {
        Self::for_columns(&stmt.column_names())
    }

    /// 映射单行
    pub fn map_row(&self, row: &Row<'_>) -> DaoResult<T> {
        let mut entity = T::default();

        for binding in &self.bindings {
            let mapping = binding.mapping;
            let fail = |message: String| {
                DaoError::mapping(
                    format!("{}.{}", T::ENTITY, mapping.field),
                    binding.column.clone(),
                    message,
                )
            };

            let raw = row.get_ref(binding.index)?;
            let value = read_column(raw, mapping.sql_type).map_err(&fail)?;

            if value.is_null() && !mapping.nullable {
                return Err(fail("列值为 NULL, 但字段不可为空".to_string()));
            }

            (mapping.set)(&mut entity, value).map_err(&fail)?;
        }

        Ok(entity)
    }
}

/// 执行已绑定参数的查询,映射全部行
pub fn query_entities<T: MappedEntity>(stmt: &mut Statement<'_>) -> DaoResult<Vec<T>> {
    let mapper = RowMapper::<T>::for_statement(stmt)?;
    let mut rows = stmt.raw_query();

    let mut entities = Vec::new();
    while let Some(row) = rows.next()? {
        entities.push(mapper.map_row(row)?);
    }
    Ok(entities)
}

/// 执行已绑定参数的查询,只映射第一行
pub fn query_first_entity<T: MappedEntity>(stmt: &mut Statement<'_>) -> DaoResult<Option<T>> {
    let mapper = RowMapper::<T>::for_statement(stmt)?;
    let mut rows = stmt.raw_query();

    match rows.next()? {
        Some(row) => Ok(Some(mapper.map_row(row)?)),
        None => Ok(None),
    }
}

/// 列原生类型 → 声明类型
fn read_column(raw: ValueRef<'_>, declared: SqlType) -> Result<SqlValue, String> {
    if let ValueRef::Null = raw {
        return Ok(SqlValue::Null);
    }

    let value = match (declared, raw) {
        (SqlType::Text, ValueRef::Text(bytes)) => SqlValue::Text(
            std::str::from_utf8(bytes)
                .map_err(|e| format!("文本不是合法 UTF-8: {}", e))?
                .to_string(),
        ),
        (SqlType::Integer, ValueRef::Integer(v)) => SqlValue::Integer(v),
        (SqlType::Decimal, ValueRef::Integer(v)) => SqlValue::Decimal(Decimal::from(v)),
        // REAL 存储按最短十进制表示转换,避免二进制浮点展开
        (SqlType::Decimal, ValueRef::Real(v)) => SqlValue::Decimal(
            Decimal::from_str(&v.to_string())
                .map_err(|e| format!("无法转换为定点数: {}", e))?,
        ),
        (SqlType::Decimal, ValueRef::Text(bytes)) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| format!("文本不是合法 UTF-8: {}", e))?;
            SqlValue::Decimal(
                Decimal::from_str_exact(text.trim())
                    .map_err(|e| format!("无法解析为定点数 '{}': {}", text, e))?,
            )
        }
        (SqlType::Double, ValueRef::Real(v)) => SqlValue::Double(v),
        (SqlType::Double, ValueRef::Integer(v)) => SqlValue::Double(v as f64),
        (SqlType::Date, raw) => {
            SqlValue::Date(NaiveDate::column_result(raw).map_err(|e| e.to_string())?)
        }
        (SqlType::Time, raw) => {
            SqlValue::Time(NaiveTime::column_result(raw).map_err(|e| e.to_string())?)
        }
        (SqlType::DateTime, raw) => {
            SqlValue::DateTime(NaiveDateTime::column_result(raw).map_err(|e| e.to_string())?)
        }
        (SqlType::Timestamp, raw) => {
            SqlValue::Timestamp(DateTime::<Utc>::column_result(raw).map_err(|e| e.to_string())?)
        }
        (SqlType::Blob, ValueRef::Blob(bytes)) => SqlValue::Blob(bytes.to_vec()),
        (declared, raw) => {
            return Err(format!(
                "列原生类型 {} 无法转换为 {}",
                raw.data_type(),
                declared
            ))
        }
    };

    Ok(value)
}
