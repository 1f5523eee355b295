// ==========================================
// DIY 项目管理 - SQL 类型与值
// ==========================================
// 职责: 声明类型 (SqlType) 与带类型的值 (SqlValue)
// 说明: 绑定与映射都按"声明类型"分派,不依赖运行时值
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

// ==========================================
// SqlType - 声明类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Text,
    Integer,
    Decimal,
    Double,
    Date,
    Time,
    DateTime,
    Timestamp,
    Blob,
}

impl SqlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Decimal => "DECIMAL",
            SqlType::Double => "DOUBLE",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::DateTime => "DATETIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Blob => "BLOB",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// SqlValue - 带类型的值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Double(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// 值本身的类型名 (NULL 无类型)
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Text(_) => SqlType::Text.as_str(),
            SqlValue::Integer(_) => SqlType::Integer.as_str(),
            SqlValue::Decimal(_) => SqlType::Decimal.as_str(),
            SqlValue::Double(_) => SqlType::Double.as_str(),
            SqlValue::Date(_) => SqlType::Date.as_str(),
            SqlValue::Time(_) => SqlType::Time.as_str(),
            SqlValue::DateTime(_) => SqlType::DateTime.as_str(),
            SqlValue::Timestamp(_) => SqlType::Timestamp.as_str(),
            SqlValue::Blob(_) => SqlType::Blob.as_str(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn into_text(self) -> Result<Option<String>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Text, &other)),
        }
    }

    pub fn into_i64(self) -> Result<Option<i64>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Integer(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Integer, &other)),
        }
    }

    /// 整数收窄为 i32,溢出视为错误
    pub fn into_i32(self) -> Result<Option<i32>, String> {
        match self.into_i64()? {
            None => Ok(None),
            Some(v) => i32::try_from(v)
                .map(Some)
                .map_err(|_| format!("整数超出 i32 范围: {}", v)),
        }
    }

    pub fn into_decimal(self) -> Result<Option<Decimal>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Decimal(v) => Ok(Some(v)),
            SqlValue::Integer(v) => Ok(Some(Decimal::from(v))),
            other => Err(mismatch(SqlType::Decimal, &other)),
        }
    }

    pub fn into_f64(self) -> Result<Option<f64>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Double(v) => Ok(Some(v)),
            SqlValue::Integer(v) => Ok(Some(v as f64)),
            other => Err(mismatch(SqlType::Double, &other)),
        }
    }

    pub fn into_date(self) -> Result<Option<NaiveDate>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Date(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Date, &other)),
        }
    }

    pub fn into_time(self) -> Result<Option<NaiveTime>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Time(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Time, &other)),
        }
    }

    pub fn into_datetime(self) -> Result<Option<NaiveDateTime>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::DateTime(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::DateTime, &other)),
        }
    }

    pub fn into_timestamp(self) -> Result<Option<DateTime<Utc>>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Timestamp(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Timestamp, &other)),
        }
    }

    pub fn into_blob(self) -> Result<Option<Vec<u8>>, String> {
        match self {
            SqlValue::Null => Ok(None),
            SqlValue::Blob(v) => Ok(Some(v)),
            other => Err(mismatch(SqlType::Blob, &other)),
        }
    }
}

fn mismatch(expected: SqlType, actual: &SqlValue) -> String {
    format!("期望 {} 值, 实际为 {}", expected, actual.type_name())
}

// ==========================================
// SqlParam - 静态声明类型的参数
// ==========================================
/// Rust 类型到声明类型的静态映射
///
/// `Option<&T>` 为 `None` 时仍可通过 `T::SQL_TYPE` 得到声明类型,
/// 这是 `bind_typed` 能正确绑定"有类型的 NULL"的前提。
pub trait SqlParam {
    const SQL_TYPE: SqlType;

    fn to_sql_value(&self) -> SqlValue;
}

impl SqlParam for str {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl SqlParam for String {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl SqlParam for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Integer(i64::from(*self))
    }
}

impl SqlParam for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Integer(*self)
    }
}

impl SqlParam for Decimal {
    const SQL_TYPE: SqlType = SqlType::Decimal;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Decimal(*self)
    }
}

impl SqlParam for f64 {
    const SQL_TYPE: SqlType = SqlType::Double;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Double(*self)
    }
}

impl SqlParam for NaiveDate {
    const SQL_TYPE: SqlType = SqlType::Date;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Date(*self)
    }
}

impl SqlParam for NaiveTime {
    const SQL_TYPE: SqlType = SqlType::Time;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Time(*self)
    }
}

impl SqlParam for NaiveDateTime {
    const SQL_TYPE: SqlType = SqlType::DateTime;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::DateTime(*self)
    }
}

impl SqlParam for DateTime<Utc> {
    const SQL_TYPE: SqlType = SqlType::Timestamp;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Timestamp(*self)
    }
}

impl SqlParam for [u8] {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl SqlParam for Vec<u8> {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Blob(self.clone())
    }
}
