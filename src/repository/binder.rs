// ==========================================
// DIY 项目管理 - 参数绑定器
// ==========================================
// 职责: 将 (序号, 值/NULL, 声明类型) 绑定到预编译语句的占位符
// 约束: 按声明类型分派,NULL 不携带运行时类型信息
// ==========================================

use crate::repository::error::{DaoError, DaoResult};
use crate::repository::sql_value::{SqlParam, SqlType, SqlValue};
use rusqlite::types::{ToSql, ToSqlOutput, Value};
use rusqlite::Statement;

/// 绑定单个位置参数
///
/// # 参数
/// - `ordinal`: 占位符序号 (从 1 开始)
/// - `value`: 参数值,`None` 绑定为 NULL
/// - `declared`: 声明类型 (决定编码规则)
///
/// # 错误
/// - `DaoError::Binding`: 序号越界、值与声明类型不兼容
pub fn bind_parameter(
    stmt: &mut Statement<'_>,
    ordinal: usize,
    value: Option<SqlValue>,
    declared: SqlType,
) -> DaoResult<()> {
    let count = stmt.parameter_count();
    if ordinal == 0 || ordinal > count {
        return Err(DaoError::binding(
            ordinal,
            declared,
            format!("占位符序号越界 (参数个数={})", count),
        ));
    }

    let bound = encode(ordinal, value.unwrap_or(SqlValue::Null), declared)?;
    stmt.raw_bind_parameter(ordinal, bound)
        .map_err(|e| DaoError::binding(ordinal, declared, e.to_string()))
}

/// 按 Rust 类型静态推导声明类型后绑定
pub fn bind_typed<T: SqlParam + ?Sized>(
    stmt: &mut Statement<'_>,
    ordinal: usize,
    value: Option<&T>,
) -> DaoResult<()> {
    bind_parameter(stmt, ordinal, value.map(|v| v.to_sql_value()), T::SQL_TYPE)
}

/// 声明类型 → 存储编码
fn encode(ordinal: usize, value: SqlValue, declared: SqlType) -> DaoResult<Value> {
    let encoded = match (declared, value) {
        (_, SqlValue::Null) => Value::Null,
        (SqlType::Text, SqlValue::Text(v)) => Value::Text(v),
        (SqlType::Integer, SqlValue::Integer(v)) => Value::Integer(v),
        // 定点数以规范文本写入,由列亲和性决定存储形式
        (SqlType::Decimal, SqlValue::Decimal(v)) => Value::Text(v.to_string()),
        (SqlType::Decimal, SqlValue::Integer(v)) => Value::Integer(v),
        (SqlType::Double, SqlValue::Double(v)) => Value::Real(v),
        (SqlType::Double, SqlValue::Integer(v)) => Value::Real(v as f64),
        (SqlType::Date, SqlValue::Date(v)) => encode_chrono(ordinal, declared, &v)?,
        (SqlType::Time, SqlValue::Time(v)) => encode_chrono(ordinal, declared, &v)?,
        (SqlType::DateTime, SqlValue::DateTime(v)) => encode_chrono(ordinal, declared, &v)?,
        (SqlType::Timestamp, SqlValue::Timestamp(v)) => encode_chrono(ordinal, declared, &v)?,
        (SqlType::Blob, SqlValue::Blob(v)) => Value::Blob(v),
        (_, other) => {
            return Err(DaoError::binding(
                ordinal,
                declared,
                format!("值类型 {} 与声明类型不兼容", other.type_name()),
            ))
        }
    };
    Ok(encoded)
}

/// 日期时间沿用 rusqlite chrono 特性的文本编码
fn encode_chrono<T: ToSql>(ordinal: usize, declared: SqlType, value: &T) -> DaoResult<Value> {
    let output = value
        .to_sql()
        .map_err(|e| DaoError::binding(ordinal, declared, e.to_string()))?;

    match output {
        ToSqlOutput::Borrowed(v) => Ok(v.into()),
        ToSqlOutput::Owned(v) => Ok(v),
        _ => Err(DaoError::binding(ordinal, declared, "不支持的编码输出")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE sample (
                c_text TEXT,
                c_int INT,
                c_dec DECIMAL(7, 2),
                c_real REAL,
                c_date DATE,
                c_ts TEXT,
                c_blob BLOB
            );
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_bind_all_supported_types() {
        let conn = setup();
        let mut stmt = conn
            .prepare("INSERT INTO sample VALUES (?, ?, ?, ?, ?, ?, ?)")
            .unwrap();

        bind_typed(&mut stmt, 1, Some("shed")).unwrap();
        bind_typed(&mut stmt, 2, Some(&3_i32)).unwrap();
        bind_typed(&mut stmt, 3, Some(&Decimal::new(1050, 2))).unwrap();
        bind_typed(&mut stmt, 4, Some(&2.5_f64)).unwrap();
        bind_typed(
            &mut stmt,
            5,
            Some(&NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        )
        .unwrap();
        bind_typed(
            &mut stmt,
            6,
            Some(&Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()),
        )
        .unwrap();
        bind_typed(&mut stmt, 7, Some(&[1_u8, 2, 3][..])).unwrap();
        assert_eq!(stmt.raw_execute().unwrap(), 1);
        drop(stmt);

        let (text, int, dec, date, blob): (String, i64, f64, String, Vec<u8>) = conn
            .query_row(
                "SELECT c_text, c_int, c_dec, c_date, c_blob FROM sample",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .unwrap();
        assert_eq!(text, "shed");
        assert_eq!(int, 3);
        assert_eq!(dec, 10.5);
        assert_eq!(date, "2024-05-01");
        assert_eq!(blob, vec![1, 2, 3]);
    }

    #[test]
    fn test_typed_null_binds_sql_null() {
        let conn = setup();
        let mut stmt = conn
            .prepare("INSERT INTO sample (c_dec, c_int) VALUES (?, ?)")
            .unwrap();

        bind_typed::<Decimal>(&mut stmt, 1, None).unwrap();
        bind_parameter(&mut stmt, 2, None, SqlType::Integer).unwrap();
        stmt.raw_execute().unwrap();
        drop(stmt);

        let (dec_type, int_type): (String, String) = conn
            .query_row("SELECT typeof(c_dec), typeof(c_int) FROM sample", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(dec_type, "null");
        assert_eq!(int_type, "null");
    }

    #[test]
    fn test_mismatched_value_is_binding_error() {
        let conn = setup();
        let mut stmt = conn.prepare("INSERT INTO sample (c_int) VALUES (?)").unwrap();

        let err = bind_parameter(
            &mut stmt,
            1,
            Some(SqlValue::Text("three".to_string())),
            SqlType::Integer,
        )
        .unwrap_err();

        match err {
            DaoError::Binding {
                ordinal,
                declared_type,
                message,
            } => {
                assert_eq!(ordinal, 1);
                assert_eq!(declared_type, SqlType::Integer);
                assert!(message.contains("TEXT"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ordinal_out_of_range_is_binding_error() {
        let conn = setup();
        let mut stmt = conn.prepare("INSERT INTO sample (c_int) VALUES (?)").unwrap();

        assert!(matches!(
            bind_typed(&mut stmt, 2, Some(&1_i32)),
            Err(DaoError::Binding { ordinal: 2, .. })
        ));
        assert!(matches!(
            bind_typed(&mut stmt, 0, Some(&1_i32)),
            Err(DaoError::Binding { ordinal: 0, .. })
        ));
    }

    #[test]
    fn test_integer_widens_into_decimal() {
        let conn = setup();
        let mut stmt = conn.prepare("INSERT INTO sample (c_dec) VALUES (?)").unwrap();

        bind_parameter(&mut stmt, 1, Some(SqlValue::Integer(4)), SqlType::Decimal).unwrap();
        stmt.raw_execute().unwrap();
        drop(stmt);

        let value: i64 = conn
            .query_row("SELECT c_dec FROM sample", [], |r| r.get(0))
            .unwrap();
        assert_eq!(value, 4);
    }
}
