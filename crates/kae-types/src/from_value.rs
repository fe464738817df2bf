//! Typed extraction out of a [`SqlValue`].

use kae_error::KaeError;

use crate::SqlValue;

/// Extract a Rust value from a `SqlValue`.
pub trait FromSqlValue: Sized {
    /// Try to convert a `SqlValue` reference into `Self`.
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError>;
}

fn mismatch(expected: &str, val: &SqlValue) -> KaeError {
    KaeError::type_mismatch(expected, val.typeof_str())
}

fn narrow<T: TryFrom<i64>>(val: &SqlValue, name: &str) -> Result<T, KaeError> {
    match val {
        SqlValue::Integer(n) => {
            T::try_from(*n).map_err(|_| KaeError::type_mismatch(name, format!("integer({n})")))
        }
        other => Err(mismatch("integer", other)),
    }
}

impl FromSqlValue for i16 {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        narrow(val, "i16")
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        narrow(val, "i32")
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        match val {
            SqlValue::Integer(n) => Ok(*n),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromSqlValue for u32 {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        narrow(val, "u32")
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        narrow(val, "u64")
    }
}

impl FromSqlValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        match val {
            SqlValue::Float(f) => Ok(*f),
            SqlValue::Integer(n) => Ok(*n as f64),
            other => Err(mismatch("real", other)),
        }
    }
}

impl FromSqlValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        f64::from_sql_value(val).map(|f| f as f32)
    }
}

impl FromSqlValue for String {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        match val {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        match val {
            SqlValue::Blob(b) => Ok(b.clone()),
            other => Err(mismatch("blob", other)),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        match val {
            SqlValue::Integer(n) => Ok(*n != 0),
            other => Err(mismatch("integer (bool)", other)),
        }
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        Ok(val.clone())
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(val: &SqlValue) -> Result<Self, KaeError> {
        if val.is_null() {
            Ok(None)
        } else {
            T::from_sql_value(val).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_from_integer() {
        assert_eq!(i64::from_sql_value(&SqlValue::Integer(42)).unwrap(), 42);
    }

    #[test]
    fn i32_overflow() {
        assert!(i32::from_sql_value(&SqlValue::Integer(i64::MAX)).is_err());
        assert!(i16::from_sql_value(&SqlValue::Integer(40_000)).is_err());
    }

    #[test]
    fn u64_negative_fails() {
        assert!(u64::from_sql_value(&SqlValue::Integer(-1)).is_err());
    }

    #[test]
    fn f64_from_integer_coercion() {
        let v = f64::from_sql_value(&SqlValue::Integer(42)).unwrap();
        assert!((v - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn string_from_text() {
        assert_eq!(
            String::from_sql_value(&SqlValue::Text("hello".into())).unwrap(),
            "hello"
        );
    }

    #[test]
    fn bool_from_integer() {
        assert!(bool::from_sql_value(&SqlValue::Integer(1)).unwrap());
        assert!(!bool::from_sql_value(&SqlValue::Integer(0)).unwrap());
    }

    #[test]
    fn option_none_from_null() {
        let result = Option::<i64>::from_sql_value(&SqlValue::Null).unwrap();
        assert!(result.is_none());
        let result = Option::<i64>::from_sql_value(&SqlValue::Integer(3)).unwrap();
        assert_eq!(result, Some(3));
    }

    #[test]
    fn type_mismatch_error() {
        let err = i64::from_sql_value(&SqlValue::Text("not a number".into())).unwrap_err();
        assert!(matches!(
            err,
            KaeError::TypeMismatch { ref expected, ref actual } if expected == "integer" && actual == "text"
        ));
    }
}
