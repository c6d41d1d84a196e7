//! Owned positional argument values.
//!
//! Builders store arguments as [`Value`]s rather than shared trait objects, so
//! cloning a builder copies every argument and compiled argument lists can be
//! compared and logged.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// A single bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Value {
    /// Convert a JSON value, keeping scalars as scalars.
    ///
    /// Integers that fit in `i64` become `BigInt`, other numbers `Double`;
    /// arrays and objects stay `Json`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::BigInt(i),
                None => match n.as_f64() {
                    Some(f) => Value::Double(f),
                    None => Value::Json(serde_json::Value::Number(n)),
                },
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Postgres-flavoured name of the variant, used when parameter values
    /// are not logged.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::SmallInt(_) => "int2",
            Value::Int(_) => "int4",
            Value::BigInt(_) => "int8",
            Value::Real(_) => "float4",
            Value::Double(_) => "float8",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytea",
            Value::Json(_) => "jsonb",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
        }
    }
}

type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

impl ToSql for Value {
    /// Encode for the parameter type the server inferred.
    ///
    /// Integers and floats are resized to the column width (narrowing is
    /// range-checked), and text is parsed for `uuid`, `date` and timestamp
    /// columns. Anything else goes through the inner type's checked encoder,
    /// so a real mismatch is an encode error rather than corrupt bytes.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::SmallInt(v) => encode_int(i64::from(*v), ty, out),
            Value::Int(v) => encode_int(i64::from(*v), ty, out),
            Value::BigInt(v) => encode_int(*v, ty, out),
            Value::Real(v) => encode_float(f64::from(*v), ty, out),
            Value::Double(v) => encode_float(*v, ty, out),
            Value::Text(v) => encode_text(v, ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::TimestampTz(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn encode_int(v: i64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

fn encode_float(v: f64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    if *ty == Type::FLOAT4 {
        (v as f32).to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

fn encode_text(v: &str, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    if *ty == Type::UUID {
        Uuid::parse_str(v)?.to_sql_checked(ty, out)
    } else if *ty == Type::TIMESTAMPTZ {
        DateTime::parse_from_rfc3339(v)?
            .with_timezone(&Utc)
            .to_sql_checked(ty, out)
    } else if *ty == Type::TIMESTAMP {
        v.parse::<NaiveDateTime>()?.to_sql_checked(ty, out)
    } else if *ty == Type::DATE {
        v.parse::<NaiveDate>()?.to_sql_checked(ty, out)
    } else {
        v.to_sql_checked(ty, out)
    }
}

macro_rules! impl_from_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Real,
    f64 => Double,
    String => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::BigInt(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```
/// use pipehood::{values, Value};
///
/// let args = values![1i32, "alice", None::<i64>];
/// assert_eq!(args, vec![Value::Int(1), Value::Text("alice".into()), Value::Null]);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($v:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($v)),+]
    };
}
