//! Raw value → `sea_orm::Value` coercion against a field's declared kind.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::Value;

use crate::error::CoercionError;
use crate::kind::FieldKind;
use crate::params::RawValue;

/// Canonical date pattern (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical date-time pattern (`yyyy-MM-dd HH:mm:ss`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Canonical time pattern (`HH:mm:ss`).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Convert a raw search value into the typed value expected by `kind`.
///
/// Typed values already matching the kind pass through; anything else is
/// handled as text. Booleans are permissive: only `true` / `1` (any case)
/// are true, everything else is false.
///
/// # Errors
/// Returns `CoercionError` when the text does not parse as `kind`, when an
/// enum name is unknown, or for a multi-element list.
pub fn coerce(raw: &RawValue, kind: FieldKind) -> Result<Value, CoercionError> {
    match (raw, kind) {
        (RawValue::Text(s), _) => coerce_str(s, kind),
        (RawValue::List(items), _) => match items.as_slice() {
            [single] => coerce_str(single, kind),
            _ => Err(CoercionError::new(&raw.to_string(), kind)),
        },
        (RawValue::Int(i), FieldKind::I64) => Ok(Value::from(*i)),
        (RawValue::Int(i), FieldKind::I32) => i32::try_from(*i)
            .map(Value::from)
            .map_err(|_| CoercionError::new(&i.to_string(), kind)),
        (RawValue::Float(x), FieldKind::F64) => Ok(Value::from(*x)),
        (RawValue::Bool(b), FieldKind::Bool) => Ok(Value::from(*b)),
        (RawValue::Int(_) | RawValue::Float(_) | RawValue::Bool(_), _) => {
            coerce_str(&raw.to_string(), kind)
        }
    }
}

/// Coerce every element of a list (or a single value) for membership tests.
///
/// # Errors
/// Fails on the first element that does not coerce.
pub fn coerce_many(raw: &RawValue, kind: FieldKind) -> Result<Vec<Value>, CoercionError> {
    match raw {
        RawValue::List(items) => items.iter().map(|s| coerce_str(s, kind)).collect(),
        single => coerce(single, kind).map(|v| vec![v]),
    }
}

fn coerce_str(s: &str, kind: FieldKind) -> Result<Value, CoercionError> {
    let err = |_| CoercionError::new(s, kind);

    Ok(match kind {
        FieldKind::String => Value::from(s.to_owned()),
        FieldKind::Enum(names) => names
            .iter()
            .find(|name| **name == s)
            .map(|name| Value::from((*name).to_owned()))
            .ok_or_else(|| CoercionError::new(s, kind))?,
        FieldKind::Bool => Value::from(s.eq_ignore_ascii_case("true") || s == "1"),
        FieldKind::Date => Value::from(NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(err)?),
        FieldKind::DateTime => Value::from(
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(err)?,
        ),
        FieldKind::Time => Value::from(NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(err)?),
        FieldKind::I32 => Value::from(s.parse::<i32>().map_err(|_| CoercionError::new(s, kind))?),
        FieldKind::I64 => Value::from(s.parse::<i64>().map_err(|_| CoercionError::new(s, kind))?),
        FieldKind::F32 => {
            let x = s.parse::<f32>().map_err(|_| CoercionError::new(s, kind))?;
            if !x.is_finite() {
                return Err(CoercionError::new(s, kind));
            }
            Value::from(x)
        }
        FieldKind::F64 => {
            let x = s.parse::<f64>().map_err(|_| CoercionError::new(s, kind))?;
            if !x.is_finite() {
                return Err(CoercionError::new(s, kind));
            }
            Value::from(x)
        }
        FieldKind::Uuid => Value::from(
            s.parse::<uuid::Uuid>()
                .map_err(|_| CoercionError::new(s, kind))?,
        ),
        FieldKind::Decimal => Value::from(
            Decimal::from_str_exact(s).map_err(|_| CoercionError::new(s, kind))?,
        ),
    })
}

/// Canonical text form of a coerced value, the inverse of [`coerce`] for
/// dates, times, numbers, uuids and strings. `None` for null or unsupported
/// values.
#[must_use]
pub fn format_value(value: &Value) -> Option<String> {
    match value {
        Value::String(Some(s)) => Some(s.to_string()),
        Value::Bool(Some(b)) => Some(b.to_string()),
        Value::Int(Some(i)) => Some(i.to_string()),
        Value::BigInt(Some(i)) => Some(i.to_string()),
        Value::Float(Some(x)) => Some(x.to_string()),
        Value::Double(Some(x)) => Some(x.to_string()),
        Value::ChronoDate(Some(d)) => Some(d.format(DATE_FORMAT).to_string()),
        Value::ChronoDateTime(Some(dt)) => Some(dt.format(DATETIME_FORMAT).to_string()),
        Value::ChronoTime(Some(t)) => Some(t.format(TIME_FORMAT).to_string()),
        Value::Uuid(Some(u)) => Some(u.to_string()),
        Value::Decimal(Some(d)) => Some(d.to_string()),
        _ => None,
    }
}
