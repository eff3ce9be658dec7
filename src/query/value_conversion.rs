//! Value conversion utilities for SeaQuery to may_postgres.
//!
//! Relation lookups bind foreign keys as query parameters. Foreign keys are
//! integers, strings, UUIDs or raw bytes, so only those value kinds (and their
//! nulls) are converted here; anything else is rejected.

use crate::executor::LifeError;
use may_postgres::types::ToSql;
use sea_query::{Value, Values};
use uuid::Uuid;

type Param = Box<dyn ToSql + Sync>;

/// Convert a single identifier value into an owned `ToSql` parameter.
///
/// # Errors
///
/// Returns `LifeError::Other` for value kinds that cannot be a foreign key,
/// and for `BigUnsigned` values above `i64::MAX`.
pub fn to_param(value: &Value) -> Result<Param, LifeError> {
    let param: Param = match value {
        Value::TinyInt(v) => Box::new(v.map(i32::from)),
        Value::SmallInt(v) => Box::new(v.map(i32::from)),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i32::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(Some(u)) => {
            let signed = i64::try_from(*u).map_err(|_| {
                LifeError::Other(format!(
                    "BigUnsigned value {} exceeds i64::MAX ({}), cannot be safely cast to i64",
                    u,
                    i64::MAX
                ))
            })?;
            Box::new(Some(signed))
        }
        Value::BigUnsigned(None) => Box::new(None::<i64>),
        Value::String(v) => Box::new(v.as_ref().map(|s| s.to_string())),
        Value::Bytes(v) => Box::new(v.as_ref().map(|b| b.to_vec())),
        Value::Uuid(v) => Box::new(v.as_ref().map(|u| Uuid::from_bytes(*u.as_bytes()))),
        _ => {
            return Err(LifeError::Other(format!(
                "Unsupported identifier type in query: {:?}",
                value
            )));
        }
    };
    Ok(param)
}

/// Convert SeaQuery values to may_postgres ToSql parameters and run `f` with them.
///
/// The converted parameters only live for the duration of the closure, which is
/// where the query has to run.
///
/// # Errors
///
/// Returns the first conversion error, or whatever `f` returns.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, LifeError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, LifeError>,
{
    let owned = values.iter().map(to_param).collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| p.as_ref() as &dyn ToSql).collect();
    f(&params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_kinds_convert() {
        let values = Values(vec![
            Value::Int(Some(7)),
            Value::BigInt(Some(42)),
            Value::String(Some("post-42".into())),
            Value::Uuid(Some(Uuid::new_v4().into())),
            Value::BigInt(None),
        ]);

        let count = with_converted_params(&values, |params| Ok(params.len())).unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_big_unsigned_overflow_is_rejected() {
        let err = to_param(&Value::BigUnsigned(Some(u64::MAX))).err().unwrap();
        assert!(err.to_string().contains("exceeds i64::MAX"));
    }

    #[test]
    fn test_non_identifier_kind_is_rejected() {
        let values = Values(vec![Value::BigInt(Some(1)), Value::Double(Some(1.5))]);

        let result = with_converted_params(&values, |_| Ok(()));
        match result {
            Err(LifeError::Other(msg)) => assert!(msg.contains("Unsupported identifier type")),
            other => panic!("expected conversion error, got {other:?}"),
        }
    }

    #[test]
    fn test_closure_error_is_returned_unchanged() {
        let values = Values(vec![Value::BigInt(Some(1))]);

        let result: Result<(), _> = with_converted_params(&values, |_| {
            Err(LifeError::QueryError("connection reset".into()))
        });
        assert!(matches!(result, Err(LifeError::QueryError(ref m)) if m == "connection reset"));
    }
}
