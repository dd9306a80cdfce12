// Resource entities. Every entity is built from a server JSON payload and
// keeps that payload in `info`; typed fields are copied out of it.

pub mod backend;
pub mod key;
pub mod machine;
pub mod tunnel;

pub use backend::{Backend, NewBackend};
pub use key::Key;
pub use machine::{Machine, MachineAction, NewMachine};
pub use tunnel::{parse_cidrs, Tunnel, TunnelRequest};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::MistError;

/// Decode a collection endpoint's payload. Falsy payloads (`null`, `false`,
/// `0`, `""`, `{}`) count as an empty list; any other non-array is a
/// parse error.
pub(crate) fn decode_list(payload: Value) -> Result<Vec<Value>, MistError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Field deserializer mapping an explicit `null` to the type's default.
pub(crate) fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_payload_is_an_empty_list() {
        assert!(decode_list(Value::Null).expect("decode").is_empty());
    }

    #[test]
    fn falsy_payloads_are_empty_lists() {
        for payload in [json!({}), json!(false), json!(0), json!("")] {
            assert!(decode_list(payload).expect("decode").is_empty());
        }
    }

    #[test]
    fn truthy_scalar_is_a_parse_error() {
        let err = decode_list(json!("machines")).unwrap_err();
        assert!(matches!(err, MistError::Parse(_)));
    }

    #[test]
    fn object_payload_is_a_parse_error() {
        let err = decode_list(json!({"error": "nope"})).unwrap_err();
        assert!(matches!(err, MistError::Parse(_)));
    }
}
