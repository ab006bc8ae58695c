//! Canonical JSON bytes for digest computation.
//!
//! A value is first lowered to a `serde_json::Value` and then written in
//! JCS form (RFC 8785): object keys sorted, compact separators, no
//! whitespace. Two values with the same fields therefore produce the same
//! bytes regardless of struct field order or map insertion order.

use serde::Serialize;

use crate::hasher::HasherError;

/// Canonical byte encoding of any serializable value.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HasherError> {
    let value =
        serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
    serde_jcs::to_vec(&value).map_err(|e| HasherError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Forward {
        alpha: &'static str,
        beta: u32,
    }

    #[derive(Serialize)]
    struct Reversed {
        beta: u32,
        alpha: &'static str,
    }

    #[test]
    fn keys_are_sorted() {
        let bytes = canonical_bytes(&Reversed {
            beta: 2,
            alpha: "a",
        })
        .unwrap();
        assert_eq!(bytes, br#"{"alpha":"a","beta":2}"#);
    }

    #[test]
    fn field_order_does_not_matter() {
        let a = canonical_bytes(&Forward {
            alpha: "x",
            beta: 7,
        })
        .unwrap();
        let b = canonical_bytes(&Reversed {
            beta: 7,
            alpha: "x",
        })
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nested_objects_sorted_arrays_kept() {
        let value = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let bytes = canonical_bytes(&value).unwrap();
        assert_eq!(bytes, br#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn non_ascii_strings_kept_verbatim() {
        let bytes = canonical_bytes(&serde_json::json!({"price": "₹20/kg"})).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"price":"₹20/kg"}"#);
    }
}
