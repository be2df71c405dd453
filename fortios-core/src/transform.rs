//! Per-field value transforms between wire JSON and state values

use serde_json::json;

use crate::resource::Value;
use crate::schema::{AttributeType, validate_cidr, validate_netmask};

/// Transform applied to a field on its way in (flatten) and out (expand)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Type-directed copy
    #[default]
    Identity,
    /// Integer fields the device may report as numeric strings
    IntCoerce,
    /// "a.b.c.d m.m.m.m" on the wire, "a.b.c.d/len" in state
    IpMask,
    /// `[{"name": x}, ...]` on the wire, a list of strings in state
    NameList,
}

/// Error raised by an expand transform
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("expected {expected}, got {got}")]
    Unexpected { expected: String, got: String },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("invalid address '{value}': {message}")]
    InvalidAddress { value: String, message: String },
}

impl Transform {
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::IntCoerce => "int_coerce",
            Transform::IpMask => "ip_mask",
            Transform::NameList => "name_list",
        }
    }

    /// Wire value -> state value.
    ///
    /// Never fails: a value of the wrong shape is passed through as-is and
    /// left for the state writer to reject. `null` yields `None`.
    pub fn flatten(&self, value: &serde_json::Value, attr_type: &AttributeType) -> Option<Value> {
        match (self, value) {
            (_, serde_json::Value::Null) => None,

            (Transform::IntCoerce, serde_json::Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Some(Value::Int(n)),
                Err(_) => Some(Value::String(s.clone())),
            },

            (Transform::IpMask, serde_json::Value::String(s)) => {
                Some(Value::String(ipmask_to_cidr(s).unwrap_or_else(|| s.clone())))
            }

            (Transform::NameList, serde_json::Value::Array(items)) => {
                let names: Option<Vec<Value>> = items
                    .iter()
                    .map(|item| {
                        item.get("name")
                            .and_then(|n| n.as_str())
                            .map(|n| Value::String(n.to_string()))
                    })
                    .collect();
                names.map(Value::List).or_else(|| Value::from_json(value))
            }

            (_, serde_json::Value::Number(n)) if is_int(attr_type) => Some(
                n.as_i64()
                    .or_else(|| integral_float(n))
                    .map(Value::Int)
                    .unwrap_or_else(|| Value::String(n.to_string())),
            ),

            _ => Value::from_json(value),
        }
    }

    /// State value -> wire value
    pub fn expand(&self, value: &Value) -> Result<serde_json::Value, TransformError> {
        match (self, value) {
            (Transform::Identity, v) => Ok(v.to_json()),

            (Transform::IntCoerce, Value::Int(n)) => Ok(json!(n)),
            (Transform::IntCoerce, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(|n| json!(n))
                .map_err(|_| TransformError::NotANumber(s.clone())),

            (Transform::IpMask, Value::String(s)) => cidr_to_ipmask(s).map(|s| json!(s)),

            (Transform::NameList, Value::List(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(name) => Ok(json!({ "name": name })),
                    other => Err(TransformError::Unexpected {
                        expected: "String".to_string(),
                        got: other.type_name(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),

            (transform, other) => Err(TransformError::Unexpected {
                expected: match transform {
                    Transform::NameList => "List".to_string(),
                    Transform::IntCoerce => "Int".to_string(),
                    _ => "String".to_string(),
                },
                got: other.type_name(),
            }),
        }
    }
}

fn is_int(attr_type: &AttributeType) -> bool {
    matches!(attr_type.base(), AttributeType::Int)
}

/// `3.0` -> 3. Numbers outside the i64 range are left unconverted.
fn integral_float(n: &serde_json::Number) -> Option<i64> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

/// "10.0.0.0 255.0.0.0" -> "10.0.0.0/8", `None` if the input is not an
/// address/mask pair with a contiguous mask
fn ipmask_to_cidr(s: &str) -> Option<String> {
    let mut parts = s.split_whitespace();
    let ip = parts.next()?;
    let mask = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    crate::schema::validate_ipv4(ip).ok()?;
    let prefix = validate_netmask(mask).ok()?;
    Some(format!("{}/{}", ip, prefix))
}

/// "10.0.0.0/8" -> "10.0.0.0 255.0.0.0"; an address/mask pair is passed
/// through unchanged
fn cidr_to_ipmask(s: &str) -> Result<String, TransformError> {
    if ipmask_to_cidr(s).is_some() {
        return Ok(s.to_string());
    }
    validate_cidr(s).map_err(|message| TransformError::InvalidAddress {
        value: s.to_string(),
        message,
    })?;
    let (ip, prefix) = s.split_once('/').unwrap_or((s, "32"));
    let prefix: u32 = prefix.parse().unwrap_or(32);
    let bits: u32 = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    let mask = bits.to_be_bytes();
    Ok(format!(
        "{} {}.{}.{}.{}",
        ip, mask[0], mask[1], mask[2], mask[3]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_flatten_is_type_directed() {
        let t = Transform::Identity;
        assert_eq!(t.flatten(&json!(3), &AttributeType::Int), Some(Value::Int(3)));
        assert_eq!(
            t.flatten(&json!(3.0), &AttributeType::Int),
            Some(Value::Int(3))
        );
        assert_eq!(
            t.flatten(&json!("enable"), &AttributeType::String),
            Some(Value::String("enable".to_string()))
        );
        assert_eq!(t.flatten(&json!(null), &AttributeType::String), None);
    }

    #[test]
    fn out_of_range_numbers_are_not_clamped() {
        let t = Transform::Identity;
        assert_eq!(
            t.flatten(&json!(u64::MAX), &AttributeType::Int),
            Some(Value::String("18446744073709551615".to_string()))
        );
        assert_eq!(
            t.flatten(&json!(1e30), &AttributeType::Int),
            Some(Value::String("1e30".to_string()))
        );
        assert_eq!(
            t.flatten(&json!(-4.0), &AttributeType::Int),
            Some(Value::Int(-4))
        );
    }

    #[test]
    fn int_coerce_accepts_numeric_strings() {
        let t = Transform::IntCoerce;
        assert_eq!(
            t.flatten(&json!("1800"), &AttributeType::Int),
            Some(Value::Int(1800))
        );
        assert_eq!(
            t.flatten(&json!("n/a"), &AttributeType::Int),
            Some(Value::String("n/a".to_string()))
        );
        assert_eq!(t.expand(&Value::Int(5)), Ok(json!(5)));
        assert_eq!(t.expand(&Value::String(" 7 ".to_string())), Ok(json!(7)));
        assert_eq!(
            t.expand(&Value::String("seven".to_string())),
            Err(TransformError::NotANumber("seven".to_string()))
        );
    }

    #[test]
    fn ip_mask_converts_both_ways() {
        let t = Transform::IpMask;
        assert_eq!(
            t.flatten(&json!("10.0.0.0 255.0.0.0"), &AttributeType::String),
            Some(Value::String("10.0.0.0/8".to_string()))
        );
        assert_eq!(
            t.expand(&Value::String("192.168.1.0/24".to_string())),
            Ok(json!("192.168.1.0 255.255.255.0"))
        );
        assert_eq!(
            t.expand(&Value::String("0.0.0.0/0".to_string())),
            Ok(json!("0.0.0.0 0.0.0.0"))
        );
        assert_eq!(
            t.expand(&Value::String("10.1.1.1 255.255.255.255".to_string())),
            Ok(json!("10.1.1.1 255.255.255.255"))
        );
        assert!(matches!(
            t.expand(&Value::String("10.0.0.0/40".to_string())),
            Err(TransformError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn ip_mask_keeps_non_contiguous_masks_verbatim() {
        assert_eq!(
            Transform::IpMask.flatten(&json!("10.0.0.0 255.0.255.0"), &AttributeType::String),
            Some(Value::String("10.0.0.0 255.0.255.0".to_string()))
        );
    }

    #[test]
    fn name_list_round_trip() {
        let wire = json!([{"name": "web"}, {"name": "db"}]);
        let state = Transform::NameList
            .flatten(&wire, &AttributeType::List(Box::new(AttributeType::String)))
            .unwrap();
        assert_eq!(
            state,
            Value::List(vec![
                Value::String("web".to_string()),
                Value::String("db".to_string())
            ])
        );
        assert_eq!(Transform::NameList.expand(&state), Ok(wire));
    }
}
