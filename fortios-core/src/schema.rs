//! Schema - Field descriptor tables for configuration objects
//!
//! Every object type is described by a `ResourceSchema`: an ordered table of
//! `AttributeSchema` entries pairing a state key with its wire key, a type,
//! an optional validation constraint and a transform. The generic mapper in
//! `crate::mapper` walks these tables; nothing is hand-written per field.

use std::collections::HashMap;
use std::fmt;

use heck::ToKebabCase;

use crate::resource::Value;
use crate::transform::Transform;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List of scalars
    List(Box<AttributeType>),
    /// Repeated nested block: a list of records sharing one field table
    Block(Vec<AttributeSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Block(fields), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let result = match item {
                        Value::Map(map) => validate_fields(fields, map, false),
                        other => Err(vec![TypeError::TypeMismatch {
                            expected: "Map".to_string(),
                            got: other.type_name(),
                        }]),
                    };
                    if let Err(mut errors) = result {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(errors.remove(0)),
                        });
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    /// Name used in diagnostics and in `describe` output
    pub fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Block(_) => "Block".to_string(),
        }
    }

    /// The plain type a value of this attribute is stored as
    pub fn base(&self) -> &AttributeType {
        match self {
            AttributeType::Custom { base, .. } => base.base(),
            other => other,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Value {value} is out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("Length {len} is out of range [{min}, {max}]")]
    InvalidLength { len: usize, min: usize, max: usize },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },
}

/// Validation constraint applied on top of the attribute type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Inclusive integer range
    IntBetween(i64, i64),
    /// Inclusive string length range (in bytes)
    StringLenBetween(usize, usize),
}

impl Constraint {
    pub fn check(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (Constraint::IntBetween(min, max), Value::Int(n)) => {
                if n < min || n > max {
                    Err(TypeError::OutOfRange {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                } else {
                    Ok(())
                }
            }
            (Constraint::StringLenBetween(min, max), Value::String(s)) => {
                if s.len() < *min || s.len() > *max {
                    Err(TypeError::InvalidLength {
                        len: s.len(),
                        min: *min,
                        max: *max,
                    })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    fn describe(&self) -> serde_json::Value {
        match self {
            Constraint::IntBetween(min, max) => serde_json::json!({"int_between": [min, max]}),
            Constraint::StringLenBetween(min, max) => {
                serde_json::json!({"string_len_between": [min, max]})
            }
        }
    }
}

/// Field descriptor
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    /// State key (snake_case)
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Value may be filled in by the device when not configured
    pub computed: bool,
    pub description: Option<String>,
    /// Wire key (kebab-case). `None` for host-only attributes that never
    /// reach the device.
    pub provider_name: Option<String>,
    pub constraint: Option<Constraint>,
    pub transform: Transform,
}

impl AttributeSchema {
    /// New descriptor whose wire key is the kebab-case form of `name`
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        let name = name.into();
        let provider_name = Some(name.to_kebab_case());
        Self {
            name,
            attr_type,
            required: false,
            computed: false,
            description: None,
            provider_name,
            constraint: None,
            transform: Transform::Identity,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Keep the attribute out of request and response bodies
    pub fn host_only(mut self) -> Self {
        self.provider_name = None;
        self
    }

    pub fn int_between(mut self, min: i64, max: i64) -> Self {
        self.constraint = Some(Constraint::IntBetween(min, max));
        self
    }

    pub fn string_len_between(mut self, min: usize, max: usize) -> Self {
        self.constraint = Some(Constraint::StringLenBetween(min, max));
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Validate a value against type and constraint
    pub fn validate_value(&self, value: &Value) -> Result<(), TypeError> {
        self.attr_type.validate(value)?;
        if let Some(constraint) = &self.constraint {
            constraint.check(value)?;
        }
        Ok(())
    }

    pub fn describe(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        out.insert("name".into(), self.name.clone().into());
        out.insert(
            "wire_key".into(),
            self.provider_name
                .clone()
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
        );
        out.insert("type".into(), self.attr_type.type_name().into());
        out.insert("required".into(), self.required.into());
        out.insert("computed".into(), self.computed.into());
        if let Some(constraint) = &self.constraint {
            out.insert("validation".into(), constraint.describe());
        }
        if self.transform != Transform::Identity {
            out.insert("transform".into(), self.transform.name().into());
        }
        if let Some(desc) = &self.description {
            out.insert("description".into(), desc.clone().into());
        }
        if let AttributeType::Block(fields) = &self.attr_type {
            out.insert(
                "fields".into(),
                serde_json::Value::Array(fields.iter().map(|f| f.describe()).collect()),
            );
        }
        serde_json::Value::Object(out)
    }
}

/// Object type schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    /// Field descriptors in declaration order
    pub attributes: Vec<AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: Vec::new(),
            description: None,
        }
    }

    /// Add a descriptor, replacing an existing one with the same name
    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        match self.attributes.iter_mut().find(|a| a.name == schema.name) {
            Some(existing) => *existing = schema,
            None => self.attributes.push(schema),
        }
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        validate_fields(&self.attributes, attributes, true)
    }

    /// Derive the data source flavour of this schema: every attribute is
    /// computed except the lookup key, which becomes required.
    pub fn as_data_source(&self, key: &str) -> ResourceSchema {
        let attributes = self
            .attributes
            .iter()
            .map(|a| {
                let mut a = a.clone();
                if a.name == key {
                    a.required = true;
                    a.computed = false;
                } else {
                    a.required = false;
                    a.computed = true;
                }
                a
            })
            .collect();
        ResourceSchema {
            resource_type: self.resource_type.clone(),
            attributes,
            description: self.description.clone(),
        }
    }
}

fn validate_fields(
    fields: &[AttributeSchema],
    attributes: &HashMap<String, Value>,
    top_level: bool,
) -> Result<(), Vec<TypeError>> {
    let mut errors = Vec::new();

    for field in fields {
        if field.required && !attributes.contains_key(&field.name) {
            errors.push(TypeError::MissingRequired {
                name: field.name.clone(),
            });
        }
    }

    let mut names: Vec<&String> = attributes.keys().collect();
    names.sort();
    for name in names {
        let value = &attributes[name];
        match fields.iter().find(|f| &f.name == name) {
            Some(field) => {
                if let Err(e) = field.validate_value(value) {
                    errors.push(TypeError::AttributeError {
                        name: name.clone(),
                        inner: Box::new(e),
                    });
                }
            }
            // Block elements may carry keys the device added; only reject
            // unknown attributes at the top level.
            None if top_level => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            None => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Helper functions for common FortiOS types
pub mod types {
    use super::*;

    /// FortiOS on/off switch
    pub fn enable_disable() -> AttributeType {
        AttributeType::Enum(vec!["enable".to_string(), "disable".to_string()])
    }

    pub fn enumeration(values: &[&str]) -> AttributeType {
        AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// Dotted-quad IPv4 address (e.g., "10.0.0.1")
    pub fn ipv4_address() -> AttributeType {
        AttributeType::Custom {
            name: "Ipv4Address".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) => validate_ipv4(s),
                _ => Err("Expected string".to_string()),
            },
        }
    }

    /// IPv4 netmask (e.g., "255.255.255.0")
    pub fn ipv4_netmask() -> AttributeType {
        AttributeType::Custom {
            name: "Ipv4Netmask".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) => validate_netmask(s).map(|_| ()),
                _ => Err("Expected string".to_string()),
            },
        }
    }

    /// IPv4 prefix in CIDR form (e.g., "10.0.0.0/16")
    pub fn cidr() -> AttributeType {
        AttributeType::Custom {
            name: "Cidr".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) => validate_cidr(s),
                _ => Err("Expected string".to_string()),
            },
        }
    }
}

/// Validate a dotted-quad IPv4 address
pub fn validate_ipv4(ip: &str) -> Result<(), String> {
    let octets: Vec<&str> = ip.split('.').collect();
    if octets.len() != 4 {
        return Err(format!("Invalid IP address '{}': expected 4 octets", ip));
    }
    for octet in &octets {
        if octet.parse::<u8>().is_err() {
            return Err(format!(
                "Invalid octet '{}' in IP address: must be 0-255",
                octet
            ));
        }
    }
    Ok(())
}

/// Validate a netmask and return its prefix length
pub fn validate_netmask(mask: &str) -> Result<u8, String> {
    validate_ipv4(mask)?;
    let bits = mask
        .split('.')
        .filter_map(|o| o.parse::<u8>().ok())
        .fold(0u32, |acc, o| (acc << 8) | o as u32);
    let prefix = bits.leading_ones();
    if bits.checked_shl(prefix).unwrap_or(0) != 0 {
        return Err(format!("Invalid netmask '{}': bits are not contiguous", mask));
    }
    Ok(prefix as u8)
}

/// Validate CIDR block format (e.g., "10.0.0.0/16")
pub fn validate_cidr(cidr: &str) -> Result<(), String> {
    let Some((ip, prefix)) = cidr.split_once('/') else {
        return Err(format!(
            "Invalid CIDR format '{}': expected IP/prefix",
            cidr
        ));
    };

    validate_ipv4(ip)?;

    match prefix.parse::<u8>() {
        Ok(p) if p <= 32 => Ok(()),
        Ok(p) => Err(format!("Invalid prefix length '{}': must be 0-32", p)),
        Err(_) => Err(format!(
            "Invalid prefix length '{}': must be a number",
            prefix
        )),
    }
}
