//! Parameter system for block invocation
//!
//! The editor sends every block's fields as a flat, loosely typed map. Each
//! handler declares a schema of [`Parameter`]s; the schema is applied to the
//! incoming [`ParameterBag`] at the handler boundary, filling defaults for
//! absent fields and rejecting malformed ones with a typed error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::block::BlockError;
use super::format::{fmt_bool, fmt_float};

/// Parameter definition
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Field name as sent by the editor
    pub id: String,
    /// Expected type
    pub param_type: ParameterType,
    /// Value used when the field is absent or blank
    pub default_value: ParameterValue,
    /// Alternative field names, tried in order after `id`
    pub aliases: Vec<String>,
    /// Optional constraints
    pub constraints: Option<ParameterConstraints>,
}

/// Parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Free text
    String,
    /// Floating point number
    Number,
    /// Whole number
    Integer,
    /// `true` / `false`, case-insensitive when sent as text
    Boolean,
    /// One of a fixed set of strings
    Enum,
}

/// Parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Boolean value
    Boolean(bool),
    /// Integer number
    Integer(i64),
    /// Floating point number
    Number(f64),
    /// String value
    String(String),
    /// Null value
    Null,
}

impl ParameterValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }

    /// Null or whitespace-only text; treated as "not supplied".
    pub fn is_blank(&self) -> bool {
        match self {
            ParameterValue::Null => true,
            ParameterValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Try to convert to string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to convert to integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::String(s) => f.write_str(s),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Number(n) => f.write_str(&fmt_float(*n)),
            ParameterValue::Boolean(b) => f.write_str(fmt_bool(*b)),
            ParameterValue::Null => Ok(()),
        }
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        ParameterValue::String(s)
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        ParameterValue::String(s.to_string())
    }
}

impl From<f64> for ParameterValue {
    fn from(n: f64) -> Self {
        ParameterValue::Number(n)
    }
}

impl From<i64> for ParameterValue {
    fn from(i: i64) -> Self {
        ParameterValue::Integer(i)
    }
}

impl From<i32> for ParameterValue {
    fn from(i: i32) -> Self {
        ParameterValue::Integer(i64::from(i))
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        ParameterValue::Boolean(b)
    }
}

/// Parameter constraints
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParameterConstraints {
    /// Allowed values (for enums)
    pub allowed_values: Option<Vec<String>>,
}

impl ParameterConstraints {
    /// Create a new empty constraints object
    pub fn new() -> Self {
        Self::default()
    }

    /// Set allowed values
    pub fn with_allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

impl Parameter {
    fn new(id: &str, param_type: ParameterType, default_value: ParameterValue) -> Self {
        Self {
            id: id.to_string(),
            param_type,
            default_value,
            aliases: Vec::new(),
            constraints: None,
        }
    }

    pub fn string(id: &str, default: &str) -> Self {
        Self::new(id, ParameterType::String, default.into())
    }

    pub fn number(id: &str, default: f64) -> Self {
        Self::new(id, ParameterType::Number, default.into())
    }

    pub fn integer(id: &str, default: i64) -> Self {
        Self::new(id, ParameterType::Integer, default.into())
    }

    pub fn boolean(id: &str, default: bool) -> Self {
        Self::new(id, ParameterType::Boolean, default.into())
    }

    /// A string restricted to `allowed`.
    pub fn choice(id: &str, default: &str, allowed: &[&str]) -> Self {
        let mut param = Self::new(id, ParameterType::Enum, default.into());
        param.constraints = Some(ParameterConstraints::new().with_allowed_values(allowed));
        param
    }

    /// Also accept the field under `alias`.
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Apply this definition to a bag: the first supplied value among `id`
    /// and the aliases is coerced to the declared type, otherwise the
    /// default is used.
    ///
    /// Text parameters keep whitespace as given; for every other type a
    /// blank string counts as not supplied.
    pub fn resolve(&self, bag: &ParameterBag) -> Result<ParameterValue, BlockError> {
        let supplied = std::iter::once(&self.id)
            .chain(self.aliases.iter())
            .filter_map(|key| bag.get(key))
            .find(|value| match self.param_type {
                ParameterType::String => !value.is_null(),
                _ => !value.is_blank(),
            });

        match supplied {
            Some(value) => self.coerce(value),
            None => Ok(self.default_value.clone()),
        }
    }

    fn coerce(&self, value: &ParameterValue) -> Result<ParameterValue, BlockError> {
        match self.param_type {
            ParameterType::String => Ok(ParameterValue::String(value.to_string())),
            ParameterType::Number => coerce_number(value)
                .map(ParameterValue::Number)
                .ok_or_else(|| self.invalid(value, "expected a number")),
            ParameterType::Integer => coerce_integer(value)
                .map(ParameterValue::Integer)
                .ok_or_else(|| self.invalid(value, "expected a whole number")),
            ParameterType::Boolean => coerce_bool(value)
                .map(ParameterValue::Boolean)
                .ok_or_else(|| self.invalid(value, "expected true or false")),
            ParameterType::Enum => {
                let text = value.to_string();
                let allowed = self
                    .constraints
                    .as_ref()
                    .and_then(|c| c.allowed_values.as_ref());
                match allowed {
                    Some(values) if !values.iter().any(|v| *v == text) => Err(self.invalid(
                        value,
                        &format!("expected one of: {}", values.join(", ")),
                    )),
                    _ => Ok(ParameterValue::String(text)),
                }
            }
        }
    }

    fn invalid(&self, value: &ParameterValue, reason: &str) -> BlockError {
        BlockError::InvalidParameter {
            name: self.id.clone(),
            reason: format!("{} (got '{}')", reason, value),
        }
    }
}

fn coerce_number(value: &ParameterValue) -> Option<f64> {
    match value {
        ParameterValue::Number(n) => Some(*n),
        ParameterValue::Integer(i) => Some(*i as f64),
        ParameterValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_integer(value: &ParameterValue) -> Option<i64> {
    match value {
        ParameterValue::Integer(i) => Some(*i),
        ParameterValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        ParameterValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|n| n.fract() == 0.0 && n.is_finite())
                    .map(|n| n as i64)
            })
        }
        _ => None,
    }
}

fn coerce_bool(value: &ParameterValue) -> Option<bool> {
    match value {
        ParameterValue::Boolean(b) => Some(*b),
        ParameterValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// The raw field map sent with one block invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterBag(HashMap<String, ParameterValue>);

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert, handy for constructing bags in code.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParameterValue>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Values after a handler's schema has been applied.
///
/// Every declared parameter is present and already has its declared type.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParams {
    values: HashMap<String, ParameterValue>,
}

impl ResolvedParams {
    /// Apply `schema` to `bag`. Fields the schema does not declare are ignored.
    pub fn resolve(schema: &[Parameter], bag: &ParameterBag) -> Result<Self, BlockError> {
        let mut values = HashMap::with_capacity(schema.len());
        for param in schema {
            values.insert(param.id.clone(), param.resolve(bag)?);
        }
        Ok(Self { values })
    }

    fn get(&self, id: &str) -> Result<&ParameterValue, BlockError> {
        self.values.get(id).ok_or_else(|| BlockError::InvalidParameter {
            name: id.to_string(),
            reason: "parameter is not declared by this block".into(),
        })
    }

    pub fn text(&self, id: &str) -> Result<&str, BlockError> {
        let value = self.get(id)?;
        value.as_string().ok_or_else(|| mistyped(id, "text"))
    }

    pub fn number(&self, id: &str) -> Result<f64, BlockError> {
        let value = self.get(id)?;
        value.as_number().ok_or_else(|| mistyped(id, "number"))
    }

    pub fn integer(&self, id: &str) -> Result<i64, BlockError> {
        let value = self.get(id)?;
        value.as_integer().ok_or_else(|| mistyped(id, "whole number"))
    }

    pub fn boolean(&self, id: &str) -> Result<bool, BlockError> {
        let value = self.get(id)?;
        value.as_bool().ok_or_else(|| mistyped(id, "boolean"))
    }
}

fn mistyped(id: &str, expected: &str) -> BlockError {
    BlockError::InvalidParameter {
        name: id.to_string(),
        reason: format!("declared value is not a {}", expected),
    }
}
