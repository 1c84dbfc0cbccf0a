//! Recursive Clarity value tree.
//!
//! Read-only results are decoded into `ClarityValue` and walked with
//! the accessors below; `to_json` renders the `{type, value}` JSON
//! shape that the contract's JS tooling calls `cvToJSON`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Value, json};

use super::DecodeError;
use super::c32::StandardPrincipal;
use super::wire;

/// A principal: either a standard account or a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Standard(StandardPrincipal),
    Contract {
        issuer: StandardPrincipal,
        name: String,
    },
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(p) => write!(f, "{p}"),
            Self::Contract { issuer, name } => write!(f, "{issuer}.{name}"),
        }
    }
}

/// A decoded Clarity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    Principal(Principal),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    pub const fn uint(v: u128) -> Self {
        Self::UInt(v)
    }

    pub const fn bool(v: bool) -> Self {
        Self::Bool(v)
    }

    pub fn string_utf8(s: impl Into<String>) -> Self {
        Self::StringUtf8(s.into())
    }

    pub fn some(v: Self) -> Self {
        Self::OptionalSome(Box::new(v))
    }

    pub fn ok(v: Self) -> Self {
        Self::ResponseOk(Box::new(v))
    }

    pub fn tuple<K: Into<String>>(fields: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Tuple(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Standard principal argument from a c32check address.
    pub fn standard_principal(address: &str) -> Result<Self, DecodeError> {
        Ok(Self::Principal(Principal::Standard(
            StandardPrincipal::from_address(address)?,
        )))
    }

    /// Decode a `0x`-prefixed (or bare) hex payload.
    pub fn from_hex(hex_str: &str) -> Result<Self, DecodeError> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
        wire::deserialize(&bytes)
    }

    /// Encode as `0x`-prefixed hex, the form the read-only endpoint expects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.serialize()))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        wire::serialize_into(self, &mut out);
        out
    }

    /// Strip any number of `(some …)` / `(ok …)` wrappers.
    ///
    /// Returns `None` for `none` and `(err …)`.
    pub fn unwrap_nested(&self) -> Option<&Self> {
        let mut current = self;
        loop {
            match current {
                Self::OptionalSome(inner) | Self::ResponseOk(inner) => current = inner,
                Self::OptionalNone | Self::ResponseErr(_) => return None,
                other => return Some(other),
            }
        }
    }

    /// Look up a tuple field, seeing through optional/response wrappers.
    pub fn field(&self, name: &str) -> Option<&Self> {
        match self.unwrap_nested()? {
            Self::Tuple(fields) => fields.get(name),
            _ => None,
        }
    }

    /// Integer view; numeric strings are accepted, anything else is `None`.
    pub fn as_u128_lossy(&self) -> Option<u128> {
        match self.unwrap_nested()? {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u128::try_from(*v).ok(),
            Self::StringAscii(s) | Self::StringUtf8(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool_lossy(&self) -> Option<bool> {
        match self.unwrap_nested()? {
            Self::Bool(b) => Some(*b),
            Self::StringAscii(s) | Self::StringUtf8(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Clarity type signature, e.g. `(optional uint)`.
    pub fn type_signature(&self) -> String {
        match self {
            Self::Int(_) => "int".to_string(),
            Self::UInt(_) => "uint".to_string(),
            Self::Buffer(b) => format!("(buff {})", b.len()),
            Self::Bool(_) => "bool".to_string(),
            Self::Principal(_) => "principal".to_string(),
            Self::ResponseOk(v) => format!("(response {} UnknownType)", v.type_signature()),
            Self::ResponseErr(v) => format!("(response UnknownType {})", v.type_signature()),
            Self::OptionalNone => "(optional none)".to_string(),
            Self::OptionalSome(v) => format!("(optional {})", v.type_signature()),
            Self::List(items) => {
                let inner = items
                    .first()
                    .map_or_else(|| "UnknownType".to_string(), Self::type_signature);
                format!("(list {} {inner})", items.len())
            }
            Self::Tuple(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("({k} {})", v.type_signature()))
                    .collect();
                format!("(tuple {})", parts.join(" "))
            }
            Self::StringAscii(s) => format!("(string-ascii {})", s.len()),
            Self::StringUtf8(s) => format!("(string-utf8 {})", s.len()),
        }
    }

    /// Render the `{ "type", "value" }` JSON tree.
    pub fn to_json(&self) -> Value {
        let ty = self.type_signature();
        match self {
            Self::Int(v) => json!({ "type": ty, "value": v.to_string() }),
            Self::UInt(v) => json!({ "type": ty, "value": v.to_string() }),
            Self::Buffer(b) => json!({ "type": ty, "value": format!("0x{}", hex::encode(b)) }),
            Self::Bool(b) => json!({ "type": ty, "value": b }),
            Self::Principal(p) => json!({ "type": ty, "value": p.to_string() }),
            Self::ResponseOk(v) => json!({ "type": ty, "value": v.to_json(), "success": true }),
            Self::ResponseErr(v) => json!({ "type": ty, "value": v.to_json(), "success": false }),
            Self::OptionalNone => json!({ "type": ty, "value": Value::Null }),
            Self::OptionalSome(v) => json!({ "type": ty, "value": v.to_json() }),
            Self::List(items) => {
                json!({ "type": ty, "value": items.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::Tuple(fields) => {
                let map: serde_json::Map<String, Value> =
                    fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                json!({ "type": ty, "value": map })
            }
            Self::StringAscii(s) | Self::StringUtf8(s) => json!({ "type": ty, "value": s }),
        }
    }
}
