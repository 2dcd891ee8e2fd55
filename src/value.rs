// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoder for the device's tagged hexadecimal values.
//!
//! The device reports every value as a string of the form
//! `<tag>_<payload>`:
//!
//! | Tag                  | Payload                               | Decoded as          |
//! |----------------------|---------------------------------------|---------------------|
//! | `u8`, `u3`, `i16`... | base-16 integer                       | [`Value::Integer`]  |
//! | `fl`                 | 8 hex chars, big-endian IEEE-754 f32  | [`Value::Float`]    |
//! | `st`                 | opaque text                           | [`Value::Text`]     |
//!
//! Strings with any other tag, or without an underscore at all, are passed
//! through unchanged as [`Value::Text`]. A malformed payload for a known
//! tag is an error.
//!
//! # Examples
//!
//! ```
//! use senec_lib::value::{decode_scalar, Value};
//!
//! assert_eq!(decode_scalar("u8_1A").unwrap(), Value::Integer(26));
//! assert_eq!(decode_scalar("st_hello").unwrap(), Value::Text("hello".into()));
//! assert_eq!(decode_scalar("plainvalue").unwrap(), Value::Text("plainvalue".into()));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ParseError;

/// A decoded value from a device response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer decoded from a `u*` or `i*` tag.
    ///
    /// Signed tags are read as an unsigned magnitude, without sign extension.
    Integer(u64),
    /// 32-bit float decoded from an `fl` tag.
    Float(f32),
    /// Text from an `st` tag, or an untagged/unknown string passed through.
    Text(String),
    /// A sequence of decoded scalars (per-phase or per-unit values).
    List(Vec<Value>),
    /// A nested mapping, such as a section of the response.
    Map(BTreeMap<String, Value>),
    /// A JSON value that was not a string and was left untouched.
    Raw(serde_json::Value),
}

impl Value {
    /// Returns the value as `f64` if it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Raw(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the value as `u64` if it is an integer.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Raw(serde_json::Value::Number(n)) => n.as_u64(),
            _ => None,
        }
    }

    /// Returns the text if this is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key in a [`Value::Map`].
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Returns the element at `index` of a [`Value::List`].
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Returns the value itself, or its first element if it is a list.
    ///
    /// Some fields are reported as a scalar on one firmware and as a
    /// one-element list on another.
    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        match self {
            Self::List(items) => items.first(),
            other => Some(other),
        }
    }
}

/// Decodes a single tagged scalar string.
///
/// The string is split at its first underscore; the part before is the tag.
///
/// # Errors
///
/// Returns [`ParseError::InvalidHex`] if an integer payload is not valid
/// hexadecimal, and [`ParseError::InvalidFloat`] if an `fl` payload is not
/// exactly eight hex characters.
pub fn decode_scalar(raw: &str) -> Result<Value, ParseError> {
    let Some((tag, payload)) = raw.split_once('_') else {
        return Ok(Value::Text(raw.to_string()));
    };

    match tag {
        "fl" => decode_float(raw, payload).map(Value::Float),
        "st" => Ok(Value::Text(payload.to_string())),
        _ if is_integer_tag(tag) => decode_integer(raw, payload).map(Value::Integer),
        _ => Ok(Value::Text(raw.to_string())),
    }
}

/// Decodes a JSON response tree, replacing every tagged string.
///
/// Objects are decoded recursively and keep their key set. Arrays are
/// decoded element-wise as scalars; non-string elements are kept as
/// [`Value::Raw`].
///
/// # Errors
///
/// Returns the first [`ParseError`] produced by [`decode_scalar`].
///
/// # Examples
///
/// ```
/// use senec_lib::value::{decode, Value};
///
/// let json = serde_json::json!({
///     "ENERGY": { "STAT_STATE": "u8_0E" },
///     "PM1OBJ1": { "U_AC": ["fl_43611EC0", "fl_43611EC0", "fl_43611EC0"] }
/// });
/// let decoded = decode(json).unwrap();
/// let state = decoded.get("ENERGY").and_then(|s| s.get("STAT_STATE"));
/// assert_eq!(state, Some(&Value::Integer(14)));
/// ```
pub fn decode(value: serde_json::Value) -> Result<Value, ParseError> {
    match value {
        serde_json::Value::String(s) => decode_scalar(&s),
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| decode(value).map(|decoded| (key, decoded)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Value::Map),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(decode_element)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other => Ok(Value::Raw(other)),
    }
}

fn decode_element(item: serde_json::Value) -> Result<Value, ParseError> {
    match item {
        serde_json::Value::String(s) => decode_scalar(&s),
        other => Ok(Value::Raw(other)),
    }
}

/// `u` or `i` followed by a bit width, e.g. `u8`, `i16`, `u3`.
fn is_integer_tag(tag: &str) -> bool {
    let Some(width) = tag.strip_prefix('u').or_else(|| tag.strip_prefix('i')) else {
        return false;
    };
    !width.is_empty() && width.bytes().all(|b| b.is_ascii_digit())
}

fn decode_integer(raw: &str, payload: &str) -> Result<u64, ParseError> {
    let invalid = || ParseError::InvalidHex {
        value: raw.to_string(),
    };
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u64::from_str_radix(payload, 16).map_err(|_| invalid())
}

fn decode_float(raw: &str, payload: &str) -> Result<f32, ParseError> {
    if payload.len() != 8 || !payload.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidFloat {
            value: raw.to_string(),
        });
    }

    let mut bytes = [0u8; 4];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&payload[i * 2..i * 2 + 2], 16).map_err(|_| {
            ParseError::InvalidFloat {
                value: raw.to_string(),
            }
        })?;
    }
    Ok(f32::from_be_bytes(bytes))
}
