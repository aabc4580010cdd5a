use std::collections::BTreeMap;
use std::iter::FromIterator;

use iso_core::{ErrorInfo, IsoError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::distribution::IsoDistribution;
use crate::params::Query;

fn serde_error(code: &str, err: impl ToString) -> IsoError {
    IsoError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let ordered = map
                .into_iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serializes a value into JSON bytes with sorted object keys.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, IsoError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonicalize(value))
        .map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}

/// Deserializes any value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, IsoError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json-read", err))
}

/// Serializes a distribution to pretty JSON.
pub fn to_json(dist: &IsoDistribution) -> Result<String, IsoError> {
    serde_json::to_string_pretty(dist).map_err(|err| serde_error("json-serialize", err))
}

/// Restores a distribution from JSON, rejecting misaligned arrays.
pub fn from_json(data: &str) -> Result<IsoDistribution, IsoError> {
    let dist: IsoDistribution =
        serde_json::from_str(data).map_err(|err| serde_error("json-deserialize", err))?;
    dist.validate()?;
    Ok(dist)
}

/// Serializes a distribution into a compact binary blob.
pub fn to_bytes(dist: &IsoDistribution) -> Result<Vec<u8>, IsoError> {
    bincode::serialize(dist).map_err(|err| serde_error("bincode-serialize", err))
}

/// Restores a distribution from a binary blob.
pub fn from_bytes(bytes: &[u8]) -> Result<IsoDistribution, IsoError> {
    let dist: IsoDistribution =
        bincode::deserialize(bytes).map_err(|err| serde_error("bincode-deserialize", err))?;
    dist.validate()?;
    Ok(dist)
}

/// Serializes a query document to pretty JSON.
pub fn query_to_json(query: &Query) -> Result<String, IsoError> {
    serde_json::to_string_pretty(query).map_err(|err| serde_error("json-serialize", err))
}

/// Parses a query document from JSON.
pub fn query_from_json(data: &str) -> Result<Query, IsoError> {
    serde_json::from_str(data).map_err(|err| serde_error("json-deserialize", err))
}
