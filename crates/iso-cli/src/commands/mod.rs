use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::Path;

use iso_engine::{query_from_json, to_canonical_json_bytes, Query};
use serde::Serialize;

pub mod run;
pub mod summary;

/// Reads a query document; `.yaml`/`.yml` files go through YAML, the rest JSON.
pub fn load_query(path: &Path) -> Result<Query, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(query_from_json(&text)?)
    }
}

/// Writes `value` as canonical JSON to `out`, or to stdout when absent.
pub fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let mut bytes = to_canonical_json_bytes(value)?;
    bytes.push(b'\n');
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, bytes)?;
        }
        None => std::io::stdout().lock().write_all(&bytes)?,
    }
    Ok(())
}
