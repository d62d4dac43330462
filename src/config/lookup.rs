// ABOUTME: Dot-separated deep-path lookup into nested JSON maps and sequences
// ABOUTME: Final-segment misses yield None, intermediate misses are an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Armature Contributors

use serde_json::Value;

use crate::errors::ConfigError;

/// Retrieves a value from a nested structure based on a dot-separated path
///
/// The path can mix object keys and array indices, e.g.
/// `"key.anotherKey.0.thirdKey"`. An empty path yields `Ok(None)`. A path
/// whose FINAL segment does not exist yields `Ok(None)`; a path whose
/// INTERMEDIATE segment does not exist (or points into a scalar) fails.
///
/// # Errors
///
/// Returns [`ConfigError::MissingPathSegment`] naming the first intermediate
/// segment that could not be traversed.
pub fn get_deep<'a>(path: &str, data: &'a Value) -> Result<Option<&'a Value>, ConfigError> {
    if path.is_empty() {
        return Ok(None);
    }

    let segments: Vec<&str> = path.split('.').collect();
    let mut current = data;

    for (index, segment) in segments.iter().enumerate() {
        match index_into(current, segment) {
            Some(value) => current = value,
            None if index + 1 == segments.len() => return Ok(None),
            None => {
                return Err(ConfigError::MissingPathSegment {
                    path: path.to_owned(),
                    segment: (*segment).to_owned(),
                })
            }
        }
    }

    Ok(Some(current))
}

fn index_into<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
