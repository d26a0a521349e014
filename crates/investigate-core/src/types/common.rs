use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Geographic coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude
    #[serde(default)]
    pub lat: f64,

    /// Longitude
    #[serde(default)]
    pub lon: f64,
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Read a positional `[string, number]` pair.
pub(crate) fn string_number_pair(value: &Value) -> Result<(&str, f64), String> {
    match value.as_array().map(Vec::as_slice) {
        Some([Value::String(text), Value::Number(number)]) => number
            .as_f64()
            .map(|n| (text.as_str(), n))
            .ok_or_else(|| format!("number {number} is out of range")),
        _ => Err(format!("expected a [string, number] pair, got {value}")),
    }
}

/// Read `object[key]` as an array of `[string, number]` pairs, keeping order.
pub(crate) fn scored_pairs(object: &Map<String, Value>, key: &str) -> Result<Vec<(String, f64)>, String> {
    let entries = object
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("expected `{key}` to be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            string_number_pair(entry)
                .map(|(text, number)| (text.to_string(), number))
                .map_err(|msg| format!("`{key}`[{i}]: {msg}"))
        })
        .collect()
}
