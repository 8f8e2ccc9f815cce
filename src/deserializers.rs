//! Forgiving numeric deserializers for model output.
//!
//! Completion services return numbers in whatever shape the model felt like
//! emitting: `95`, `95.0`, `"95"`, `"95%"`. These accept all of them while
//! still rejecting structurally wrong values (arrays, objects, booleans).

use serde::{Deserialize, Deserializer};

/// Parse a numeric string such as `"92"`, `" 87.6 "` or `"90%"`.
fn parse_numeric_str(s: &str) -> Option<f64> {
    let s = s.trim().trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Deserializes Option<i64> accepting integers, floats (rounded), and numeric strings.
///
/// # Accepted Formats
///
/// * **Integer**: `95`, `-10`
/// * **Float**: `87.6` → 88
/// * **String numeric**: `"95"`, `"95%"` → 95
/// * **Null** or a non-numeric string such as `"high"` → `None`
///
/// # Errors
///
/// Returns an error for booleans, arrays, and objects.
pub fn de_option_i64_forgiving<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(v) = opt else { return Ok(None) };
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Some(i64::try_from(u).unwrap_or(i64::MAX)))
            } else if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(D::Error::custom("non-finite numeric for i64"));
                }
                Ok(Some(f.round() as i64))
            } else {
                Err(D::Error::custom("invalid numeric for i64"))
            }
        }
        serde_json::Value::String(s) => Ok(parse_numeric_str(&s).map(|f| f.round() as i64)),
        other => Err(D::Error::custom(format!("invalid type for number: {}", other))),
    }
}

/// Deserializes Option<usize> accepting integers, floats (rounded), and numeric strings.
/// Negative values and non-numeric strings yield `None`.
/// Examples: 5, 5.0, "5" -> 5
pub fn de_option_usize_forgiving<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = de_option_i64_forgiving(deserializer)?;
    Ok(v.and_then(|i| usize::try_from(i).ok()))
}

/// Clamp a raw score into 0..=100
pub fn clamp_percent(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}
