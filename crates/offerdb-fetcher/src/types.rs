//! Response types for the promotional-offers `specials` endpoint.
//!
//! ## Observed shape
//!
//! The endpoint answers `GET {endpoint}?zipCode=<code>` with a JSON object
//! whose `Offers` key holds an array of PascalCase records. Regions with no
//! running promotions sometimes omit `Offers` entirely instead of sending
//! `[]`, so the array defaults to empty.
//!
//! ### Scalar types
//! The feed is not consistent about scalar types: `ModelYear` shows up as
//! `2024` and as `"2024"`, `Id` may be numeric, and `IsFeatured` has been
//! seen as `true`, `"true"`, and `1`. Every field is therefore modelled as
//! `Option<_>` and decoded leniently; normalization decides the defaults.
//!
//! Unknown keys are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level response from the `specials` endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct OffersResponse {
    #[serde(rename = "Offers", default)]
    pub offers: Vec<RawOffer>,
}

/// One offer exactly as the endpoint returned it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawOffer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub model_year: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_featured: Option<bool>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub sales_program_name: Option<String>,

    /// Drives the derived `tab` column.
    #[serde(default, deserialize_with = "lenient_string")]
    pub sales_program_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub model_group_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub series_item_name: Option<String>,
}

/// Accepts a string, number, or bool and renders it as a string. `null`
/// becomes `None`; arrays and objects are kept as their JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }))
}

/// Accepts `true`/`false`, `"true"`/`"false"` (any case, also `"1"`/`"0"`,
/// `"yes"`/`"no"`), or a number (non-zero is true). Anything else is `None`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Bool(b) => Some(b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}
