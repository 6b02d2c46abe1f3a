use serde::{Deserialize, Serialize, Serializer};

/// Largest magnitude below which every whole f64 is an exact integer.
const MAX_SAFE_WHOLE: f64 = 9_007_199_254_740_992.0;

/// Writes whole amounts as JSON integers (`20`, not `20.0`), the way the
/// display surface has always received them.
pub fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_WHOLE {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

pub fn opt_whole_number<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => whole_number(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Raw catalog entry as published in the marketplace's linked data.
pub type RawCatalogEntry = serde_json::Value;

/// One priced skin, validated and converted to the target currency.
///
/// Field names are the wire names the display surface reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub weapon: String,
    pub weapon_slug: String,
    pub full_name: String,
    pub skin_name: String,
    pub item_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(serialize_with = "whole_number")]
    pub low_price_usd: f64,
    #[serde(serialize_with = "opt_whole_number")]
    pub high_price_usd: Option<f64>,
    #[serde(serialize_with = "whole_number")]
    pub low_price_azn: f64,
    pub offer_count: Option<u64>,
    pub source_currency: String,
}

/// Outcome of harvesting a single weapon category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub source: String,
    pub weapon_slug: String,
    pub weapon: String,
    pub count: usize,
    pub items: Vec<NormalizedItem>,
}

impl CategoryResult {
    pub fn empty(source: String, slug: &str) -> Self {
        Self {
            source,
            weapon_slug: slug.to_string(),
            weapon: slug.to_uppercase(),
            count: 0,
            items: Vec::new(),
        }
    }
}

/// The single conversion rate used for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxRate {
    #[serde(serialize_with = "whole_number")]
    pub rate: f64,
    pub provider: String,
    pub fetched_at: Option<String>,
}

/// A category that could not be harvested in this run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCategory {
    pub slug: String,
    pub reason: String,
}
