use crate::app::ports::{HttpClientPort, SleeperPort};
use crate::error::Result;
use crate::extract::{extract_structured_data, find_item_list};
use crate::fetch::{fetch_category_page, RetryPolicy};
use crate::normalize::normalize_item;
use crate::types::{CategoryResult, NormalizedItem};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

static SKINS_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+skins?$").expect("static regex is valid"));

/// Cheapest first; the source price breaks ties between equal rounded prices.
pub fn cmp_by_price(a: &NormalizedItem, b: &NormalizedItem) -> Ordering {
    a.low_price_azn
        .total_cmp(&b.low_price_azn)
        .then_with(|| a.low_price_usd.total_cmp(&b.low_price_usd))
}

/// Builds a category result from an already downloaded page.
pub fn build_category_result(
    slug: &str,
    source_url: &str,
    html: &str,
    usd_to_target: f64,
    price_limit: f64,
) -> CategoryResult {
    let objects = extract_structured_data(html);
    let list = find_item_list(&objects);
    let entries = list
        .and_then(|l| l.get("itemListElement"))
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty());

    let (Some(list), Some(entries)) = (list, entries) else {
        debug!("No item list on {}", source_url);
        return CategoryResult::empty(source_url.to_string(), slug);
    };

    let normalized: Vec<NormalizedItem> = entries
        .iter()
        .filter_map(|entry| {
            let raw = entry.get("item").unwrap_or(&Value::Null);
            normalize_item(raw, usd_to_target, slug)
        })
        .collect();
    let priced = normalized.len();
    counter!("skins_items_normalized_total").increment(priced as u64);

    let mut items: Vec<NormalizedItem> = normalized
        .into_iter()
        .filter(|item| item.low_price_azn <= price_limit)
        .collect();
    items.sort_by(cmp_by_price);

    let weapon = match items.first() {
        Some(item) => item.weapon.clone(),
        None => list_display_name(list).unwrap_or_else(|| slug.to_string()),
    };

    debug!(
        "{}: {} entries, {} priced, {} under limit",
        slug,
        entries.len(),
        priced,
        items.len()
    );

    CategoryResult {
        source: source_url.to_string(),
        weapon_slug: slug.to_string(),
        weapon,
        count: items.len(),
        items,
    }
}

/// The list's own name with a trailing "Skin"/"Skins" removed.
fn list_display_name(list: &Value) -> Option<String> {
    let name = list.get("name").and_then(Value::as_str)?;
    let stripped = SKINS_SUFFIX.replace(name, "");
    let stripped = stripped.trim();
    (!stripped.is_empty()).then(|| stripped.to_string())
}

/// Fetches and aggregates one category. Only fetch failures are errors.
#[instrument(skip(http, sleeper, policy))]
pub async fn aggregate_category(
    http: &dyn HttpClientPort,
    sleeper: &dyn SleeperPort,
    policy: &RetryPolicy,
    slug: &str,
    source_url: &str,
    usd_to_target: f64,
    price_limit: f64,
) -> Result<CategoryResult> {
    let html = fetch_category_page(http, sleeper, policy, slug, source_url).await?;
    let result = build_category_result(slug, source_url, &html, usd_to_target, price_limit);
    info!("{} ({}): {} items under limit", result.weapon, slug, result.count);
    Ok(result)
}
