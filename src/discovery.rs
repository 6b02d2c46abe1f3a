use crate::app::ports::HttpClientPort;
use crate::constants::{all_gun_slugs, is_known_gun_slug, EXCLUDED_WEAPON_PATTERNS, EXCLUDED_WEAPON_SLUGS};
use crate::error::{Result, ScraperError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

static WEAPON_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/weapons/([a-z0-9-]+)").expect("static regex is valid"));

/// True unless the slug is explicitly excluded or names a cosmetic category.
pub fn is_gun_slug(slug: &str) -> bool {
    if slug.is_empty() || EXCLUDED_WEAPON_SLUGS.contains(&slug) {
        return false;
    }
    let lower = slug.to_lowercase();
    !EXCLUDED_WEAPON_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Gun slugs linked from the page, restricted to the allow-list and sorted.
/// Falls back to the full allow-list when nothing matches.
pub fn slugs_from_html(html: &str) -> Vec<String> {
    let discovered: BTreeSet<&str> = WEAPON_PATH
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|slug| is_gun_slug(slug) && is_known_gun_slug(slug))
        .collect();

    if discovered.is_empty() {
        warn!("No known gun categories linked from discovery page; using the full catalog");
        return all_gun_slugs();
    }
    discovered.into_iter().map(str::to_string).collect()
}

/// Fetches the marketplace root and returns the categories to harvest.
#[instrument(skip(http))]
pub async fn discover_categories(http: &dyn HttpClientPort, url: &str) -> Result<Vec<String>> {
    let resp = http.get(url).await.map_err(ScraperError::Discovery)?;
    if !resp.is_success() {
        return Err(ScraperError::Discovery(resp.status.to_string()));
    }
    let slugs = slugs_from_html(&resp.body);
    info!("Discovered {} gun categories", slugs.len());
    Ok(slugs)
}

/// Narrows `slugs` to the requested subset, ignoring names outside it.
pub fn select_categories(slugs: Vec<String>, only: &[String]) -> Vec<String> {
    if only.is_empty() {
        return slugs;
    }
    slugs.into_iter().filter(|s| only.contains(s)).collect()
}
