use crate::config::Config;
use crate::error::Result;
use crate::aggregate::cmp_by_price;
use crate::types::{whole_number, CategoryResult, FxRate, NormalizedItem};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxInfo {
    pub base: String,
    pub target: String,
    #[serde(serialize_with = "whole_number")]
    pub rate: f64,
    pub provider: String,
    pub fetched_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponSummary {
    pub weapon: String,
    pub weapon_slug: String,
    pub count: usize,
}

/// Aggregate output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub source: String,
    pub currency_target: String,
    pub fx: FxInfo,
    pub scraped_at: String,
    pub weapons_count: usize,
    pub weapons: Vec<WeaponSummary>,
    pub count: usize,
    #[serde(serialize_with = "whole_number")]
    pub limit_azn: f64,
    pub items: Vec<NormalizedItem>,
}

/// Per-category output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnapshot {
    pub source: String,
    pub weapon: String,
    pub weapon_slug: String,
    pub currency_target: String,
    pub fx: FxInfo,
    pub scraped_at: String,
    pub count: usize,
    #[serde(serialize_with = "whole_number")]
    pub limit_azn: f64,
    pub items: Vec<NormalizedItem>,
}

/// Run-wide values stamped onto every output file.
#[derive(Debug, Clone)]
pub struct SnapshotContext {
    pub source: String,
    pub fx: FxInfo,
    pub scraped_at: String,
    pub price_limit: f64,
}

impl SnapshotContext {
    pub fn new(config: &Config, fx: &FxRate, scraped_at: String) -> Self {
        Self {
            source: config.discovery_url(),
            fx: FxInfo {
                base: config.fx.base_currency.clone(),
                target: config.fx.target_currency.clone(),
                rate: fx.rate,
                provider: fx.provider.clone(),
                fetched_at: fx.fetched_at.clone(),
            },
            scraped_at,
            price_limit: config.harvest.price_limit,
        }
    }
}

/// Case-insensitive name order, so "Sawed-Off" sorts before "SCAR-20".
/// Names that differ only in case put lowercase first, as `localeCompare` does.
pub fn cmp_display_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Folds per-category results into the aggregate snapshot.
pub fn assemble_snapshot(results: &[CategoryResult], ctx: &SnapshotContext) -> Snapshot {
    let weapons: Vec<WeaponSummary> = results
        .iter()
        .map(|r| WeaponSummary {
            weapon: r.weapon.clone(),
            weapon_slug: r.weapon_slug.clone(),
            count: r.count,
        })
        .collect();

    let mut items: Vec<NormalizedItem> = results.iter().flat_map(|r| r.items.iter().cloned()).collect();
    items.sort_by(|a, b| cmp_display_name(&a.weapon, &b.weapon).then_with(|| cmp_by_price(a, b)));

    Snapshot {
        source: ctx.source.clone(),
        currency_target: ctx.fx.target.clone(),
        fx: ctx.fx.clone(),
        scraped_at: ctx.scraped_at.clone(),
        weapons_count: weapons.len(),
        weapons,
        count: items.len(),
        limit_azn: ctx.price_limit,
        items,
    }
}

pub fn category_snapshot(result: &CategoryResult, ctx: &SnapshotContext) -> CategorySnapshot {
    CategorySnapshot {
        source: result.source.clone(),
        weapon: result.weapon.clone(),
        weapon_slug: result.weapon_slug.clone(),
        currency_target: ctx.fx.target.clone(),
        fx: ctx.fx.clone(),
        scraped_at: ctx.scraped_at.clone(),
        count: result.count,
        limit_azn: ctx.price_limit,
        items: result.items.clone(),
    }
}

/// Pretty JSON with two-space indent and a trailing newline.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_pretty_json(value)?)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// Where each output file lands under the configured output directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub dir: PathBuf,
    pub suffix: String,
    pub legacy_slug: String,
    pub legacy_file_stem: String,
}

impl OutputLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dir: config.output.dir.clone(),
            suffix: config.output.file_suffix.clone(),
            legacy_slug: config.output.legacy_slug.clone(),
            legacy_file_stem: config.output.legacy_file_stem.clone(),
        }
    }

    pub fn aggregate_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", crate::constants::AGGREGATE_FILE_STEM, self.suffix))
    }

    pub fn category_path(&self, slug: &str) -> PathBuf {
        self.dir
            .join(crate::constants::PER_WEAPON_DIR)
            .join(format!("{}-{}.json", slug, self.suffix))
    }

    pub fn legacy_path(&self) -> PathBuf {
        self.dir.join(format!("{}-{}.json", self.legacy_file_stem, self.suffix))
    }
}

/// Writes per-category files, the legacy mirror and the aggregate snapshot.
/// Returns the paths written, aggregate last.
pub fn write_outputs(
    layout: &OutputLayout,
    results: &[CategoryResult],
    snapshot: &Snapshot,
    ctx: &SnapshotContext,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(results.len() + 2);

    for result in results {
        let path = layout.category_path(&result.weapon_slug);
        write_json(&path, &category_snapshot(result, ctx))?;
        written.push(path);
    }

    if let Some(legacy) = results
        .iter()
        .find(|r| !layout.legacy_slug.is_empty() && r.weapon_slug == layout.legacy_slug)
    {
        let path = layout.legacy_path();
        write_json(&path, &category_snapshot(legacy, ctx))?;
        written.push(path);
    }

    let path = layout.aggregate_path();
    write_json(&path, snapshot)?;
    info!(
        "Saved {} items under {} {} across {} guns to {}",
        snapshot.count,
        snapshot.limit_azn,
        snapshot.currency_target,
        snapshot.weapons_count,
        path.display()
    );
    written.push(path);

    Ok(written)
}
