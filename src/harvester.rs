use crate::aggregate::aggregate_category;
use crate::app::ports::{HttpClientPort, SleeperPort};
use crate::config::Config;
use crate::discovery::{discover_categories, select_categories};
use crate::error::Result;
use crate::fx::{resolve_rate, FxResolution};
use crate::snapshot::{assemble_snapshot, write_outputs, OutputLayout, Snapshot, SnapshotContext};
use crate::types::{CategoryResult, SkippedCategory};
use chrono::{SecondsFormat, Utc};
use metrics::{counter, histogram};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Everything one run produced, before anything is written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub fx: FxResolution,
    pub context: SnapshotContext,
    pub categories: Vec<CategoryResult>,
    pub skipped: Vec<SkippedCategory>,
    pub snapshot: Snapshot,
}

/// Sequential harvest over every discovered category.
pub struct Harvester {
    http: Arc<dyn HttpClientPort>,
    sleeper: Arc<dyn SleeperPort>,
    config: Config,
    only: Vec<String>,
}

impl Harvester {
    pub fn new(http: Arc<dyn HttpClientPort>, sleeper: Arc<dyn SleeperPort>, config: Config) -> Self {
        Self {
            http,
            sleeper,
            config,
            only: Vec::new(),
        }
    }

    /// Restricts the run to these slugs; unknown slugs are ignored.
    pub fn with_categories(mut self, only: Vec<String>) -> Self {
        self.only = only;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn discover(&self) -> Result<Vec<String>> {
        let slugs = discover_categories(&*self.http, &self.config.discovery_url()).await?;
        Ok(select_categories(slugs, &self.only))
    }

    pub async fn resolve_fx(&self) -> FxResolution {
        resolve_rate(&*self.http, &self.config.fx, &self.config.fx_url()).await
    }

    /// Harvests every category. Only a discovery failure aborts the run;
    /// failed categories are logged and left out.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunOutcome> {
        let started = std::time::Instant::now();
        let slugs = self.discover().await?;
        let fx = self.resolve_fx().await;
        let fx_rate = fx.fx_rate();
        let scraped_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        let policy = self.config.retry_policy();
        let pacing = self.config.pacing();
        let mut categories = Vec::with_capacity(slugs.len());
        let mut skipped = Vec::new();

        for slug in &slugs {
            let source_url = self.config.category_url(slug);
            match aggregate_category(
                &*self.http,
                &*self.sleeper,
                &policy,
                slug,
                &source_url,
                fx_rate.rate,
                self.config.harvest.price_limit,
            )
            .await
            {
                Ok(result) => categories.push(result),
                Err(e) => {
                    warn!("Skipping {}: {}", slug, e);
                    counter!("skins_category_skipped_total").increment(1);
                    skipped.push(SkippedCategory {
                        slug: slug.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            self.sleeper.sleep(pacing).await;
        }

        let context = SnapshotContext::new(&self.config, &fx_rate, scraped_at);
        let snapshot = assemble_snapshot(&categories, &context);

        histogram!("skins_run_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            "Harvested {} of {} categories ({} skipped), {} items",
            categories.len(),
            slugs.len(),
            skipped.len(),
            snapshot.count
        );

        Ok(RunOutcome {
            fx,
            context,
            categories,
            skipped,
            snapshot,
        })
    }

    /// Runs the harvest and writes every output file.
    pub async fn run_and_write(&self) -> Result<(RunOutcome, Vec<PathBuf>)> {
        let outcome = self.run().await?;
        let layout = OutputLayout::from_config(&self.config);
        let written = write_outputs(&layout, &outcome.categories, &outcome.snapshot, &outcome.context)?;
        Ok((outcome, written))
    }
}
