use crate::app::ports::{HttpClientPort, SleeperPort};
use crate::error::{Result, ScraperError};
use metrics::counter;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Bounded retry for category pages.
///
/// Only `retryable_status` is retried, with a linear delay of
/// `backoff_unit * attempt`. Everything else is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
    pub retryable_status: u16,
}

impl RetryPolicy {
    pub fn should_retry(&self, status: u16, attempt: u32) -> bool {
        status == self.retryable_status && attempt < self.max_attempts
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

/// Downloads one category page, sleeping between rate-limited attempts.
#[instrument(skip(http, sleeper, policy))]
pub async fn fetch_category_page(
    http: &dyn HttpClientPort,
    sleeper: &dyn SleeperPort,
    policy: &RetryPolicy,
    slug: &str,
    url: &str,
) -> Result<String> {
    let mut attempt = 1;
    loop {
        counter!("skins_category_fetch_attempts_total").increment(1);
        let resp = http.get(url).await.map_err(|reason| ScraperError::Fetch {
            slug: slug.to_string(),
            reason,
        })?;

        if resp.is_success() {
            debug!("Fetched {} ({} bytes) on attempt {}", url, resp.body.len(), attempt);
            return Ok(resp.body);
        }

        if !policy.should_retry(resp.status, attempt) {
            return Err(ScraperError::Fetch {
                slug: slug.to_string(),
                reason: format!("HTTP {}", resp.status),
            });
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "Rate limited on {} (attempt {}/{}), retrying in {}ms",
            slug,
            attempt,
            policy.max_attempts,
            delay.as_millis()
        );
        sleeper.sleep(delay).await;
        attempt += 1;
    }
}
