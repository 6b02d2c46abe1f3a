use crate::app::ports::HttpClientPort;
use crate::config::FxConfig;
use crate::constants::FX_FALLBACK_PROVIDER;
use crate::types::FxRate;
use chrono::{SecondsFormat, Utc};
use metrics::counter;
use serde_json::Value;
use tracing::{info, instrument, warn};

/// How the run's conversion rate was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum FxResolution {
    Resolved {
        rate: f64,
        provider: String,
        fetched_at: String,
    },
    Fallback {
        rate: f64,
        reason: String,
    },
}

impl FxResolution {
    pub fn rate(&self) -> f64 {
        match self {
            FxResolution::Resolved { rate, .. } | FxResolution::Fallback { rate, .. } => *rate,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FxResolution::Fallback { .. })
    }

    pub fn fx_rate(&self) -> FxRate {
        match self {
            FxResolution::Resolved {
                rate,
                provider,
                fetched_at,
            } => FxRate {
                rate: *rate,
                provider: provider.clone(),
                fetched_at: Some(fetched_at.clone()),
            },
            FxResolution::Fallback { rate, .. } => FxRate {
                rate: *rate,
                provider: FX_FALLBACK_PROVIDER.to_string(),
                fetched_at: None,
            },
        }
    }
}

/// Pulls `rates.<target>` out of the FX response body.
fn parse_rate(body: &str, target: &str) -> Result<f64, String> {
    let data: Value = serde_json::from_str(body).map_err(|e| format!("invalid FX body: {e}"))?;
    let raw = data
        .get("rates")
        .and_then(|r| r.get(target))
        .ok_or_else(|| format!("rates.{target} missing"))?;
    let rate = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("rates.{target} is not a number"))?;

    if !rate.is_finite() || rate <= 0.0 {
        return Err(format!("Invalid {target} rate from FX source: {rate}"));
    }
    Ok(rate)
}

async fn fetch_rate(http: &dyn HttpClientPort, url: &str, target: &str) -> Result<f64, String> {
    let resp = http.get(url).await?;
    if !resp.is_success() {
        return Err(format!("FX request failed: {}", resp.status));
    }
    parse_rate(&resp.body, target)
}

/// Resolves the base→target rate for this run. Never fails: any problem
/// becomes `FxResolution::Fallback` carrying the reason.
#[instrument(skip(http, fx))]
pub async fn resolve_rate(http: &dyn HttpClientPort, fx: &FxConfig, url: &str) -> FxResolution {
    match fetch_rate(http, url, &fx.target_currency).await {
        Ok(rate) => {
            info!("{}→{} rate {} from {}", fx.base_currency, fx.target_currency, rate, fx.provider);
            FxResolution::Resolved {
                rate,
                provider: fx.provider.clone(),
                fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }
        }
        Err(reason) => {
            warn!("FX lookup failed ({}); using fallback rate {}", reason, fx.fallback_rate);
            counter!("skins_fx_fallback_total").increment(1);
            FxResolution::Fallback {
                rate: fx.fallback_rate,
                reason,
            }
        }
    }
}
