use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::clock::Clock;
use crate::core::currency::{CurrencyCode, ExchangeRate, RateSource};
use crate::core::error::RateError;

const REQUEST_RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 200;

/// Looks up spot rates from a Yahoo Finance compatible chart endpoint.
pub struct YahooRateSource {
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl YahooRateSource {
    pub fn new(base_url: &str, clock: Arc<dyn Clock>) -> Self {
        YahooRateSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            clock,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Option<Vec<CurrencyChartItem>>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Decimal,
    #[serde(alias = "regularMarketTime")]
    regular_market_time: Option<i64>,
}

#[async_trait]
impl RateSource for YahooRateSource {
    #[instrument(
        name = "YahooRateFetch",
        skip(self),
        fields(from = %from, to = %to)
    )]
    async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ExchangeRate, RateError> {
        let symbol = format!("{from}{to}=X");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("fxq/1.0")
            .build()
            .map_err(|e| RateError::Unavailable(e.into()))?;

        let response = with_retry(|| client.get(&url).send(), REQUEST_RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| {
                RateError::Unavailable(anyhow!(
                    "Request error: {} for currency pair: {}",
                    e,
                    symbol
                ))
            })?;

        let not_found = || RateError::NotFound {
            from: from.clone(),
            to: to.clone(),
        };

        if response.status() == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !response.status().is_success() {
            return Err(RateError::Unavailable(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RateError::Unavailable(e.into()))?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text).map_err(|e| {
            RateError::Unavailable(anyhow!(
                "Failed to parse JSON response for {}: {}",
                symbol,
                e
            ))
        })?;

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(not_found)?;

        let observed_at = item
            .meta
            .regular_market_time
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| self.clock.now());

        Ok(ExchangeRate {
            from_currency: from.clone(),
            to_currency: to.clone(),
            rate: item.meta.regular_market_price,
            observed_at,
        })
    }
}
