use crate::core::clock::Clock;
use crate::core::config::RateEntry;
use crate::core::currency::{CurrencyCode, ExchangeRate, RateSource};
use crate::core::error::RateError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// Serves a fixed table of rates. Pairs are looked up in the given direction
/// only; an inverse is never derived.
pub struct StaticRateSource {
    rates: HashMap<(CurrencyCode, CurrencyCode), Decimal>,
    observed_at: DateTime<Utc>,
}

impl StaticRateSource {
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            rates: HashMap::new(),
            observed_at: clock.now(),
        }
    }

    pub fn from_config(entries: &[RateEntry], clock: &dyn Clock) -> Self {
        entries.iter().fold(Self::new(clock), |source, entry| {
            source.with_rate(entry.from.clone(), entry.to.clone(), entry.rate)
        })
    }

    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ExchangeRate, RateError> {
        let key = (from.clone(), to.clone());
        let rate = self.rates.get(&key).copied().ok_or_else(|| {
            debug!("No static rate for {}->{}", from, to);
            RateError::NotFound {
                from: from.clone(),
                to: to.clone(),
            }
        })?;

        Ok(ExchangeRate {
            from_currency: from.clone(),
            to_currency: to.clone(),
            rate,
            observed_at: self.observed_at,
        })
    }
}
