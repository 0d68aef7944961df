//! Conversion quotes computed from a single exchange rate lookup

use crate::core::currency::{CurrencyCode, RateSource};
use crate::core::error::QuoteError;
use crate::core::observer::{QuoteObserver, RateLookupEvent};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionQuote {
    pub base_currency: CurrencyCode,
    pub quote_currency: CurrencyCode,
    pub base_amount: Decimal,
    pub quote_amount: Decimal,
}

/// Scale applied to quote amounts. Midpoints round away from zero, so
/// 0.125 becomes 0.13 at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rounding {
    #[serde(default = "Rounding::default_decimal_places")]
    pub decimal_places: u32,
}

impl Rounding {
    fn default_decimal_places() -> u32 {
        2
    }

    pub fn apply(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for Rounding {
    fn default() -> Self {
        Rounding {
            decimal_places: Self::default_decimal_places(),
        }
    }
}

/// Computes quotes against an injected rate source, reporting each lookup to
/// an injected observer.
pub struct QuoteCalculator<R, O> {
    rate_source: R,
    observer: O,
    rounding: Rounding,
}

impl<R: RateSource, O: QuoteObserver> QuoteCalculator<R, O> {
    pub fn new(rate_source: R, observer: O) -> Self {
        Self {
            rate_source,
            observer,
            rounding: Rounding::default(),
        }
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub async fn get_quote(
        &self,
        base_currency: &CurrencyCode,
        quote_currency: &CurrencyCode,
        base_amount: Decimal,
    ) -> Result<ConversionQuote, QuoteError> {
        if base_currency == quote_currency {
            return Err(QuoteError::SameCurrency(base_currency.clone()));
        }
        if base_amount < Decimal::ZERO {
            return Err(QuoteError::InvalidAmount(base_amount));
        }

        let started = Instant::now();
        let rate = self
            .rate_source
            .get_rate(base_currency, quote_currency)
            .await?;
        let elapsed = started.elapsed();

        if rate.rate <= Decimal::ZERO {
            return Err(QuoteError::InvalidRate {
                from: base_currency.clone(),
                to: quote_currency.clone(),
                rate: rate.rate,
            });
        }

        let quote_amount = base_amount
            .checked_mul(rate.rate)
            .map(|amount| self.rounding.apply(amount))
            .ok_or(QuoteError::Overflow {
                amount: base_amount,
                rate: rate.rate,
            })?;
        debug!(%base_amount, rate = %rate.rate, %quote_amount, "Computed quote amount");

        self.observer.rate_retrieved(&RateLookupEvent {
            from_currency: base_currency.clone(),
            to_currency: quote_currency.clone(),
            elapsed,
        });

        Ok(ConversionQuote {
            base_currency: base_currency.clone(),
            quote_currency: quote_currency.clone(),
            base_amount,
            quote_amount,
        })
    }
}
