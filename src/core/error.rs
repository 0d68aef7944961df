//! Error types for currency parsing, rate lookups and quoting

use crate::core::currency::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyCodeError {
    #[error("Invalid currency code: {0:?} (expected three letters, e.g. EUR)")]
    Invalid(String),
}

/// Failures reported by a [`RateSource`](crate::core::currency::RateSource).
#[derive(Debug, Error)]
pub enum RateError {
    #[error("No exchange rate found for {from}->{to}")]
    NotFound { from: CurrencyCode, to: CurrencyCode },

    #[error("Rate source unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Cannot quote {0} against itself")]
    SameCurrency(CurrencyCode),

    #[error("Invalid amount {0}: amount must not be negative")]
    InvalidAmount(Decimal),

    #[error("Invalid exchange rate {rate} for {from}->{to}: rate must be positive")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
    },

    #[error("Quote for amount {amount} at rate {rate} overflows")]
    Overflow { amount: Decimal, rate: Decimal },

    #[error(transparent)]
    Rate(#[from] RateError),
}

impl QuoteError {
    /// True when the rate source reported an unsupported pair.
    pub fn is_rate_not_found(&self) -> bool {
        matches!(self, QuoteError::Rate(RateError::NotFound { .. }))
    }
}
