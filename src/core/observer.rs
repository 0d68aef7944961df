//! Observability sink for quote computations

use crate::core::currency::CurrencyCode;
use std::time::Duration;
use tracing::info;

/// Emitted once per successful quote, after the rate lookup completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLookupEvent {
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub elapsed: Duration,
}

impl RateLookupEvent {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Receives quote events. Implementations must not panic; nothing is
/// returned to the caller.
pub trait QuoteObserver: Send + Sync {
    fn rate_retrieved(&self, event: &RateLookupEvent);
}

/// Forwards events to `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl QuoteObserver for TracingObserver {
    fn rate_retrieved(&self, event: &RateLookupEvent) {
        info!(
            from_currency = %event.from_currency,
            to_currency = %event.to_currency,
            elapsed_ms = event.elapsed_ms(),
            "Retrieved quote for currencies {}->{} in {}ms",
            event.from_currency,
            event.to_currency,
            event.elapsed_ms()
        );
    }
}
