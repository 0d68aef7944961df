use crate::core::clock::Clock;
use crate::core::currency::{CurrencyCode, ExchangeRate, RateSource};
use crate::core::error::RateError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct CachedRate {
    rate: ExchangeRate,
    fetched_at: DateTime<Utc>,
}

/// Reuses fetched rates for `max_age` after they were fetched. Failed lookups
/// are never stored.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    max_age: Duration,
    clock: Arc<dyn Clock>,
    cache: Mutex<HashMap<(CurrencyCode, CurrencyCode), CachedRate>>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T, max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            max_age,
            clock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CachedRate) -> bool {
        self.clock.now() - entry.fetched_at <= self.max_age
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    async fn get_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ExchangeRate, RateError> {
        let key = (from.clone(), to.clone());
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&key).filter(|entry| self.is_fresh(entry)) {
                debug!("Cache hit for currency rate: {}->{}", from, to);
                return Ok(entry.rate.clone());
            }
        }

        debug!("Cache miss for currency rate: {}->{}", from, to);
        let rate = self.inner.get_rate(from, to).await?;
        let entry = CachedRate {
            rate: rate.clone(),
            fetched_at: self.clock.now(),
        };
        self.cache.lock().await.insert(key, entry);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ManualClock(StdMutex<DateTime<Utc>>);

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(StdMutex::new(now)))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    struct MockInnerSource {
        clock: Arc<ManualClock>,
        call_count: AtomicUsize,
    }

    #[async_trait]
    impl<'a> RateSource for &'a MockInnerSource {
        async fn get_rate(
            &self,
            from: &CurrencyCode,
            to: &CurrencyCode,
        ) -> Result<ExchangeRate, RateError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            // USD rates carry a last market close from days ago
            let observed_at = match to.as_str() {
                "GBP" => self.clock.now(),
                "USD" => self.clock.now() - Duration::days(3),
                _ => {
                    return Err(RateError::NotFound {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            };
            Ok(ExchangeRate {
                from_currency: from.clone(),
                to_currency: to.clone(),
                rate: dec!(0.9),
                observed_at,
            })
        }
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn setup() -> (Arc<ManualClock>, MockInnerSource) {
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let inner = MockInnerSource {
            clock: Arc::clone(&clock),
            call_count: AtomicUsize::new(0),
        };
        (clock, inner)
    }

    #[tokio::test]
    async fn test_caching_rate_source() {
        let (clock, inner) = setup();
        let caching = CachingRateSource::new(&inner, Duration::minutes(5), clock.clone());

        // First call - should hit inner source
        let rate = caching.get_rate(&code("EUR"), &code("GBP")).await.unwrap();
        assert_eq!(rate.rate, dec!(0.9));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        // Second call within max age - should be cached
        clock.advance(Duration::minutes(5));
        caching.get_rate(&code("EUR"), &code("GBP")).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        // Expired entry goes back to the inner source
        clock.advance(Duration::seconds(1));
        caching.get_rate(&code("EUR"), &code("GBP")).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expiry_uses_fetch_time_not_market_time() {
        let (clock, inner) = setup();
        let caching = CachingRateSource::new(&inner, Duration::minutes(5), clock.clone());

        let rate = caching.get_rate(&code("EUR"), &code("USD")).await.unwrap();
        assert_eq!(rate.observed_at, clock.now() - Duration::days(3));

        for _ in 0..2 {
            clock.advance(Duration::minutes(2));
            let cached = caching.get_rate(&code("EUR"), &code("USD")).await.unwrap();
            assert_eq!(cached, rate);
        }
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        // 6 minutes after the fetch
        clock.advance(Duration::minutes(2));
        caching.get_rate(&code("EUR"), &code("USD")).await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let (clock, inner) = setup();
        let caching = CachingRateSource::new(&inner, Duration::minutes(5), clock);

        for _ in 0..2 {
            let result = caching.get_rate(&code("EUR"), &code("JPY")).await;
            assert!(matches!(result, Err(RateError::NotFound { .. })));
        }
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
