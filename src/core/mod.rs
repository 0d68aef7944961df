//! Core quoting logic and the abstractions it depends on

pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod observer;
pub mod quote;

// Re-export main types for cleaner imports
pub use clock::{Clock, SystemClock};
pub use currency::{CurrencyCode, ExchangeRate, RateSource};
pub use error::{CurrencyCodeError, QuoteError, RateError};
pub use observer::{QuoteObserver, RateLookupEvent, TracingObserver};
pub use quote::{ConversionQuote, QuoteCalculator, Rounding};
