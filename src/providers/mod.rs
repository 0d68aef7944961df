pub mod caching;
pub mod static_rates;
pub mod util;
pub mod yahoo_finance;

pub use caching::CachingRateSource;
pub use static_rates::StaticRateSource;
pub use yahoo_finance::YahooRateSource;
