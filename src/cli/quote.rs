use super::ui;
use crate::core::config::{AppConfig, RateSourceKind};
use crate::core::{
    Clock, ConversionQuote, CurrencyCode, QuoteCalculator, QuoteError, QuoteObserver, RateSource,
    SystemClock, TracingObserver,
};
use crate::providers::{CachingRateSource, StaticRateSource, YahooRateSource};
use anyhow::{Result, bail};
use chrono::Duration;
use comfy_table::Cell;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// A base amount to be quoted against one or more currencies.
#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub base_currency: CurrencyCode,
    pub base_amount: Decimal,
    pub quote_currencies: Vec<CurrencyCode>,
}

pub type QuoteOutcome = (CurrencyCode, Result<ConversionQuote, QuoteError>);

/// Builds the rate source selected in the config, wrapped in a cache unless
/// `cache.max_age_secs` is zero.
pub fn build_rate_source(config: &AppConfig, clock: Arc<dyn Clock>) -> Box<dyn RateSource> {
    let source: Box<dyn RateSource> = match config.rate_source {
        RateSourceKind::Static => {
            let source = StaticRateSource::from_config(&config.rates, clock.as_ref());
            if source.is_empty() {
                warn!("Static rate source selected but no rates are configured");
            }
            Box::new(source)
        }
        RateSourceKind::Yahoo => Box::new(YahooRateSource::new(
            config.yahoo_base_url(),
            Arc::clone(&clock),
        )),
    };

    let max_age_secs = config.cache.max_age_secs.min(u64::from(u32::MAX));
    if max_age_secs == 0 {
        return source;
    }
    debug!("Caching rates for {}s", max_age_secs);
    Box::new(CachingRateSource::new(
        source,
        Duration::seconds(max_age_secs as i64),
        clock,
    ))
}

pub async fn run(config: &AppConfig, request: &QuoteRequest) -> Result<()> {
    if request.quote_currencies.is_empty() {
        bail!("At least one quote currency is required");
    }

    let source = build_rate_source(config, Arc::new(SystemClock));
    let calculator = QuoteCalculator::new(source, TracingObserver).with_rounding(config.rounding);

    let pb = ui::new_progress_bar(request.quote_currencies.len() as u64);
    let outcomes = quote_all(&calculator, request, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    println!(
        "\n{} {} {}",
        ui::style_text("Quotes for", ui::StyleType::Title),
        request.base_amount,
        request.base_currency
    );
    println!("{}", display_as_table(&outcomes));

    if outcomes.iter().all(|(_, outcome)| outcome.is_err()) {
        bail!("No quote could be computed for {}", request.base_currency);
    }
    Ok(())
}

/// Quotes every requested currency concurrently. Each outcome is reported
/// separately; one failing pair does not affect the others.
pub async fn quote_all<R: RateSource, O: QuoteObserver>(
    calculator: &QuoteCalculator<R, O>,
    request: &QuoteRequest,
    on_progress: &dyn Fn(),
) -> Vec<QuoteOutcome> {
    let futures = request.quote_currencies.iter().map(|quote_currency| async move {
        let outcome = calculator
            .get_quote(&request.base_currency, quote_currency, request.base_amount)
            .await;
        if let Err(e) = &outcome {
            debug!("Quote {}->{} failed: {}", request.base_currency, quote_currency, e);
        }
        on_progress();
        (quote_currency.clone(), outcome)
    });
    join_all(futures).await
}

fn display_as_table(outcomes: &[QuoteOutcome]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Amount"),
        ui::header_cell("Quote"),
    ]);

    for (quote_currency, outcome) in outcomes {
        match outcome {
            Ok(quote) => table.add_row(vec![
                Cell::new(format!("{}->{}", quote.base_currency, quote.quote_currency)),
                ui::amount_cell(quote.base_amount),
                ui::quote_amount_cell(quote.quote_amount),
            ]),
            Err(e) => table.add_row(vec![
                Cell::new(quote_currency.to_string()),
                Cell::new(ui::style_text("N/A", ui::StyleType::Subtle)),
                ui::error_cell(&e.to_string()),
            ]),
        };
    }

    table.to_string()
}
