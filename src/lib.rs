pub mod config;
pub mod convert;
pub mod currency_provider;
pub mod log;
pub mod providers;
pub mod quote_provider;
pub mod server;
pub mod store;
pub mod summary;
pub mod ui;

use crate::config::AppConfig;
use crate::currency_provider::fetch_rates;
use crate::quote_provider::QuoteProvider;
use crate::store::SummaryStore;
use crate::summary::SummaryRow;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

pub enum AppCommand {
    Record,
    Serve,
    RecordAndServe,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Stockwatch starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = Arc::new(SummaryStore::open(&config.database_path()?, &config.currencies).await?);

    match command {
        AppCommand::Record => {
            let row = record_snapshot(&config, &store).await?;
            print_row(&row);
            Ok(())
        }
        AppCommand::Serve => server::serve(store, config.listen_port()).await,
        AppCommand::RecordAndServe => {
            // Recording at startup is fire-and-forget; the API still comes up
            // when an upstream fetch fails.
            match record_snapshot(&config, &store).await {
                Ok(row) => print_row(&row),
                Err(e) => error!(error = %e, "Recording failed"),
            }
            server::serve(store, config.listen_port()).await
        }
    }
}

fn print_row(row: &SummaryRow) {
    println!(
        "{}\n\n{}",
        ui::style_text("Recorded snapshot", ui::StyleType::Title),
        row.display_as_table()
    );
}

/// Runs the pipeline once: fetch the quote and the rates, convert, append.
/// Returns the row as stored.
pub async fn record_snapshot(config: &AppConfig, store: &SummaryStore) -> Result<SummaryRow> {
    let api_key = config.quote_api_key()?;
    let quote_base_url = config
        .providers
        .quote
        .as_ref()
        .map_or("https://api.aletheiaapi.com", |p| &p.base_url);
    let rates_base_url = config
        .providers
        .rates
        .as_ref()
        .map_or("https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1", |p| {
            &p.base_url
        });
    let quote_provider = providers::aletheia::AletheiaProvider::new(quote_base_url, &api_key);
    let rate_provider = providers::currency_api::CurrencyApiProvider::new(rates_base_url);

    // The fetches are independent; conversion waits for all of them.
    let (quote, rates) = tokio::try_join!(
        quote_provider.fetch_quote(&config.symbol),
        fetch_rates(&rate_provider, "usd", &config.currencies)
    )?;

    let summary = summary::build(&quote, &rates);
    let id = store.append(&summary).await?;
    info!(
        "Recorded {} at {} USD as row {}",
        quote.stock_symbol, quote.price_usd, id
    );

    store
        .get_by_id(id)
        .await?
        .with_context(|| format!("Recorded row {id} not found"))
}
