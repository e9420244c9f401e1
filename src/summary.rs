use crate::convert::convert;
use crate::currency_provider::ExchangeRate;
use crate::quote_provider::Quote;
use crate::ui;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A snapshot assembled from one quote and its converted prices, ready to be
/// appended to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub date: DateTime<Utc>,
    pub name: String,
    pub stock_symbol: String,
    pub price_usd: f64,
    /// Converted prices keyed by column name, e.g. "priceEUR" -> 138.0.
    pub converted: BTreeMap<String, f64>,
}

/// A persisted snapshot as read back from the store.
///
/// Serializes with the wire field names the HTTP API exposes; the converted
/// price columns flatten into top-level keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub name: String,
    #[serde(rename = "stockSymbol")]
    pub stock_symbol: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    #[serde(flatten)]
    pub converted: BTreeMap<String, f64>,
}

/// Builds a snapshot from a fetched quote and the fetched rates, stamped with
/// the current instant. Exactly one converted price per rate, no omissions.
pub fn build(quote: &Quote, rates: &[ExchangeRate]) -> Summary {
    let converted = rates
        .iter()
        .map(|rate| (rate.column.clone(), convert(quote.price_usd, rate.rate)))
        .collect();
    Summary {
        date: Utc::now(),
        name: quote.name.clone(),
        stock_symbol: quote.stock_symbol.clone(),
        price_usd: quote.price_usd,
        converted,
    }
}

impl SummaryRow {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        let mut header = vec![
            ui::header_cell("Id"),
            ui::header_cell("Date"),
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell("Price (USD)"),
        ];
        for column in self.converted.keys() {
            let code = column.trim_start_matches("price");
            header.push(ui::header_cell(&format!("Price ({code})")));
        }
        table.set_header(header);

        let mut row = vec![
            Cell::new(self.id),
            Cell::new(self.date.to_rfc3339()),
            Cell::new(&self.stock_symbol),
            Cell::new(&self.name),
            Cell::new(format!("{:.2}", self.price_usd)),
        ];
        for value in self.converted.values() {
            row.push(Cell::new(format!("{value:.2}")));
        }
        table.add_row(row);

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price_usd: f64) -> Quote {
        Quote {
            name: "Apple Inc.".to_string(),
            stock_symbol: "AAPL".to_string(),
            price_usd,
        }
    }

    #[test]
    fn test_build_converts_single_currency() {
        let rates = vec![ExchangeRate::new("eur", 0.92).unwrap()];
        let summary = build(&quote(150.0), &rates);

        assert_eq!(summary.name, "Apple Inc.");
        assert_eq!(summary.stock_symbol, "AAPL");
        assert_eq!(summary.price_usd, 150.0);
        assert_eq!(summary.converted.get("priceEUR"), Some(&138.0));
        assert_eq!(summary.converted.len(), 1);
    }

    #[test]
    fn test_build_converts_every_requested_currency() {
        let rates = vec![
            ExchangeRate::new("eur", 0.92).unwrap(),
            ExchangeRate::new("dkk", 6.90).unwrap(),
        ];
        let summary = build(&quote(100.0), &rates);

        let columns: Vec<&String> = summary.converted.keys().collect();
        assert_eq!(columns, vec!["priceDKK", "priceEUR"]);
        assert_eq!(summary.converted.get("priceEUR"), Some(&92.0));
        assert_eq!(summary.converted.get("priceDKK"), Some(&690.0));
    }

    #[test]
    fn test_row_serializes_with_wire_names() {
        let mut converted = BTreeMap::new();
        converted.insert("priceEUR".to_string(), 138.0);
        let row = SummaryRow {
            id: 1,
            date: "2024-05-01T12:00:00Z".parse().unwrap(),
            name: "Apple Inc.".to_string(),
            stock_symbol: "AAPL".to_string(),
            price_usd: 150.0,
            converted,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["stockSymbol"], "AAPL");
        assert_eq!(json["priceUSD"], 150.0);
        assert_eq!(json["priceEUR"], 138.0);
        assert!(json.get("converted").is_none());
    }
}
