//! Trade history pages through `public/get_last_trades_by_instrument_and_time`.

use async_trait::async_trait;

use super::http_client::DeribitHttpClient;
use crate::application::ports::{TradeHistoryError, TradeHistoryPort, TradePage};
use crate::domain::pagination::TradeQuery;
use crate::infrastructure::metrics::{self, Endpoint};

const TRADES_BY_TIME_PATH: &str = "/api/v2/public/get_last_trades_by_instrument_and_time";

/// Deribit implementation of [`TradeHistoryPort`].
#[derive(Debug, Clone)]
pub struct DeribitTradeHistory {
    http: DeribitHttpClient,
    url: String,
}

impl DeribitTradeHistory {
    /// Create a history source against `history_host`.
    #[must_use]
    pub fn new(http: DeribitHttpClient, history_host: &str) -> Self {
        Self {
            http,
            url: format!("{}{TRADES_BY_TIME_PATH}", history_host.trim_end_matches('/')),
        }
    }
}

fn query_params(query: &TradeQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("instrument_name", query.instrument_name.clone()),
        ("start_timestamp", query.start_timestamp.to_string()),
        ("end_timestamp", query.end_timestamp.to_string()),
        ("count", query.count.to_string()),
    ];
    if let Some(token) = &query.continuation {
        params.push(("continuation", token.clone()));
    }
    params
}

#[async_trait]
impl TradeHistoryPort for DeribitTradeHistory {
    async fn fetch_page(&self, query: &TradeQuery) -> Result<TradePage, TradeHistoryError> {
        let page: TradePage = self
            .http
            .get_result(Endpoint::TradeHistory, &self.url, &query_params(query))
            .await?;

        metrics::record_trades_fetched(page.trades.len() as u64);
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn query(continuation: Option<&str>) -> TradeQuery {
        TradeQuery {
            instrument_name: "BTC-1JAN24-40000-C".to_string(),
            start_timestamp: 1_699_395_200_000,
            end_timestamp: 1_700_000_000_000,
            count: 1000,
            continuation: continuation.map(str::to_string),
        }
    }

    #[test]
    fn continuation_only_sent_when_present() {
        let without = query_params(&query(None));
        assert!(without.iter().all(|(k, _)| *k != "continuation"));
        assert_eq!(without.len(), 4);

        let with = query_params(&query(Some("abc")));
        assert!(with.contains(&("continuation", "abc".to_string())));
    }

    #[tokio::test]
    async fn fetches_page_with_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TRADES_BY_TIME_PATH))
            .and(query_param("instrument_name", "BTC-1JAN24-40000-C"))
            .and(query_param("start_timestamp", "1699395200000"))
            .and(query_param("end_timestamp", "1700000000000"))
            .and(query_param("count", "1000"))
            .and(query_param("continuation", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "result": {
                    "trades": [
                        { "trade_id": "BTC-1", "timestamp": 1_699_999_000_000_i64, "price": 0.05 },
                        { "trade_id": "BTC-2", "timestamp": 1_699_999_500_000_i64, "price": 0.06 }
                    ],
                    "has_more": true
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = DeribitHttpClient::new(Duration::from_secs(5)).unwrap();
        let history = DeribitTradeHistory::new(http, &server.uri());
        let page = history.fetch_page(&query(Some("abc"))).await.unwrap();

        assert_eq!(page.trades.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.continuation, None);
        assert_eq!(page.signals().last_timestamp, Some(1_699_999_500_000));
        assert_eq!(page.trades[0].get("trade_id"), Some(&json!("BTC-1")));
    }

    #[tokio::test]
    async fn null_continuation_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "trades": [], "continuation": null, "has_more": false }
            })))
            .mount(&server)
            .await;

        let http = DeribitHttpClient::new(Duration::from_secs(5)).unwrap();
        let history = DeribitTradeHistory::new(http, &server.uri());
        let page = history.fetch_page(&query(None)).await.unwrap();

        assert!(page.trades.is_empty());
        assert_eq!(page.continuation, None);
    }

    #[tokio::test]
    async fn http_error_maps_to_trade_history_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 10_020, "message": "instrument_not_found" }
            })))
            .mount(&server)
            .await;

        let http = DeribitHttpClient::new(Duration::from_secs(5)).unwrap();
        let history = DeribitTradeHistory::new(http, &server.uri());
        let err = history.fetch_page(&query(None)).await.unwrap_err();

        match err {
            TradeHistoryError::HttpStatus { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("instrument_not_found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
