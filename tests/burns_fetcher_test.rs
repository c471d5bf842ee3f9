use bme_bot::config::{BurnsConfig, HttpConfig};
use bme_bot::core::http::build_client;
use bme_bot::domain::model::BurnsOutcome;
use bme_bot::domain::ports::BurnsSource;
use bme_bot::{BotError, BurnsFetcher};
use chrono::Utc;
use httpmock::prelude::*;
use rust_decimal_macros::dec;
use serde_json::json;

const BURN_ADDRESS: &str = "BurnVau1t1111111111111111111111111111111111";
const TX_PATH: &str = "/v0/addresses/BurnVau1t1111111111111111111111111111111111/transactions";

fn burns_config(base_url: String, api_key: Option<&str>) -> BurnsConfig {
    BurnsConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        burn_address: Some(BURN_ADDRESS.to_string()),
        fallback_url: "https://solscan.io/account/fallback".to_string(),
        ..BurnsConfig::default()
    }
}

fn fetcher(config: BurnsConfig) -> BurnsFetcher {
    BurnsFetcher::new(build_client(&HttpConfig::default()).unwrap(), config)
}

fn transfer_tx(signature: &str, timestamp: i64, amount: f64) -> serde_json::Value {
    json!({
        "signature": signature,
        "timestamp": timestamp,
        "tokenTransfers": [
            {"fromUserAccount": "payer", "toUserAccount": BURN_ADDRESS, "tokenAmount": amount}
        ]
    })
}

#[tokio::test]
async fn test_no_api_key_returns_disabled_without_request() {
    let server = MockServer::start();
    let indexer_mock = server.mock(|when, then| {
        when.method(GET).path(TX_PATH);
        then.status(200).json_body(json!([]));
    });

    let outcome = fetcher(burns_config(server.base_url(), None))
        .fetch_burns(3)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        BurnsOutcome::Disabled {
            fallback_url: "https://solscan.io/account/fallback".to_string()
        }
    );
    indexer_mock.assert_hits(0);
}

#[tokio::test]
async fn test_unsubstituted_api_key_counts_as_missing() {
    let server = MockServer::start();
    let indexer_mock = server.mock(|when, then| {
        when.method(GET).path(TX_PATH);
        then.status(200).json_body(json!([]));
    });

    let outcome = fetcher(burns_config(server.base_url(), Some("${HELIUS_API_KEY}")))
        .fetch_burns(3)
        .await
        .unwrap();

    assert!(matches!(outcome, BurnsOutcome::Disabled { .. }));
    assert_eq!(indexer_mock.hits(), 0);
}

#[tokio::test]
async fn test_api_key_without_burn_address_returns_disabled() {
    let server = MockServer::start();
    let indexer_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/transactions");
        then.status(200).json_body(json!([]));
    });

    let config = BurnsConfig {
        burn_address: None,
        ..burns_config(server.base_url(), Some("k"))
    };
    let outcome = fetcher(config).fetch_burns(3).await.unwrap();

    assert!(matches!(outcome, BurnsOutcome::Disabled { .. }));
    indexer_mock.assert_hits(0);
}

#[tokio::test]
async fn test_totals_include_burns_beyond_limit() {
    let server = MockServer::start();
    let now = Utc::now().timestamp();
    let payload = json!((0..10i64)
        .map(|i| transfer_tx(&format!("sig-{}", i), now - i * 10 * 3600, 1.0))
        .collect::<Vec<_>>());

    server.mock(|when, then| {
        when.method(GET).path(TX_PATH);
        then.status(200).json_body(payload);
    });

    let outcome = fetcher(burns_config(server.base_url(), Some("test-key")))
        .fetch_burns(5)
        .await
        .unwrap();

    let BurnsOutcome::Records { records, totals } = outcome else {
        panic!("expected burn records");
    };
    assert_eq!(records.len(), 5);
    assert_eq!(totals.last_7d, dec!(10));
    assert_eq!(totals.last_30d, dec!(10));
}

#[tokio::test]
async fn test_limit_keeps_newest_records_first() {
    let server = MockServer::start();
    let payload = json!([
        transfer_tx("sig-3", 1_790_000_300, 30.0),
        transfer_tx("sig-5", 1_790_000_500, 50.5),
        transfer_tx("sig-1", 1_790_000_100, 10.0),
        transfer_tx("sig-4", 1_790_000_400, 40.0),
        transfer_tx("sig-2", 1_790_000_200, 20.0)
    ]);

    let indexer_mock = server.mock(|when, then| {
        when.method(GET)
            .path(TX_PATH)
            .header("Authorization", "Bearer test-key")
            .query_param("limit", "100");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(payload);
    });

    let outcome = fetcher(burns_config(server.base_url(), Some("test-key")))
        .fetch_burns(3)
        .await
        .unwrap();

    indexer_mock.assert();
    let BurnsOutcome::Records { records, .. } = outcome else {
        panic!("expected burn records");
    };

    assert_eq!(records.len(), 3);
    let signatures: Vec<&str> = records
        .iter()
        .map(|r| r.transaction_reference.as_str())
        .collect();
    assert_eq!(signatures, vec!["sig-5", "sig-4", "sig-3"]);
    assert_eq!(records[0].amount, dec!(50.5));
    assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
}

#[tokio::test]
async fn test_unauthorized_is_fetch_error() {
    let server = MockServer::start();
    let indexer_mock = server.mock(|when, then| {
        when.method(GET).path(TX_PATH);
        then.status(401).json_body(json!({"error": "invalid api key"}));
    });

    let result = fetcher(burns_config(server.base_url(), Some("wrong-key")))
        .fetch_burns(3)
        .await;

    indexer_mock.assert();
    let err = result.unwrap_err();
    assert!(matches!(err, BotError::HttpStatusError { status: 401, .. }));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_unexpected_payload_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TX_PATH);
        then.status(200).body("<html>maintenance</html>");
    });

    let result = fetcher(burns_config(server.base_url(), Some("test-key")))
        .fetch_burns(3)
        .await;

    assert!(matches!(result, Err(BotError::ParseError { .. })));
}
