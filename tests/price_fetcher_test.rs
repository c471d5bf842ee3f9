use bme_bot::config::{HttpConfig, PricingConfig};
use bme_bot::core::http::build_client;
use bme_bot::domain::ports::PriceSource;
use bme_bot::{BotError, PriceFetcher};
use httpmock::prelude::*;
use rust_decimal_macros::dec;

const PRICING_PAGE: &str = r#"
<!doctype html>
<html lang="en">
<body>
  <nav><table><tr><td>Docs</td><td>Blog</td></tr></table></nav>
  <section>
    <h2>Render pricing</h2>
    <p>Prices are quoted per 200 OctaneBench hours.</p>
    <table class="pricing">
      <thead>
        <tr><th>Tier</th><th>Price per 200 OBh</th><th>Price per OBh</th></tr>
      </thead>
      <tbody>
        <tr><td>Tier 1 – Priority</td><td>€ 80,00</td><td>€ 0,40</td></tr>
        <tr><td>Tier 2 – Economy</td><td>€ 40,00</td><td>€ 0,20</td></tr>
        <tr><td>Tier 3 – Trusted partners</td><td>€&nbsp;1.250,50</td><td>€ 6,2525</td></tr>
      </tbody>
    </table>
  </section>
</body>
</html>
"#;

fn fetcher(url: String, marker: Option<&str>) -> PriceFetcher {
    let client = build_client(&HttpConfig::default()).unwrap();
    PriceFetcher::new(
        client,
        PricingConfig {
            url,
            table_marker: marker.map(str::to_string),
        },
    )
}

#[tokio::test]
async fn test_fetch_prices_one_quote_per_tier_row() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/pricing");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(PRICING_PAGE);
    });

    let quotes = fetcher(server.url("/pricing"), Some("Render pricing"))
        .fetch_prices()
        .await
        .unwrap();

    page_mock.assert();
    assert_eq!(quotes.len(), 3);

    assert_eq!(quotes[0].tier_name, "Tier 1 – Priority");
    assert_eq!(quotes[0].eur_per_200_units, dec!(80.00));
    assert_eq!(quotes[0].eur_per_unit, dec!(0.40));

    assert_eq!(quotes[1].tier_name, "Tier 2 – Economy");
    assert_eq!(quotes[1].eur_per_200_units, dec!(40.00));
    assert_eq!(quotes[1].eur_per_unit, dec!(0.20));

    assert_eq!(quotes[2].eur_per_200_units, dec!(1250.50));
    assert_eq!(quotes[2].eur_per_unit, dec!(6.2525));
}

#[tokio::test]
async fn test_fetch_prices_empty_table_is_parse_error() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/pricing");
        then.status(200).body(
            r#"<html><body><h2>Render pricing</h2>
               <table><thead><tr><th>Tier</th><th>Price per 200 OBh</th></tr></thead>
               <tbody></tbody></table></body></html>"#,
        );
    });

    let result = fetcher(server.url("/pricing"), Some("Render pricing"))
        .fetch_prices()
        .await;

    page_mock.assert();
    assert!(matches!(result, Err(BotError::ParseError { .. })));
}

#[tokio::test]
async fn test_fetch_prices_marker_not_found_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/pricing");
        then.status(200).body(PRICING_PAGE);
    });

    let result = fetcher(server.url("/pricing"), Some("Enterprise plans"))
        .fetch_prices()
        .await;

    assert!(matches!(result, Err(BotError::ParseError { .. })));
}

#[tokio::test]
async fn test_fetch_prices_server_error_is_fetch_error() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET).path("/pricing");
        then.status(503);
    });

    let result = fetcher(server.url("/pricing"), None).fetch_prices().await;

    page_mock.assert();
    match result {
        Err(BotError::HttpStatusError { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected HTTP status error, got {:?}", other),
    }
}
