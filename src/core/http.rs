use crate::config::HttpConfig;
use crate::utils::error::{BotError, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Build the shared client. Every request made through it is bounded by
/// `timeout_seconds`.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// 發送單次請求並取得文字內容，非 2xx 視為錯誤
pub async fn get_text(request: RequestBuilder, source_name: &str) -> Result<String> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("{} responded with status {}", source_name, status);

    if !status.is_success() {
        return Err(BotError::HttpStatusError {
            source_name: source_name.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response.text().await?)
}

pub async fn get_json(request: RequestBuilder, source_name: &str) -> Result<serde_json::Value> {
    let body = get_text(request, source_name).await?;
    serde_json::from_str(&body).map_err(|e| BotError::parse(source_name, format!("invalid JSON: {}", e)))
}
