use crate::utils::error::{BotError, Result};
use crate::utils::validation::{self, Validate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub telegram: Option<TelegramConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    pub pricing: PricingConfig,
    pub emissions: EmissionsConfig,
    #[serde(default)]
    pub burns: BurnsConfig,
    pub epoch: EpochConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub url: String,
    /// 用來定位價格表的文字（表格內容、caption 或前一個標題）
    pub table_marker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionsConfig {
    pub csv_url: String,
    #[serde(default)]
    pub breakdown: Vec<BreakdownShare>,
}

/// Fixed share of the monthly total, used when the sheet itself carries no
/// category columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownShare {
    pub category: String,
    pub percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_indexer_base_url")]
    pub base_url: String,
    pub burn_address: Option<String>,
    #[serde(default = "default_burn_limit")]
    pub limit: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochConfig {
    pub link: String,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("bme-bot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_indexer_base_url() -> String {
    "https://api.helius.xyz".to_string()
}

fn default_burn_limit() -> usize {
    5
}

fn default_page_size() -> usize {
    100
}

fn default_fallback_url() -> String {
    "https://solscan.io/token/rndrizKT3MK1iimdxRdWabcF7Zg7AR5T4nud4EkHBof".to_string()
}

fn default_explorer_tx_url() -> String {
    "https://solscan.io/tx/".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for BurnsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_indexer_base_url(),
            burn_address: None,
            limit: default_burn_limit(),
            page_size: default_page_size(),
            fallback_url: default_fallback_url(),
            explorer_tx_url: default_explorer_tx_url(),
        }
    }
}

/// 空字串或未替換的 `${VAR}` 視為未設定
fn configured(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with("${"))
}

impl BurnsConfig {
    pub fn api_key(&self) -> Option<&str> {
        configured(&self.api_key)
    }

    pub fn burn_address(&self) -> Option<&str> {
        configured(&self.burn_address)
    }
}

impl BotConfig {
    /// 先載入 `.env`，再讀取 TOML 檔案
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(env_path) => tracing::debug!("Loaded environment from {}", env_path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Failed to load .env file: {}", e),
        }
        Self::from_file(path)
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HELIUS_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BotError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Telegram token, required only by the bot binary.
    pub fn bot_token(&self) -> Result<&str> {
        let token = self
            .telegram
            .as_ref()
            .map(|t| t.bot_token.trim())
            .filter(|t| !t.is_empty() && !t.starts_with("${"))
            .ok_or_else(|| BotError::MissingConfigError {
                field: "telegram.bot_token".to_string(),
            })?;
        Ok(token)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 120)?;
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;

        validation::validate_url("pricing.url", &self.pricing.url)?;
        validation::validate_url("emissions.csv_url", &self.emissions.csv_url)?;

        for share in &self.emissions.breakdown {
            validation::validate_non_empty_string("emissions.breakdown.category", &share.category)?;
        }
        let shares: Vec<Decimal> = self.emissions.breakdown.iter().map(|s| s.percent).collect();
        validation::validate_percent_shares("emissions.breakdown", &shares)?;

        validation::validate_url("burns.base_url", &self.burns.base_url)?;
        validation::validate_url("burns.fallback_url", &self.burns.fallback_url)?;
        validation::validate_url("burns.explorer_tx_url", &self.burns.explorer_tx_url)?;
        validation::validate_positive_number("burns.limit", self.burns.limit, 1)?;
        validation::validate_range("burns.page_size", self.burns.page_size, self.burns.limit, 1000)?;

        validation::validate_url("epoch.link", &self.epoch.link)?;

        if self.burns.api_key().is_some() && self.burns.burn_address().is_none() {
            tracing::warn!("burns.api_key is set but burns.burn_address is not; /burns stays disabled");
        }

        Ok(())
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
