use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use tracing::warn;
use url::Url;

use crate::vietqr::types::{Credentials, TransferParameters};
use crate::vietqr::Endpoints;

pub const DEFAULT_API_URL: &str = "https://api.vietqr.io";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.vietqr.io";
pub const DEFAULT_CLEANUP_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub credentials: Credentials,
    pub api_url: String,
    pub gateway_url: String,
    pub log_level: String,
    pub logs_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub cleanup_delay: Duration,
    pub default_transfer: TransferParameters,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Loads the configuration on first use. Every later call returns the same instance.
pub fn init() -> Result<&'static Config> {
    CONFIG.get_or_try_init(Config::load)
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_required(name: &str) -> Result<String> {
    let value = env::var(name).unwrap_or_default();
    if value.trim().is_empty() {
        return Err(anyhow!("{name} is not defined in the environment or .env file"));
    }
    Ok(value.trim().to_string())
}

fn env_base_url(name: &str, default: &str) -> Result<String> {
    let value = env_string(name, default);
    let trimmed = value.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|err| anyhow!("Invalid {name} value '{value}': {err}"))?;
    Ok(trimmed.to_string())
}

fn cleanup_delay_from_env(name: &str) -> Duration {
    Duration::from_secs(env_u64(name, DEFAULT_CLEANUP_SECONDS))
}

fn default_transfer_from_env() -> TransferParameters {
    let fallback = TransferParameters::default();
    let transfer = TransferParameters {
        bank: env_string("DEFAULT_BANK", &fallback.bank),
        account_name: env_string("DEFAULT_ACCOUNT_NAME", &fallback.account_name),
        account_number: env_string("DEFAULT_ACCOUNT_NUMBER", &fallback.account_number),
        amount: env_string("DEFAULT_AMOUNT", &fallback.amount),
        memo: env_string("DEFAULT_MEMO", &fallback.memo),
        template: env_string("DEFAULT_TEMPLATE", &fallback.template),
    };
    if transfer.missing_required() {
        warn!("DEFAULT_BANK or DEFAULT_ACCOUNT_NUMBER is empty; /qr will warn on every call.");
    }
    transfer
}

impl Config {
    pub fn load() -> Result<Self> {
        let bot_token = env_required("TELEGRAM_BOT_TOKEN")?;
        let client_id = env_required("VIETQR_CLIENT_ID")?;
        let api_key = env_required("VIETQR_API_KEY")?;

        Ok(Config {
            bot_token,
            credentials: Credentials::new(client_id, api_key),
            api_url: env_base_url("VIETQR_API_URL", DEFAULT_API_URL)?,
            gateway_url: env_base_url("VIETQR_GATEWAY_URL", DEFAULT_GATEWAY_URL)?,
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            logs_dir: PathBuf::from(env_string("LOGS_DIR", "logs")),
            tmp_dir: PathBuf::from(env_string("QR_TMP_DIR", "tmp")),
            cleanup_delay: cleanup_delay_from_env("QR_CLEANUP_SECONDS"),
            default_transfer: default_transfer_from_env(),
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            api_url: self.api_url.clone(),
            gateway_url: self.gateway_url.clone(),
        }
    }
}
