//! Client for the VietQR bank-transfer QR API.

pub mod client;
pub mod http;
pub mod types;

pub use client::VietQr;
pub use http::{ApiTransport, HttpClient};

use crate::config::{DEFAULT_API_URL, DEFAULT_GATEWAY_URL};

/// Base URLs without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub gateway_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}
