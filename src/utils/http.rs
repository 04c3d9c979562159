use once_cell::sync::Lazy;
use reqwest::Client;
use tracing::warn;

// No request timeout: a slow VietQR call only delays its own command.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|err| {
            warn!("Failed to build configured HTTP client, using defaults: {err}");
            Client::new()
        })
});

pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
