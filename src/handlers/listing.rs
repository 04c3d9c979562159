use std::fmt::Write as _;

use anyhow::Result;
use teloxide::types::ChatId;
use tracing::error;

use crate::handlers::chat::ChatTransport;
use crate::vietqr::types::{Bank, ResponseEnvelope, Template, VietQrError};
use crate::vietqr::{ApiTransport, VietQr};

pub const BANK_PREVIEW_LIMIT: usize = 10;
pub const BANKS_RETRY_MESSAGE: &str = "Error fetching banks. Please try again later.";
pub const TEMPLATES_RETRY_MESSAGE: &str = "Error fetching templates. Please try again later.";

pub fn render_banks(banks: &[Bank]) -> String {
    let mut text = String::from("Supported banks:\n\n");
    for bank in banks.iter().take(BANK_PREVIEW_LIMIT) {
        let _ = writeln!(text, "- {} (ID: {})", bank.name, bank.bin);
    }
    let _ = write!(
        text,
        "\nTotal {} banks supported. This is a partial list.",
        banks.len()
    );
    text
}

pub fn render_templates(templates: &[Template]) -> String {
    let mut text = String::from("Available templates:\n\n");
    for template in templates {
        let _ = writeln!(text, "- {} (code: {})", template.name, template.template);
    }
    text
}

fn listing_reply<T>(
    result: Result<ResponseEnvelope, VietQrError>,
    label: &str,
    parse: impl FnOnce(&ResponseEnvelope) -> serde_json::Result<T>,
    render: impl FnOnce(&T) -> String,
) -> Result<String> {
    let envelope = match result {
        Ok(envelope) => envelope,
        Err(err) => return Ok(format!("Error fetching {label}: {err}")),
    };
    if !envelope.is_success() {
        return Ok(format!("Error fetching {label}: {}", envelope.desc));
    }
    let items = parse(&envelope)?;
    Ok(render(&items))
}

pub async fn run_banks_command<C, T>(chat: &C, chat_id: ChatId, service: &VietQr<T>) -> Result<()>
where
    C: ChatTransport,
    T: ApiTransport,
{
    chat.send_text(chat_id, "Fetching list of supported banks...")
        .await?;
    let reply = listing_reply(
        service.list_banks().await,
        "banks",
        ResponseEnvelope::banks,
        |banks: &Vec<Bank>| render_banks(banks),
    )
    .unwrap_or_else(|err| {
        error!("Error fetching banks: {err}");
        BANKS_RETRY_MESSAGE.to_string()
    });
    chat.send_text(chat_id, &reply).await
}

pub async fn run_templates_command<C, T>(
    chat: &C,
    chat_id: ChatId,
    service: &VietQr<T>,
) -> Result<()>
where
    C: ChatTransport,
    T: ApiTransport,
{
    chat.send_text(chat_id, "Fetching available templates...")
        .await?;
    let reply = listing_reply(
        service.list_templates().await,
        "templates",
        ResponseEnvelope::templates,
        |templates: &Vec<Template>| render_templates(templates),
    )
    .unwrap_or_else(|err| {
        error!("Error fetching templates: {err}");
        TEMPLATES_RETRY_MESSAGE.to_string()
    });
    chat.send_text(chat_id, &reply).await
}
