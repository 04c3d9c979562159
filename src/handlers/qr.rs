use std::path::PathBuf;

use anyhow::Result;
use teloxide::types::ChatId;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::handlers::artifact::{decode_qr_image, ArtifactStore};
use crate::handlers::chat::ChatTransport;
use crate::handlers::params::{merge, parse_overrides, quick_link_media};
use crate::vietqr::types::TransferParameters;
use crate::vietqr::{ApiTransport, VietQr};

pub const MISSING_REQUIRED_MESSAGE: &str =
    "Bank ID and account number are required. Using defaults.";
pub const GENERATING_MESSAGE: &str = "Generating QR code...";
pub const ARTIFACT_FAILURE_MESSAGE: &str =
    "Error saving or sending QR code. Please try again later.";

/// What happened to one `/qr` command.
#[derive(Debug)]
pub enum QrOutcome {
    /// The image was sent; `cleanup` deletes the transient file later.
    Delivered {
        path: PathBuf,
        cleanup: JoinHandle<()>,
    },
    /// The remote reply carried no usable image.
    Rejected { reason: String },
    /// Decoding, writing or sending the image failed.
    ArtifactFailed,
    MissingCredentials,
}

impl QrOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            QrOutcome::Delivered { .. } => "success",
            QrOutcome::Rejected { .. } => "rejected",
            QrOutcome::ArtifactFailed => "artifact_error",
            QrOutcome::MissingCredentials => "missing_credentials",
        }
    }
}

pub struct QrContext<'a, T> {
    pub service: &'a VietQr<T>,
    pub store: &'a ArtifactStore,
    pub defaults: &'a TransferParameters,
}

pub fn transfer_caption(params: &TransferParameters) -> String {
    format!(
        "QR Code for bank transfer:\nBank: {}\nAccount: {}\nName: {}\nAmount: {} VND\nMemo: {}",
        params.bank, params.account_number, params.account_name, params.amount, params.memo
    )
}

pub fn error_message(reason: &str) -> String {
    format!("Error generating QR code: {reason}")
}

pub async fn run_qr_command<C, T>(
    chat: &C,
    chat_id: ChatId,
    ctx: &QrContext<'_, T>,
    args: &str,
) -> Result<QrOutcome>
where
    C: ChatTransport,
    T: ApiTransport,
{
    let params = merge(ctx.defaults, &parse_overrides(args));
    if params.missing_required() {
        chat.send_text(chat_id, MISSING_REQUIRED_MESSAGE).await?;
    }

    chat.send_text(chat_id, GENERATING_MESSAGE).await?;
    info!("Generating QR with params: {:?}", params);

    let envelope = match ctx.service.generate_qr(&params).await {
        Ok(envelope) => envelope,
        Err(err) => {
            chat.send_text(chat_id, &error_message(&err.to_string()))
                .await?;
            return Ok(QrOutcome::MissingCredentials);
        }
    };

    let data_url = match envelope.qr_data_url() {
        Some(data_url) if envelope.is_success() => data_url,
        _ => {
            let reason = envelope.failure_reason();
            error!(
                code = %envelope.code,
                error = ?envelope.error,
                "QR generation returned no image: {reason}"
            );
            chat.send_text(chat_id, &error_message(&reason)).await?;
            return Ok(QrOutcome::Rejected { reason });
        }
    };
    info!("QR data URL received, length: {}", data_url.len());

    deliver_artifact(chat, chat_id, ctx.store, data_url, &transfer_caption(&params)).await
}

async fn deliver_artifact<C: ChatTransport>(
    chat: &C,
    chat_id: ChatId,
    store: &ArtifactStore,
    data_url: &str,
    caption: &str,
) -> Result<QrOutcome> {
    let path = match decode_qr_image(data_url) {
        Ok(bytes) => store.persist(&bytes).await,
        Err(err) => Err(err),
    };
    let path = match path {
        Ok(path) => path,
        Err(err) => {
            error!("Error handling QR code file: {err}");
            chat.send_text(chat_id, ARTIFACT_FAILURE_MESSAGE).await?;
            return Ok(QrOutcome::ArtifactFailed);
        }
    };

    if let Err(err) = chat.send_image_file(chat_id, &path, caption).await {
        warn!("Failed to send QR image {}: {err}", path.display());
        store.schedule_removal(path);
        chat.send_text(chat_id, ARTIFACT_FAILURE_MESSAGE).await?;
        return Ok(QrOutcome::ArtifactFailed);
    }
    info!("QR code sent to chat {}", chat_id.0);

    let cleanup = store.schedule_removal(path.clone());
    Ok(QrOutcome::Delivered { path, cleanup })
}

/// `/qrlink`: same parameters as `/qr`, answered with a direct image URL.
pub async fn run_quick_link_command<C, T>(
    chat: &C,
    chat_id: ChatId,
    service: &VietQr<T>,
    defaults: &TransferParameters,
    args: &str,
) -> Result<Option<String>>
where
    C: ChatTransport,
    T: ApiTransport,
{
    let overrides = parse_overrides(args);
    let params = merge(defaults, &overrides);
    if params.missing_required() {
        chat.send_text(chat_id, MISSING_REQUIRED_MESSAGE).await?;
    }

    match service.generate_quick_link(&params, quick_link_media(&overrides)) {
        Ok(link) => {
            chat.send_text(chat_id, &format!("{}\n\n{link}", transfer_caption(&params)))
                .await?;
            Ok(Some(link))
        }
        Err(err) => {
            chat.send_text(chat_id, &error_message(&err.to_string()))
                .await?;
            Ok(None)
        }
    }
}
