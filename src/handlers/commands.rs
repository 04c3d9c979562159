use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use tracing::error;

use crate::handlers::listing::{run_banks_command, run_templates_command};
use crate::handlers::qr::{error_message, run_qr_command, run_quick_link_command, QrContext};
use crate::state::AppState;
use crate::utils::timing::CommandTimer;

static KNOWN_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(start|help|qrlink|qr|banks|templates)(@\S+)?(\s|$)")
        .expect("command pattern is valid")
});

pub const UNKNOWN_COMMAND_TEXT: &str = "Unknown command. Type /help to see available commands.";

const START_TEXT: &str = "Welcome to VietQR Bot! Use /qr command to generate a QR code for bank transfer.

Example: /qr bank=970415 accountName=Example accountNumber=123456789 amount=100000 memo=Payment template=compact

All parameters are optional. If not provided, default values will be used.";

const HELP_TEXT: &str = "Commands:
/start - Start the bot
/help - Show this help message
/banks - List supported banks
/templates - List available QR templates
/qr - Generate a QR code with default values
/qr [params] - Generate a QR code with custom parameters
/qrlink [params] - Get a direct image link instead of a photo (add media=jpg for JPEG)

Available parameters:
- bank: Bank ID (e.g., 970415)
- accountName: Account name
- accountNumber: Bank account number
- amount: Amount to transfer
- memo: Transfer description
- template: QR template (xefSukK or qr_only, compact, compact2)

Example: /qr bank=970415 accountName=John accountNumber=123456789 amount=100000 memo=Payment template=xefSukK";

/// Slash-prefixed text that none of the bot's commands claim.
pub fn is_unknown_command(text: &str) -> bool {
    text.starts_with('/') && !KNOWN_COMMAND.is_match(text)
}

pub async fn start_handler(bot: Bot, message: Message) -> Result<()> {
    bot.send_message(message.chat.id, START_TEXT)
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
    Ok(())
}

pub async fn help_handler(bot: Bot, message: Message) -> Result<()> {
    bot.send_message(message.chat.id, HELP_TEXT)
        .reply_parameters(ReplyParameters::new(message.id))
        .await?;
    Ok(())
}

pub async fn unknown_command_handler(bot: Bot, message: Message) -> Result<()> {
    bot.send_message(message.chat.id, UNKNOWN_COMMAND_TEXT)
        .await?;
    Ok(())
}

pub async fn qr_handler(bot: Bot, state: AppState, message: Message, args: String) -> Result<()> {
    let chat_id = message.chat.id;
    let mut timer = CommandTimer::start("qr", chat_id.0, &args);
    let ctx = QrContext {
        service: state.vietqr.as_ref(),
        store: &state.artifacts,
        defaults: state.defaults.as_ref(),
    };

    match run_qr_command(&bot, chat_id, &ctx, &args).await {
        Ok(outcome) => timer.complete(outcome.status(), None),
        Err(err) => {
            error!("Error in QR generation: {err:#}");
            timer.complete("error", Some(err.to_string().as_str()));
            bot.send_message(chat_id, error_message(&err.to_string()))
                .await?;
        }
    }
    Ok(())
}

pub async fn qrlink_handler(
    bot: Bot,
    state: AppState,
    message: Message,
    args: String,
) -> Result<()> {
    let chat_id = message.chat.id;
    let mut timer = CommandTimer::start("qrlink", chat_id.0, &args);

    let result =
        run_quick_link_command(&bot, chat_id, state.vietqr.as_ref(), &state.defaults, &args).await;
    match result {
        Ok(Some(_)) => timer.complete("success", None),
        Ok(None) => timer.complete("missing_credentials", None),
        Err(err) => {
            error!("Error building quick link: {err:#}");
            timer.complete("error", Some(err.to_string().as_str()));
            bot.send_message(chat_id, error_message(&err.to_string()))
                .await?;
        }
    }
    Ok(())
}

pub async fn banks_handler(bot: Bot, state: AppState, message: Message) -> Result<()> {
    let chat_id = message.chat.id;
    let mut timer = CommandTimer::start("banks", chat_id.0, "");
    let result = run_banks_command(&bot, chat_id, state.vietqr.as_ref()).await;
    finish_listing(&mut timer, result)
}

pub async fn templates_handler(bot: Bot, state: AppState, message: Message) -> Result<()> {
    let chat_id = message.chat.id;
    let mut timer = CommandTimer::start("templates", chat_id.0, "");
    let result = run_templates_command(&bot, chat_id, state.vietqr.as_ref()).await;
    finish_listing(&mut timer, result)
}

fn finish_listing(timer: &mut CommandTimer, result: Result<()>) -> Result<()> {
    match &result {
        Ok(()) => timer.complete("success", None),
        Err(err) => timer.complete("error", Some(err.to_string().as_str())),
    }
    result
}
