use std::error::Error;

use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

use vietqr_telegram_bot::config;
use vietqr_telegram_bot::handlers::commands;
use vietqr_telegram_bot::state::AppState;
use vietqr_telegram_bot::utils::logging::init_logging;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    Start,
    Help,
    Banks,
    Templates,
    Qr(String),
    Qrlink(String),
}

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> HandlerResult {
    dotenv().ok();
    let config = config::init()?;
    let _guards = init_logging(&config.log_level, &config.logs_dir);

    let bot = Bot::new(config.bot_token.clone());
    let state = AppState::new(config);
    info!(
        api_url = %config.api_url,
        tmp_dir = %config.tmp_dir.display(),
        cleanup_s = config.cleanup_delay.as_secs(),
        "VietQR Telegram Bot is running..."
    );

    let command_handler = dptree::entry()
        .filter_command::<Command>()
        .endpoint(handle_command);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(commands::is_unknown_command))
                .endpoint(handle_unknown_command),
        )
        .endpoint(ignore_message);

    Dispatcher::builder(bot, message_handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(
    bot: Bot,
    state: AppState,
    message: Message,
    command: Command,
) -> HandlerResult {
    match command {
        Command::Start => commands::start_handler(bot, message).await?,
        Command::Help => commands::help_handler(bot, message).await?,
        Command::Banks => {
            tokio::spawn(async move {
                if let Err(err) = commands::banks_handler(bot, state, message).await {
                    error!("banks handler failed: {err}");
                }
            });
        }
        Command::Templates => {
            tokio::spawn(async move {
                if let Err(err) = commands::templates_handler(bot, state, message).await {
                    error!("templates handler failed: {err}");
                }
            });
        }
        Command::Qr(args) => {
            tokio::spawn(async move {
                if let Err(err) = commands::qr_handler(bot, state, message, args).await {
                    error!("qr handler failed: {err}");
                }
            });
        }
        Command::Qrlink(args) => {
            tokio::spawn(async move {
                if let Err(err) = commands::qrlink_handler(bot, state, message, args).await {
                    error!("qrlink handler failed: {err}");
                }
            });
        }
    }
    Ok(())
}

async fn handle_unknown_command(bot: Bot, message: Message) -> HandlerResult {
    commands::unknown_command_handler(bot, message).await?;
    Ok(())
}

async fn ignore_message(_message: Message) -> HandlerResult {
    Ok(())
}
