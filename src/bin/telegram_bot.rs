use std::time::Duration;

use campusmitra::telegram::api_client::DEFAULT_BACKEND_URL;
use campusmitra::telegram::rate_limiter::DEFAULT_MAX_REQUESTS;
use campusmitra::telegram::{BotSettings, TelegramBot};
use campusmitra::telemetry::{get_subscriber, init_subscriber};
use clap::Parser;

/// CampusMitra Telegram bot: answers campus questions through the backend.
#[derive(Parser, Debug)]
#[command(name = "telegram-bot", version)]
struct Args {
    /// Bot token from @BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: String,

    #[arg(long, env = "BACKEND_API_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Requests allowed per user in one window
    #[arg(long, env = "MAX_REQUESTS_PER_USER", default_value_t = DEFAULT_MAX_REQUESTS)]
    max_requests_per_user: u32,

    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    rate_window_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let subscriber = get_subscriber(
        "campusmitra-telegram".into(),
        "info,teloxide=warn".into(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    tracing::info!(backend_url = %args.backend_url, "Starting Telegram bot");

    let bot = TelegramBot::new(BotSettings {
        token: args.token,
        backend_url: args.backend_url,
        max_requests_per_user: args.max_requests_per_user,
        rate_window: Duration::from_secs(args.rate_window_secs),
    })?;
    bot.run().await?;

    Ok(())
}
