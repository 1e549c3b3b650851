//! Long-polling dispatcher for the CampusMitra Telegram bot.

use std::sync::Arc;
use std::time::Duration;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::api_client::BackendClient;
use super::error::{Result, TelegramError};
use super::handlers::{handle_callback, handle_message, handle_new_members, Command};
use super::rate_limiter::RateLimiter;
use super::state::{BotState, SharedState};

/// How often stale rate-limit windows and suggestion batches are dropped.
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub token: String,
    pub backend_url: String,
    pub max_requests_per_user: u32,
    pub rate_window: Duration,
}

pub struct TelegramBot {
    bot: Bot,
    settings: BotSettings,
}

impl TelegramBot {
    pub fn new(settings: BotSettings) -> Result<Self> {
        if settings.token.trim().is_empty() {
            return Err(TelegramError::BotStartFailed(
                "TELEGRAM_BOT_TOKEN is required".to_string(),
            ));
        }

        Ok(Self {
            bot: Bot::new(settings.token.clone()),
            settings,
        })
    }

    /// Register commands, then poll until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        let username = me.username().to_string();
        info!(username = %username, "Bot started");

        self.bot
            .set_my_commands(Command::bot_commands())
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;

        let backend = BackendClient::new(&self.settings.backend_url)?;
        match backend.health().await {
            Ok(health) => info!(status = %health.status, "Backend reachable"),
            Err(e) => warn!(error = %e, "Backend health check failed, continuing"),
        }

        let limiter = RateLimiter::new(self.settings.max_requests_per_user, self.settings.rate_window);
        let state: SharedState = Arc::new(BotState::new(backend, limiter, username));

        let housekeeping_state = Arc::clone(&state);
        tokio::spawn(async move {
            housekeeping_loop(housekeeping_state).await;
        });

        let state_for_callbacks = Arc::clone(&state);
        let state_for_members = Arc::clone(&state);
        let state_for_messages = Arc::clone(&state);

        let handler = dptree::entry()
            .branch(
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let state = Arc::clone(&state_for_callbacks);
                    async move { handle_callback(bot, q, state).await }
                }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.new_chat_members().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let state = Arc::clone(&state_for_members);
                        async move { handle_new_members(bot, msg, state).await }
                    }),
            )
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                    let state = Arc::clone(&state_for_messages);
                    async move { handle_message(bot, msg, state).await }
                }),
            );

        info!("Bot is running and ready to receive messages");

        Dispatcher::builder(self.bot, handler)
            .default_handler(|upd| async move {
                debug!("Unhandled update: {:?}", upd.kind);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Bot stopped");
        Ok(())
    }
}

async fn housekeeping_loop(state: SharedState) {
    let mut tick = interval(HOUSEKEEPING_INTERVAL);
    loop {
        tick.tick().await;
        let windows = state.limiter.cleanup().await;
        let batches = state.suggestions.purge_expired().await;
        let conversations = state.active_conversations().await;
        debug!(windows, batches, conversations, "Housekeeping pass");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn housekeeping_can_be_spawned() {
        let backend = BackendClient::new("http://127.0.0.1:1").unwrap();
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let state: SharedState = Arc::new(BotState::new(backend, limiter, "campus_bot".to_string()));

        let pass = housekeeping_loop(state);
        assert_send(&pass);
    }

    #[test]
    fn empty_token_is_rejected() {
        let settings = BotSettings {
            token: "  ".to_string(),
            backend_url: "http://localhost:3001".to_string(),
            max_requests_per_user: 5,
            rate_window: Duration::from_secs(60),
        };
        assert!(matches!(
            TelegramBot::new(settings),
            Err(TelegramError::BotStartFailed(_))
        ));
    }
}
