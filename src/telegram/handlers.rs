//! Command, message and callback handlers for the Telegram bot.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{
    ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, MessageEntityKind, ParseMode, User,
};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use super::api_client::{Asker, BotAnswer};
use super::format::{format_answer, strip_mention};
use super::state::{BotState, SharedState};
use super::suggestions::{button_label, callback_data, parse_callback_data, usable_suggestions};

#[allow(deprecated)]
const MARKDOWN: ParseMode = ParseMode::Markdown;

pub const ERROR_MESSAGE: &str =
    "❌ Sorry, I encountered an error while processing your request. Please try again later.";
pub const MEDIA_NOTICE: &str =
    "📝 Please send me a text message with your question. I can't process images, stickers, or other media yet.";
pub const SUGGESTION_EXPIRED: &str =
    "⏰ This suggestion has expired. Please ask your question directly.";
const SUGGESTIONS_HEADER: &str = "🔍 *Related topics you might want to explore:*";
const CLEARED_MESSAGE: &str =
    "🧹 *Conversation cleared!*\n\nYour chat history has been reset. You can start a fresh conversation now.";

const HELP_TEXT: &str = "🆘 *CampusMitra Help*

*Commands:*
/start - Welcome message
/help - This help
/clear - Start a fresh conversation
/about - About CampusMitra

Type a question in plain English and I'll search the campus documents. Tap a suggested topic to follow up.
In groups, mention me to ask a question.";

const ABOUT_TEXT: &str = "🤖 *About CampusMitra*

An AI campus assistant that answers questions from the documents your campus administration has uploaded.

*Version:* 1.0.0
*Support:* contact your campus IT team.";

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot and see the welcome message")]
    Start,

    #[command(description = "Show help information")]
    Help,

    #[command(description = "Clear conversation history")]
    Clear,

    #[command(description = "About CampusMitra")]
    About,
}

pub fn welcome_text(first_name: &str) -> String {
    let name = if first_name.trim().is_empty() {
        "there"
    } else {
        first_name
    };
    format!(
        "🎓 *Welcome to CampusMitra, {}!*

I answer questions about admissions, courses, fees, hostels and campus services using the documents uploaded by your campus.

Just type your question, for example:
• \"What are the admission requirements?\"
• \"Tell me about hostel facilities\"

Type /help for more commands.",
        name
    )
}

pub fn group_welcome_text(group_name: &str, username: &str) -> String {
    format!(
        "🎓 *Hello {}!*

I'm CampusMitra, your campus assistant. Mention me (@{}) with a question and I'll answer it here.

/help shows what else I can do.",
        group_name, username
    )
}

pub fn rate_limit_text(reset_in_secs: u64) -> String {
    format!(
        "⏱️ You've reached the rate limit. Please wait {} seconds before sending another message.",
        reset_in_secs
    )
}

pub fn unknown_command_text(text: &str) -> String {
    let command = text.split_whitespace().next().unwrap_or(text);
    format!(
        "❓ Unknown command: `{}`\n\nType /help to see available commands, or just ask me a question directly!",
        command
    )
}

/// Group rule: a mention entity, the bot's name in the text, or a reply to a bot.
pub fn is_addressed_to_bot(text: &str, has_mention: bool, replies_to_bot: bool, username: &str) -> bool {
    has_mention
        || replies_to_bot
        || text.contains("@campusmitra")
        || text.contains("CampusMitra")
        || (!username.is_empty() && text.contains(&format!("@{}", username)))
}

fn addressed_in_group(msg: &Message, text: &str, username: &str) -> bool {
    let has_mention = msg
        .entities()
        .map(|entities| {
            entities
                .iter()
                .any(|entity| entity.kind == MessageEntityKind::Mention)
        })
        .unwrap_or(false);
    let replies_to_bot = msg
        .reply_to_message()
        .and_then(|reply| reply.from.as_ref())
        .map(|from| from.is_bot)
        .unwrap_or(false);

    is_addressed_to_bot(text, has_mention, replies_to_bot, username)
}

fn is_group(msg: &Message) -> bool {
    msg.chat.is_group() || msg.chat.is_supergroup()
}

/// Handle a parsed command.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: SharedState,
) -> ResponseResult<()> {
    let user = msg.from.as_ref();
    info!(chat_id = %msg.chat.id, user_id = ?user.map(|u| u.id.0), "Command {:?}", cmd);

    match cmd {
        Command::Start => {
            let first_name = user.map(|u| u.first_name.as_str()).unwrap_or("");
            bot.send_message(msg.chat.id, welcome_text(first_name))
                .parse_mode(MARKDOWN)
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, HELP_TEXT)
                .parse_mode(MARKDOWN)
                .await?;
        }
        Command::Clear => {
            if let Some(user) = user {
                state.clear_conversation(user.id.0).await;
                info!(user_id = user.id.0, "Cleared conversation");
            }
            bot.send_message(msg.chat.id, CLEARED_MESSAGE)
                .parse_mode(MARKDOWN)
                .await?;
        }
        Command::About => {
            bot.send_message(msg.chat.id, ABOUT_TEXT)
                .parse_mode(MARKDOWN)
                .await?;
        }
    }

    Ok(())
}

/// Entry point for every incoming message that is not a membership update.
pub async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let group = is_group(&msg);
    let Some(text) = msg.text().map(str::to_string) else {
        if !group {
            bot.send_message(msg.chat.id, MEDIA_NOTICE).await?;
        }
        return Ok(());
    };
    let Some(user_id) = msg.from.as_ref().map(|u| u.id.0) else {
        return Ok(());
    };

    info!(user_id, chat_id = %msg.chat.id, group, "Message received");

    if group && !addressed_in_group(&msg, &text, &state.username) {
        return Ok(());
    }

    let decision = state.limiter.check(user_id).await;
    if !decision.allowed {
        bot.send_message(msg.chat.id, rate_limit_text(decision.reset_in_secs))
            .await?;
        return Ok(());
    }

    if text.starts_with('/') {
        return match Command::parse(&text, &state.username) {
            Ok(cmd) => handle_command(bot, msg, cmd, state).await,
            Err(_) => {
                info!(cmd = %text, "Unrecognized command");
                bot.send_message(msg.chat.id, unknown_command_text(&text))
                    .parse_mode(MARKDOWN)
                    .await?;
                Ok(())
            }
        };
    }

    let question = strip_mention(&text, &state.username);
    answer_question(&bot, msg.chat.id, user_id, &question, &state).await
}

/// Greets a group when the bot itself is among the new members.
pub async fn handle_new_members(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let me = bot.get_me().await?;
    let added: &[User] = msg.new_chat_members().unwrap_or(&[]);
    if !added.iter().any(|member| member.id == me.id) {
        return Ok(());
    }

    let group_name = msg.chat.title().unwrap_or("this group");
    info!(chat_id = %msg.chat.id, group = group_name, "Bot added to group");
    bot.send_message(msg.chat.id, group_welcome_text(group_name, &state.username))
        .parse_mode(MARKDOWN)
        .await?;
    Ok(())
}

/// Handle a suggestion button press by asking the suggested question.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: SharedState) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        return Ok(());
    };
    let Some((index, timestamp)) = q.data.as_deref().and_then(parse_callback_data) else {
        warn!(data = ?q.data, "Ignoring unknown callback data");
        return Ok(());
    };

    match state.suggestions.take(chat_id.0, index, timestamp).await {
        Some(question) => answer_question(&bot, chat_id, q.from.id.0, &question, &state).await,
        None => {
            bot.send_message(chat_id, SUGGESTION_EXPIRED).await?;
            Ok(())
        }
    }
}

async fn answer_question(
    bot: &Bot,
    chat_id: ChatId,
    user_id: u64,
    question: &str,
    state: &BotState,
) -> ResponseResult<()> {
    bot.send_chat_action(chat_id, ChatAction::Typing).await?;

    let asker = Asker {
        user_id: user_id as i64,
        chat_id: chat_id.0,
    };
    let conversation_id = state.conversation(user_id).await;

    match state.backend.ask(question, conversation_id, asker).await {
        Ok(answer) => {
            if let Some(id) = answer.conversation_id {
                state.remember_conversation(user_id, id).await;
            }
            send_answer(bot, chat_id, &answer, state).await
        }
        Err(e) => {
            error!(user_id, error = %e, "Backend ask failed");
            bot.send_message(chat_id, ERROR_MESSAGE).await?;
            Ok(())
        }
    }
}

async fn send_answer(
    bot: &Bot,
    chat_id: ChatId,
    answer: &BotAnswer,
    state: &BotState,
) -> ResponseResult<()> {
    let text = format_answer(&answer.response);
    if text.is_empty() {
        bot.send_message(chat_id, ERROR_MESSAGE).await?;
        return Ok(());
    }

    // Unbalanced markup from the pipeline makes Telegram reject the message.
    if let Err(e) = bot.send_message(chat_id, &text).parse_mode(MARKDOWN).await {
        warn!(error = %e, "Markdown reply rejected, resending as plain text");
        bot.send_message(chat_id, &text).await?;
    }

    let suggestions = usable_suggestions(&answer.top_source_suggestions);
    if suggestions.is_empty() {
        return Ok(());
    }

    let timestamp = Utc::now().timestamp_millis();
    let rows: Vec<Vec<InlineKeyboardButton>> = suggestions
        .iter()
        .enumerate()
        .map(|(index, suggestion)| {
            vec![InlineKeyboardButton::callback(
                button_label(suggestion),
                callback_data(index, timestamp),
            )]
        })
        .collect();
    state.suggestions.store(chat_id.0, timestamp, suggestions).await;

    if let Err(e) = bot
        .send_message(chat_id, SUGGESTIONS_HEADER)
        .parse_mode(MARKDOWN)
        .reply_markup(InlineKeyboardMarkup::new(rows))
        .await
    {
        error!(error = %e, "Failed to send suggestions");
    }

    Ok(())
}
