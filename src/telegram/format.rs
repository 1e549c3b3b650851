//! Turns pipeline answers into legacy Telegram Markdown.

use std::sync::OnceLock;

use regex::Regex;

/// Scaffolding the pipeline sometimes leaves in its answers.
const TEMPLATE_MARKERS: [&str; 6] = [
    "### YOUR RESPONSE ###",
    "### SUGGESTED QUESTIONS ###",
    "[Title: SUGGESTED QUESTIONS:]",
    "[Provide your response here, following the formatting guidelines above]",
    "(Source: PDF CONTENT, Page: -)",
    "###",
];

fn bold() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"))
}

fn italic() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| Regex::new(r"__(.*?)__").expect("valid italic pattern"))
}

pub fn strip_template_markers(text: &str) -> String {
    TEMPLATE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}

/// `**bold**` becomes `*bold*` and `__italic__` becomes `_italic_`.
pub fn to_telegram_markdown(text: &str) -> String {
    let text = bold().replace_all(text, "*$1*");
    italic().replace_all(&text, "_$1_").into_owned()
}

pub fn format_answer(text: &str) -> String {
    to_telegram_markdown(&strip_template_markers(text))
}

/// Drops the bot mention from a group message so only the question reaches the backend.
pub fn strip_mention(text: &str, username: &str) -> String {
    if username.is_empty() {
        return text.trim().to_string();
    }
    text.replace(&format!("@{}", username), "").trim().to_string()
}
