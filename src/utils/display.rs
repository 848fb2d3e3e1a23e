use crate::session::{SessionMetadata, StoredSession};
use crate::session::summary::truncate_chars;
use colored::*;

const PREVIEW_WIDTH: usize = 40;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.len()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

/// One line per session: id, name, last activity, message count, preview
pub fn format_session_row(meta: &SessionMetadata) -> String {
    let preview = meta.first_message.replace('\n', " ");
    let mut short = truncate_chars(&preview, PREVIEW_WIDTH);
    if preview.chars().count() > PREVIEW_WIDTH {
        short.push_str("...");
    }
    format!(
        "{:<32} {:<20} {:<20} {:>5}  {}",
        meta.id,
        truncate_chars(&meta.name, 20),
        meta.last_activity_at.format("%Y-%m-%d %H:%M:%S"),
        meta.message_count,
        short
    )
}

pub fn print_session_table(sessions: &[SessionMetadata]) {
    if sessions.is_empty() {
        print_info("No saved sessions");
        return;
    }

    println!(
        "{}",
        format!(
            "{:<32} {:<20} {:<20} {:>5}  {}",
            "ID", "NAME", "LAST ACTIVITY", "MSGS", "FIRST MESSAGE"
        )
        .bold()
    );
    for meta in sessions {
        println!("{}", format_session_row(meta));
    }
}

pub fn print_session(session: &StoredSession) {
    let meta = &session.metadata;
    print_header(&format!("Session {}", meta.id));
    println!("{} {}", "Name:".bold(), meta.name);
    if let Some(description) = &meta.description {
        println!("{} {}", "Description:".bold(), description);
    }
    println!("{} {} / {}", "Provider:".bold(), meta.provider, meta.model);
    println!("{} {}", "Created:".bold(), meta.created_at.to_rfc3339());
    println!("{} {}", "Last activity:".bold(), meta.last_activity_at.to_rfc3339());
    println!();

    for message in &session.messages {
        let role = match message.role.as_str() {
            "user" => message.role.yellow().bold(),
            "assistant" => message.role.green().bold(),
            _ => message.role.dimmed(),
        };
        println!("{}: {}", role, message.content);
    }
}
