use super::types::SessionMetadata;
use crate::core::StoredMessage;

/// Longest preview kept in `first_message`
pub const FIRST_MESSAGE_LIMIT: usize = 200;
/// Longest preview of the opening topic inside a context summary
const TOPIC_PREVIEW_LIMIT: usize = 100;

/// Char-boundary-safe truncation
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// First user-authored turn, truncated for list previews
pub fn first_user_message(messages: &[StoredMessage]) -> String {
    messages
        .iter()
        .find(|m| m.is_user())
        .map(|m| truncate_chars(&m.content, FIRST_MESSAGE_LIMIT))
        .unwrap_or_default()
}

/// Natural-language recap replayed to the agent on resume
pub fn build_context_summary(metadata: &SessionMetadata, messages: &[StoredMessage]) -> String {
    let user_count = messages.iter().filter(|m| m.is_user()).count();
    let assistant_count = messages.iter().filter(|m| m.is_assistant()).count();

    let mut lines = vec![
        format!("Resumed session \"{}\".", metadata.name),
        format!("Created: {}", metadata.created_at.to_rfc3339()),
        format!("Last activity: {}", metadata.last_activity_at.to_rfc3339()),
        format!(
            "Messages: {} total ({} from user, {} from assistant)",
            messages.len(),
            user_count,
            assistant_count
        ),
    ];

    if let Some(description) = &metadata.description {
        lines.push(format!("Description: {}", description));
    }

    if !metadata.first_message.is_empty() {
        let topic = truncate_chars(&metadata.first_message, TOPIC_PREVIEW_LIMIT);
        let ellipsis = if metadata.first_message.chars().count() > TOPIC_PREVIEW_LIMIT {
            "..."
        } else {
            ""
        };
        lines.push(format!("First topic: \"{}{}\"", topic, ellipsis));
    }

    lines.join("\n")
}
