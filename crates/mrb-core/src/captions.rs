//! Text shown on review posts and published suggestions.

use crate::{config::PublishStyle, submission::Submission};

const ELLIPSIS: char = '…';

/// `Suggestion from {name}:\n\n{body}`, with `no_caption_marker` standing in
/// for a missing media caption.
pub fn review_caption(submission: &Submission, no_caption_marker: &str) -> String {
    let body = submission.payload.body().unwrap_or(no_caption_marker);
    format!(
        "Suggestion from {}:\n\n{body}",
        submission.submitter.display_name
    )
}

/// Caption for the copy published to the channel.
pub fn publish_caption(submission: &Submission, style: PublishStyle) -> String {
    let name = &submission.submitter.display_name;
    match (style, submission.payload.body()) {
        (PublishStyle::SuggestedBy, Some(body)) => format!("Suggested by {name}\n\n{body}"),
        (PublishStyle::SuggestedBy, None) => format!("Suggested by {name}"),
        (PublishStyle::Attribution, Some(body)) => format!("{name}:\n\n{body}"),
        (PublishStyle::Attribution, None) => name.to_string(),
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}
