//! Prompt building — deterministic text assembly from sanitized inputs.
//!
//! The output format is load-bearing: downstream prompt-quality tuning and
//! cached completions key on these exact bytes, so the line structure and
//! punctuation must not drift. Optional lines are omitted entirely, never
//! left blank.

use super::pipeline::ReplyRequest;

/// Fixed instruction preamble for every completion request.
const PREAMBLE: &str = "You are a helpful writing assistant. Draft a reply to the conversation \
below, matching the requested tone. Respond with the reply text only.";

/// Fallback author label when a message has no usable author.
const UNKNOWN_AUTHOR: &str = "Unknown";

/// Collapse whitespace runs to single spaces and trim the ends.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the upstream prompt from an already-validated request.
///
/// Pure function: same request, same bytes. Sanitization is applied to every
/// caller-supplied field here, regardless of earlier validation.
#[must_use]
pub fn build_prompt(req: &ReplyRequest) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(req.messages.len() + 3);
    lines.push(PREAMBLE.to_string());
    lines.push(format!("Tone: {}.", sanitize(&req.tone)));

    if let Some(length) = req.length.as_deref() {
        let length = sanitize(length);
        if !length.is_empty() {
            lines.push(format!("Preferred length: {length}."));
        }
    }

    lines.push("Chat context (most recent last):".to_string());
    for message in &req.messages {
        let author = message.author.as_deref().map(sanitize).unwrap_or_default();
        let author = if author.is_empty() { UNKNOWN_AUTHOR.to_string() } else { author };
        lines.push(format!("- {author}: {}", sanitize(&message.text)));
    }

    lines.join("\n")
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
