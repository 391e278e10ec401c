use super::*;
use crate::services::pipeline::ChatMessage;

fn message(author: Option<&str>, text: &str) -> ChatMessage {
    ChatMessage { author: author.map(ToOwned::to_owned), text: text.to_owned() }
}

fn request(messages: Vec<ChatMessage>, tone: &str, length: Option<&str>) -> ReplyRequest {
    ReplyRequest { messages, tone: tone.to_owned(), length: length.map(ToOwned::to_owned) }
}

#[test]
fn sanitize_collapses_whitespace_runs() {
    assert_eq!(sanitize("  hello \t\n  world  "), "hello world");
    assert_eq!(sanitize("one"), "one");
    assert_eq!(sanitize("   \t \n "), "");
}

#[test]
fn prompt_format_with_length() {
    let req = request(
        vec![message(Some("Ada"), "Can you make it?"), message(Some("Sam"), "Not sure yet")],
        "friendly",
        Some("short"),
    );

    let expected = "You are a helpful writing assistant. Draft a reply to the conversation \
below, matching the requested tone. Respond with the reply text only.\n\
Tone: friendly.\n\
Preferred length: short.\n\
Chat context (most recent last):\n\
- Ada: Can you make it?\n\
- Sam: Not sure yet";
    assert_eq!(build_prompt(&req), expected);
}

#[test]
fn prompt_omits_length_line_when_absent() {
    let req = request(vec![message(Some("Ada"), "hi")], "formal", None);
    let prompt = build_prompt(&req);
    assert!(!prompt.contains("Preferred length"));
    assert!(!prompt.contains("\n\n"), "omitted lines must not leave blanks");
    assert!(prompt.contains("Tone: formal.\nChat context (most recent last):"));
}

#[test]
fn prompt_omits_length_line_when_blank() {
    let req = request(vec![message(Some("Ada"), "hi")], "formal", Some("   "));
    assert!(!build_prompt(&req).contains("Preferred length"));
}

#[test]
fn prompt_labels_missing_author_as_unknown() {
    let req = request(vec![message(None, "hello"), message(Some("  "), "there")], "casual", None);
    let prompt = build_prompt(&req);
    assert!(prompt.contains("- Unknown: hello"));
    assert!(prompt.contains("- Unknown: there"));
}

#[test]
fn prompt_sanitizes_every_field() {
    let req = request(vec![message(Some(" A  da "), " multi \n line  text ")], "  very   calm ", Some(" two\nlines "));
    let prompt = build_prompt(&req);
    assert!(prompt.contains("Tone: very calm.\n"));
    assert!(prompt.contains("Preferred length: two lines.\n"));
    assert!(prompt.contains("- A da: multi line text"));
}
