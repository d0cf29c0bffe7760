//! Pick the best textual representation out of a Gmail message and
//! turn it into plain text.
//!
//! To get the body of an email:
//! - The message either has `payload.body.data` or one or more nested
//!   `parts[].body.data`.
//! - Parts may carry an HTML version alongside a plain text version.
//!   Plain text always wins when present.
//! - Parts with a filename or `attachmentId` are attachments, not bodies.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use scraper::{ElementRef, Html, Node, Selector};

use super::gmail::{Message, MessagePart};
use crate::core::error::DecodeError;

/// Returned when a message has no body data anywhere.
pub const NO_BODY_CONTENT: &str = "No body content available.";

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// Elements that start a new line in the extracted text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "noscript", "template"];

/// Decode base64 text. Gmail uses the URL-safe alphabet but Pub/Sub
/// push data uses the standard one, so both are accepted, padded or not.
pub fn decode_base64(data: &str) -> Result<String, DecodeError> {
    let bytes = match URL_SAFE_LENIENT.decode(data) {
        Ok(bytes) => bytes,
        Err(url_safe_err) => STANDARD_LENIENT.decode(data).map_err(|_| url_safe_err)?,
    };
    Ok(String::from_utf8(bytes)?)
}

/// Extract the body of a message as plain text.
///
/// Returns [`NO_BODY_CONTENT`] when nothing is found. Undecodable data
/// is an error rather than an empty body.
pub fn extract_body(message: &Message) -> Result<String, DecodeError> {
    let Some(payload) = &message.payload else {
        tracing::warn!("Message {} has no payload", message.id);
        return Ok(NO_BODY_CONTENT.to_string());
    };

    let located = match payload.data() {
        Some(data) => Some((payload.mimetype.as_str(), data)),
        None => find_part(&payload.parts, "text/plain")
            .or_else(|| find_part(&payload.parts, "text/html"))
            .and_then(|part| part.data().map(|data| (part.mimetype.as_str(), data))),
    };

    let Some((mimetype, data)) = located else {
        tracing::warn!("Body was empty for message with ID: {}", message.id);
        return Ok(NO_BODY_CONTENT.to_string());
    };

    let decoded = decode_base64(data).inspect_err(|e| {
        tracing::error!("Body decode failed for message {}: {}", message.id, e)
    })?;

    if mimetype.eq_ignore_ascii_case("text/html") {
        return Ok(html_to_text(&decoded));
    }

    Ok(decoded.trim().to_string())
}

/// Depth-first search for the first non-attachment part of `mimetype`.
fn find_part<'a>(parts: &'a [MessagePart], mimetype: &str) -> Option<&'a MessagePart> {
    for part in parts {
        if part.mimetype.eq_ignore_ascii_case(mimetype) && !is_attachment(part) {
            return Some(part);
        }
        if let Some(found) = find_part(&part.parts, mimetype) {
            return Some(found);
        }
    }
    None
}

fn is_attachment(part: &MessagePart) -> bool {
    let has_filename = part.filename.as_deref().is_some_and(|name| !name.is_empty());
    let has_attachment_id = part
        .body
        .as_ref()
        .is_some_and(|body| body.attachment_id.is_some());
    has_filename || has_attachment_id
}

/// Visible text of the document's `<body>`, one line per block element.
/// Falls back to the raw input if there is no body element.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("body").ok();
    let body = selector
        .as_ref()
        .and_then(|selector| document.select(selector).next());

    let Some(body) = body else {
        return html.trim().to_string();
    };

    let mut text = String::new();
    collect_text(body, &mut text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_collapsed(out, text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let breaks = BLOCK_TAGS.contains(&name);
                if breaks {
                    out.push('\n');
                }
                collect_text(child, out);
                if breaks {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

// Runs of source whitespace render as a single space
fn push_collapsed(out: &mut String, text: &str) {
    for c in text.chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') && !out.ends_with('\n') && !out.is_empty() {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use crate::google::gmail::MessagePartBody;

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::URL_SAFE.encode(text)
    }

    fn part(mimetype: &str, data: Option<&str>, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            part_id: None,
            mimetype: mimetype.to_string(),
            filename: None,
            headers: None,
            body: Some(MessagePartBody {
                attachment_id: None,
                size: data.map_or(0, |d| d.len() as u64),
                data: data.map(encode),
            }),
            parts,
        }
    }

    fn message(payload: MessagePart) -> Message {
        Message {
            id: "test".to_string(),
            thread_id: Some("thread".to_string()),
            snippet: None,
            payload: Some(payload),
            label_ids: None,
        }
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("SGVsbG8=").unwrap(), "Hello");
        // Unpadded
        assert_eq!(decode_base64("SGVsbG8").unwrap(), "Hello");
        // URL-safe and standard alphabets
        assert_eq!(decode_base64("Pz8_").unwrap(), "???");
        assert_eq!(decode_base64("Pz8/").unwrap(), "???");

        assert!(matches!(decode_base64("!!not base64!!"), Err(DecodeError::Base64(_))));
        // 0xff 0xfe is not UTF-8
        assert!(matches!(decode_base64("__4="), Err(DecodeError::Utf8(_))));
    }

    #[test]
    fn test_extract_top_level_body() {
        let msg = message(part("text/plain", Some("  Hello World\n"), vec![]));
        assert_eq!(extract_body(&msg).unwrap(), "Hello World");
    }

    #[test]
    fn test_extract_top_level_html_body() {
        let msg = message(part(
            "text/html",
            Some("<html><body><p>Hi</p><p>there</p></body></html>"),
            vec![],
        ));
        assert_eq!(extract_body(&msg).unwrap(), "Hi\nthere");
    }

    #[test]
    fn test_prefers_plain_text_over_html() {
        let msg = message(part(
            "multipart/alternative",
            None,
            vec![
                part("text/html", Some("<p>HTML version</p>"), vec![]),
                part("text/plain", Some("Plain version"), vec![]),
            ],
        ));
        assert_eq!(extract_body(&msg).unwrap(), "Plain version");
    }

    #[test]
    fn test_finds_nested_plain_text() {
        let msg = message(part(
            "multipart/mixed",
            None,
            vec![
                part(
                    "multipart/alternative",
                    None,
                    vec![
                        part("text/plain", Some("First"), vec![]),
                        part("text/html", Some("<p>First</p>"), vec![]),
                    ],
                ),
                part("text/plain", Some("Second"), vec![]),
            ],
        ));
        assert_eq!(extract_body(&msg).unwrap(), "First");
    }

    #[test]
    fn test_falls_back_to_html_part() {
        let msg = message(part(
            "multipart/alternative",
            None,
            vec![part(
                "text/html",
                Some("<html><body><div><h1>Title</h1><p>Some <b>bold</b> text</p></div></body></html>"),
                vec![],
            )],
        ));
        assert_eq!(extract_body(&msg).unwrap(), "Title\nSome bold text");
    }

    #[test]
    fn test_skips_attachments() {
        let mut attachment = part("text/plain", Some("attached notes"), vec![]);
        attachment.filename = Some(String::from("notes.txt"));
        let msg = message(part(
            "multipart/mixed",
            None,
            vec![attachment, part("text/html", Some("<p>Body</p>"), vec![])],
        ));
        assert_eq!(extract_body(&msg).unwrap(), "Body");
    }

    #[test]
    fn test_no_body_content() {
        // No data on the payload or any part
        let msg = message(part(
            "multipart/alternative",
            None,
            vec![part("text/plain", None, vec![]), part("text/html", None, vec![])],
        ));
        assert_eq!(extract_body(&msg).unwrap(), NO_BODY_CONTENT);

        // A plain part without data wins over an html part with data
        let msg = message(part(
            "multipart/alternative",
            None,
            vec![
                part("text/plain", None, vec![]),
                part("text/html", Some("<p>ignored</p>"), vec![]),
            ],
        ));
        assert_eq!(extract_body(&msg).unwrap(), NO_BODY_CONTENT);

        // No parts at all
        let msg = message(part("multipart/mixed", None, vec![]));
        assert_eq!(extract_body(&msg).unwrap(), NO_BODY_CONTENT);

        // No payload
        let mut msg = message(part("text/plain", None, vec![]));
        msg.payload = None;
        assert_eq!(extract_body(&msg).unwrap(), NO_BODY_CONTENT);
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let mut payload = part("text/plain", None, vec![]);
        payload.body = Some(MessagePartBody {
            attachment_id: None,
            size: 4,
            data: Some(String::from("%%%%")),
        });
        assert!(extract_body(&message(payload)).is_err());
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"
            <html>
              <head><title>Ignored</title><style>p { color: red; }</style></head>
              <body>
                <div>
                  <p>First   paragraph
                     continues</p>
                  <ul><li>One</li><li>Two</li></ul>
                  <script>alert("x")</script>
                  Line<br>break
                </div>
              </body>
            </html>
        "#;
        assert_eq!(
            html_to_text(html),
            "First paragraph continues\nOne\nTwo\nLine\nbreak"
        );
    }

    #[test]
    fn test_html_to_text_without_markup() {
        assert_eq!(html_to_text("  just text  "), "just text");
    }
}
