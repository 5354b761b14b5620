//! Sanitized message rendering.
//!
//! Message text is treated as CommonMark (with the GitHub table,
//! strikethrough and task-list extensions) and converted to HTML. Raw HTML in
//! the source is never passed through: it is re-emitted as escaped text, and
//! link and image targets with a script-capable scheme are replaced. Everything
//! else is produced by the HTML writer, which escapes text and attributes.

use banter_core::{Message, Sender, UserProfile};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

/// Sender label used for model messages.
pub const BOT_LABEL: &str = "AI Bot";

/// Bubble text shown while a reply is pending.
pub const TYPING_INDICATOR: &str = "Typing...";

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];
const BLOCKED_URL: &str = "#";

/// Converts message text into HTML that is safe to insert into a page as-is.
#[derive(Debug, Clone, Copy)]
pub struct SanitizedRenderer {
    options: Options,
}

impl SanitizedRenderer {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }

    /// Renders `text`. Pure: the same input always gives the same output.
    pub fn render(&self, text: &str) -> String {
        let events = Parser::new_ext(text, self.options).map(neutralize);
        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }

    pub fn render_message(&self, message: &Message) -> String {
        self.render(message.text())
    }
}

impl Default for SanitizedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn neutralize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed(BLOCKED_URL)
    }
}

/// Relative URLs and a short allow-list of schemes pass; everything else
/// (`javascript:`, `vbscript:`, `data:`, ...) is blocked.
fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.find(':') {
        None => true,
        Some(colon) => {
            let scheme = &normalized[..colon];
            if scheme.contains(['/', '?', '#']) {
                return true;
            }
            SAFE_SCHEMES.contains(&scheme)
        }
    }
}

/// Which side of the chat a row sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSide {
    User,
    Bot,
}

impl RowSide {
    pub fn css_class(self) -> &'static str {
        match self {
            RowSide::User => "user",
            RowSide::Bot => "bot",
        }
    }
}

impl From<Sender> for RowSide {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => RowSide::User,
            Sender::Bot => RowSide::Bot,
        }
    }
}

/// A display-ready message: label, side and sanitized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub sender_label: String,
    pub side: RowSide,
    /// Sanitized HTML body.
    pub html: String,
}

impl MessageRow {
    pub fn from_message(
        message: &Message,
        profile: &UserProfile,
        renderer: &SanitizedRenderer,
    ) -> Self {
        let sender_label = match message.sender() {
            Sender::User => profile.display_name().to_string(),
            Sender::Bot => BOT_LABEL.to_string(),
        };
        Self {
            sender_label,
            side: message.sender().into(),
            html: renderer.render_message(message),
        }
    }

    /// Placeholder row shown while a reply is pending.
    pub fn typing() -> Self {
        Self {
            sender_label: BOT_LABEL.to_string(),
            side: RowSide::Bot,
            html: TYPING_INDICATOR.to_string(),
        }
    }

    /// Full row markup, matching the chat page structure.
    pub fn to_html(&self) -> String {
        let side = self.side.css_class();
        format!(
            "<div class=\"chat-message-row {side}\">\
             <div class=\"message-content\">\
             <div class=\"message-sender\">{label}</div>\
             <div class=\"message-bubble {side}-bubble\">{body}</div>\
             </div></div>",
            label = escape_text(&self.sender_label),
            body = self.html,
        )
    }
}

/// Builds the rows for a conversation, with the typing indicator last while
/// a send is pending.
pub fn render_rows(
    messages: &[Message],
    profile: &UserProfile,
    renderer: &SanitizedRenderer,
    pending: bool,
) -> Vec<MessageRow> {
    let mut rows: Vec<MessageRow> = messages
        .iter()
        .map(|message| MessageRow::from_message(message, profile, renderer))
        .collect();
    if pending {
        rows.push(MessageRow::typing());
    }
    rows
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    html::push_html(&mut escaped, std::iter::once(Event::Text(CowStr::Borrowed(text))));
    escaped
}
