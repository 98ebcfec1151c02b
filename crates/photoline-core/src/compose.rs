//! Reply composition: pure functions mapping (event, domain state) to
//! outbound message content. Nothing here touches the network or the store.

use chrono::{DateTime, Local};

pub const WELCOME_TEXT: &str = "Welcome! Send me a photo and I will keep it safe for you.";
pub const NO_COMMENT_TEXT: &str = "我無言";
pub const QUIET_HOURS_TEXT: &str = "夜深了，請小聲一點喔~~";
pub const COMPLIMENT_TEXT: &str = "哇! 真是美妙的聲音呢";
pub const UPLOAD_ACK_TEXT: &str = "Thank you for the upload, your photo has been saved.";
pub const NOT_REGISTERED_TEXT: &str = "找不到你的資料，請先加入好友後再上傳圖片。";
pub const NO_PHOTO_TEXT: &str =
    "請先上傳圖片，謝謝。備註：如果之前有解除追蹤，照片會全數刪除，請重新上傳。";

/// Content of one outbound LINE message.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyMessage {
    Text(String),
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

impl ReplyMessage {
    /// LINE reply API message object.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ReplyMessage::Text(text) => serde_json::json!({
                "type": "text",
                "text": text,
            }),
            ReplyMessage::Image {
                original_content_url,
                preview_image_url,
            } => serde_json::json!({
                "type": "image",
                "originalContentUrl": original_content_url,
                "previewImageUrl": preview_image_url,
            }),
        }
    }
}

/// One reply, paired with the token that authorizes it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundReply {
    pub reply_token: String,
    pub message: ReplyMessage,
}

impl OutboundReply {
    pub fn new(reply_token: impl Into<String>, message: ReplyMessage) -> Self {
        Self {
            reply_token: reply_token.into(),
            message,
        }
    }
}

pub fn welcome() -> ReplyMessage {
    ReplyMessage::Text(WELCOME_TEXT.to_string())
}

/// Sticker reply: a numbered enumeration when the sticker carries exactly
/// three keywords, the fixed "no comment" text otherwise.
pub fn sticker_reply(keywords: Option<&[String]>) -> ReplyMessage {
    match keywords {
        Some([a, b, c]) => ReplyMessage::Text(format!("1. {a} 2. {b} 3. {c}")),
        _ => ReplyMessage::Text(NO_COMMENT_TEXT.to_string()),
    }
}

/// Audio reply, gated on the local hour of the event.
///
/// The hour is formatted as a two-digit string and compared lexicographically
/// against "21". Zero-padded two-digit hours make this equivalent to a
/// numeric comparison for hours 21-23; the string form is kept on purpose.
pub fn audio_reply(timestamp_ms: i64) -> ReplyMessage {
    let hour = local_time(timestamp_ms).format("%H").to_string();
    if hour.as_str() >= "21" {
        ReplyMessage::Text(QUIET_HOURS_TEXT.to_string())
    } else {
        ReplyMessage::Text(COMPLIMENT_TEXT.to_string())
    }
}

/// "時間" command reply: the event time in local `YYYY-MM-DD HH:MM:SS`.
pub fn current_time_reply(timestamp_ms: i64) -> ReplyMessage {
    let formatted = local_time(timestamp_ms).format("%Y-%m-%d %H:%M:%S");
    ReplyMessage::Text(format!("現在時間為 : {formatted}"))
}

pub fn upload_ack() -> ReplyMessage {
    ReplyMessage::Text(UPLOAD_ACK_TEXT.to_string())
}

pub fn not_registered() -> ReplyMessage {
    ReplyMessage::Text(NOT_REGISTERED_TEXT.to_string())
}

pub fn no_photo_yet() -> ReplyMessage {
    ReplyMessage::Text(NO_PHOTO_TEXT.to_string())
}

/// "回傳" command reply: the stored photo, clickable and preview both
/// pointing at the same URL.
pub fn latest_photo(url: &str) -> ReplyMessage {
    ReplyMessage::Image {
        original_content_url: url.to_string(),
        preview_image_url: url.to_string(),
    }
}

pub fn echo(text: &str) -> ReplyMessage {
    ReplyMessage::Text(text.to_string())
}

/// Event timestamps are milliseconds since epoch; wall-clock fields are
/// derived from whole seconds.
fn local_time(timestamp_ms: i64) -> DateTime<Local> {
    let secs = timestamp_ms / 1000;
    DateTime::from_timestamp(secs, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&Local)
}
