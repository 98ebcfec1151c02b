use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, error};

use crate::channel::MessagingApi;
use crate::compose::ReplyMessage;
use crate::error::ChannelError;
use crate::util::http::client;

const LINE_REPLY_API: &str = "https://api.line.me/v2/bot/message/reply";
const LINE_CONTENT_API: &str = "https://api-data.line.me/v2/bot/message";

/// LINE Messaging API client.
pub struct LineApi {
    access_token: String,
}

impl LineApi {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl MessagingApi for LineApi {
    /// Reply to a LINE event using its reply token.
    /// Must be called within 1 minute of receiving the webhook.
    async fn reply(&self, reply_token: &str, message: &ReplyMessage) -> Result<(), ChannelError> {
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [message.to_json()],
        });

        let resp = client()
            .post(LINE_REPLY_API)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!("LINE reply API error: {} {}", status, text);
            return Err(ChannelError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        debug!("LINE reply sent");
        Ok(())
    }

    /// Download a media message's bytes from the content API.
    ///
    /// The stream is finite and not restartable; chunks are drained into a
    /// buffer that is dropped on any exit path.
    async fn get_content(&self, message_id: &str) -> Result<Vec<u8>, ChannelError> {
        let url = format!("{LINE_CONTENT_API}/{message_id}/content");
        let resp = client()
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            error!("LINE content API error: {} {}", status, text);
            return Err(ChannelError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let mut buf = Vec::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }

        debug!("Fetched {} bytes for message {}", buf.len(), message_id);
        Ok(buf)
    }
}
