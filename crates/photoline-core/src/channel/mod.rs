pub mod line;

use async_trait::async_trait;

use crate::compose::ReplyMessage;
use crate::error::ChannelError;

/// Outbound surface of the messaging platform.
///
/// One reply API call per reply token; content fetch for media messages.
/// Trait object so the router and tests can swap in the real LINE client or
/// a mock.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Send one reply authorized by `reply_token`.
    async fn reply(&self, reply_token: &str, message: &ReplyMessage) -> Result<(), ChannelError>;

    /// Fetch the binary content of a media message from the platform.
    async fn get_content(&self, message_id: &str) -> Result<Vec<u8>, ChannelError>;
}
