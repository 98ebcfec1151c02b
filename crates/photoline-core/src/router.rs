//! Per-event dispatch: (event kind, message sub-kind) selects a handler,
//! handlers mutate the photo store and compose replies.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::MessagingApi;
use crate::compose::{self, OutboundReply, ReplyMessage};
use crate::error::{BotError, RelayError, StoreError};
use crate::event::{Event, MessageKind};
use crate::relay::BlobRelay;
use crate::store::PhotoStore;

/// Routes validated webhook events to behavior.
///
/// Dependencies are injected at construction and live for the process.
/// `api` is only used here to fetch media content; sending the accumulated
/// replies is the HTTP layer's job.
pub struct EventRouter {
    store: PhotoStore,
    relay: BlobRelay,
    api: Arc<dyn MessagingApi>,
}

impl EventRouter {
    pub fn new(store: PhotoStore, relay: BlobRelay, api: Arc<dyn MessagingApi>) -> Self {
        Self { store, relay, api }
    }

    /// Process a batch of events and accumulate replies in event order.
    ///
    /// Events are independent: a handler failure is logged and skipped,
    /// never aborts the rest of the batch.
    pub async fn route(&self, events: Vec<Event>) -> Vec<OutboundReply> {
        let mut replies = Vec::new();
        for event in events {
            match self.handle_event(event).await {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => {}
                Err(e) => warn!("Event handler failed: {}", e),
            }
        }
        replies
    }

    async fn handle_event(&self, event: Event) -> Result<Option<OutboundReply>, BotError> {
        match event {
            Event::Follow {
                reply_token,
                user_id,
            } => {
                match self.store.create_user(&user_id) {
                    Ok(_) => info!("User {} followed", user_id),
                    // Not idempotent by design: the store rejects the write,
                    // but a repeat follower still gets the welcome.
                    Err(StoreError::DuplicateUser(_)) => {
                        warn!("Duplicate follow for {}", user_id);
                    }
                    Err(e) => return Err(e.into()),
                }
                Ok(Some(OutboundReply::new(reply_token, compose::welcome())))
            }

            Event::Unfollow { user_id } => {
                match self.store.delete_user(&user_id) {
                    Ok(()) => info!("User {} unfollowed, photos deleted", user_id),
                    // Tolerate duplicate or out-of-order unfollows.
                    Err(StoreError::UserNotFound(_)) => {
                        debug!("Unfollow for unknown user {}", user_id);
                    }
                    Err(e) => return Err(e.into()),
                }
                // The platform accepts no reply for unfollow.
                Ok(None)
            }

            Event::Message {
                reply_token,
                user_id,
                timestamp_ms,
                kind,
            } => {
                let message = self.handle_message(&user_id, timestamp_ms, kind).await?;
                Ok(message.map(|m| OutboundReply::new(reply_token, m)))
            }

            Event::Unknown { kind } => {
                debug!("Ignoring event kind: {}", kind);
                Ok(None)
            }
        }
    }

    async fn handle_message(
        &self,
        user_id: &str,
        timestamp_ms: i64,
        kind: MessageKind,
    ) -> Result<Option<ReplyMessage>, BotError> {
        match kind {
            MessageKind::Sticker { keywords } => {
                Ok(Some(compose::sticker_reply(keywords.as_deref())))
            }

            MessageKind::Audio => Ok(Some(compose::audio_reply(timestamp_ms))),

            MessageKind::Image { message_id } => {
                self.handle_image_upload(user_id, &message_id).await
            }

            MessageKind::Text { text } => self.handle_text(user_id, timestamp_ms, &text),

            MessageKind::Other { kind } => {
                debug!("Ignoring message sub-kind: {}", kind);
                Ok(None)
            }
        }
    }

    /// Image upload: fetch from the platform, relay to the object store,
    /// append to the owner's collection.
    async fn handle_image_upload(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<Option<ReplyMessage>, BotError> {
        // Owner must exist before anything is fetched or uploaded; upload
        // before follow gets an instructive reply, not a dangling photo.
        if self.store.find_user(user_id)?.is_none() {
            warn!("Image upload from unregistered user {}", user_id);
            return Ok(Some(compose::not_registered()));
        }

        // A failed fetch is a relay failure like a failed upload: this
        // event aborts, no photo row, no success reply.
        let bytes = self
            .api
            .get_content(message_id)
            .await
            .map_err(|e| RelayError::Fetch(e.to_string()))?;
        let url = self.relay.store(bytes, message_id).await?;

        match self.store.add_photo(user_id, &url) {
            Ok(photo) => {
                info!("Photo {} stored for {}", photo.id, user_id);
                Ok(Some(compose::upload_ack()))
            }
            // User unfollowed between the lookup and the insert.
            Err(StoreError::OwnerNotFound(_)) => Ok(Some(compose::not_registered())),
            Err(e) => Err(e.into()),
        }
    }

    /// Text dispatch: "回傳" fetches the latest photo, "時間" echoes the
    /// event time, anything else echoes verbatim.
    fn handle_text(
        &self,
        user_id: &str,
        timestamp_ms: i64,
        text: &str,
    ) -> Result<Option<ReplyMessage>, BotError> {
        match text {
            "回傳" => match self.store.latest_photo_for(user_id)? {
                Some(photo) => Ok(Some(compose::latest_photo(&photo.url))),
                None => Ok(Some(compose::no_photo_yet())),
            },
            "時間" => Ok(Some(compose::current_time_reply(timestamp_ms))),
            _ => Ok(Some(compose::echo(text))),
        }
    }
}
