use serde::Deserialize;

// ====== LINE Webhook Wire Types ======

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reply_token: Option<String>,
    pub source: Option<EventSource>,
    pub message: Option<WebhookMessage>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMessage {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub text: Option<String>,
    pub keywords: Option<Vec<String>>,
}

// ====== Domain Events ======

/// One webhook event, decoded into a closed sum type.
///
/// Envelopes the router has no behavior for, or that are missing a field
/// their kind requires (reply token, source user id), degrade to `Unknown`
/// instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Follow {
        reply_token: String,
        user_id: String,
    },
    Unfollow {
        user_id: String,
    },
    Message {
        reply_token: String,
        user_id: String,
        timestamp_ms: i64,
        kind: MessageKind,
    },
    Unknown {
        kind: String,
    },
}

/// Message sub-kind for `Event::Message`.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    Text { text: String },
    Image { message_id: String },
    Sticker { keywords: Option<Vec<String>> },
    Audio,
    Other { kind: String },
}

/// Parse the raw webhook body into domain events, in payload order.
pub fn parse_webhook(body: &str) -> Result<Vec<Event>, serde_json::Error> {
    let payload: WebhookPayload = serde_json::from_str(body)?;
    Ok(payload.events.iter().map(Event::from_wire).collect())
}

impl Event {
    fn from_wire(wire: &WebhookEvent) -> Self {
        let user_id = wire
            .source
            .as_ref()
            .and_then(|s| s.user_id.as_deref())
            .map(str::to_string);

        match wire.event_type.as_str() {
            "follow" => match (wire.reply_token.clone(), user_id) {
                (Some(reply_token), Some(user_id)) => Event::Follow {
                    reply_token,
                    user_id,
                },
                _ => Event::Unknown {
                    kind: "follow".to_string(),
                },
            },
            "unfollow" => match user_id {
                Some(user_id) => Event::Unfollow { user_id },
                None => Event::Unknown {
                    kind: "unfollow".to_string(),
                },
            },
            "message" => {
                let (Some(reply_token), Some(user_id), Some(message)) =
                    (wire.reply_token.clone(), user_id, wire.message.as_ref())
                else {
                    return Event::Unknown {
                        kind: "message".to_string(),
                    };
                };
                Event::Message {
                    reply_token,
                    user_id,
                    timestamp_ms: wire.timestamp.unwrap_or_default(),
                    kind: MessageKind::from_wire(message),
                }
            }
            other => Event::Unknown {
                kind: other.to_string(),
            },
        }
    }
}

impl MessageKind {
    fn from_wire(message: &WebhookMessage) -> Self {
        match message.msg_type.as_str() {
            "text" => MessageKind::Text {
                text: message.text.clone().unwrap_or_default(),
            },
            "image" => match message.id.clone() {
                Some(message_id) => MessageKind::Image { message_id },
                None => MessageKind::Other {
                    kind: "image".to_string(),
                },
            },
            "sticker" => MessageKind::Sticker {
                keywords: message.keywords.clone(),
            },
            "audio" => MessageKind::Audio,
            other => MessageKind::Other {
                kind: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_message() {
        let body = r#"{
            "events": [{
                "type": "message",
                "replyToken": "token123",
                "source": {
                    "type": "user",
                    "userId": "U1234567890"
                },
                "message": {
                    "id": "msg001",
                    "type": "text",
                    "text": "Hello!"
                },
                "timestamp": 1625000000000
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::Message {
                reply_token: "token123".to_string(),
                user_id: "U1234567890".to_string(),
                timestamp_ms: 1625000000000,
                kind: MessageKind::Text {
                    text: "Hello!".to_string()
                },
            }
        );
    }

    #[test]
    fn test_parse_follow_event() {
        let body = r#"{
            "events": [{
                "type": "follow",
                "replyToken": "r1",
                "source": {
                    "type": "user",
                    "userId": "U9999"
                },
                "timestamp": 1625000001000
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert_eq!(
            events[0],
            Event::Follow {
                reply_token: "r1".to_string(),
                user_id: "U9999".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_unfollow_event() {
        let body = r#"{
            "events": [{
                "type": "unfollow",
                "source": {
                    "type": "user",
                    "userId": "U9999"
                },
                "timestamp": 1625000001000
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert_eq!(
            events[0],
            Event::Unfollow {
                user_id: "U9999".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_sticker_with_keywords() {
        let body = r#"{
            "events": [{
                "type": "message",
                "replyToken": "r2",
                "source": {"type": "user", "userId": "U1"},
                "message": {
                    "id": "m1",
                    "type": "sticker",
                    "keywords": ["Smile", "Hello", "Cat"]
                },
                "timestamp": 1
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        let Event::Message { kind, .. } = &events[0] else {
            panic!("expected message event");
        };
        assert_eq!(
            *kind,
            MessageKind::Sticker {
                keywords: Some(vec![
                    "Smile".to_string(),
                    "Hello".to_string(),
                    "Cat".to_string()
                ])
            }
        );
    }

    #[test]
    fn test_parse_image_message() {
        let body = r#"{
            "events": [{
                "type": "message",
                "replyToken": "r3",
                "source": {"type": "user", "userId": "U1"},
                "message": {"id": "m42", "type": "image"},
                "timestamp": 1
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        let Event::Message { kind, .. } = &events[0] else {
            panic!("expected message event");
        };
        assert_eq!(
            *kind,
            MessageKind::Image {
                message_id: "m42".to_string()
            }
        );
    }

    #[test]
    fn test_unrecognized_kind_fails_closed() {
        let body = r#"{
            "events": [{
                "type": "beacon",
                "replyToken": "r4",
                "source": {"type": "user", "userId": "U1"},
                "timestamp": 1
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert_eq!(
            events[0],
            Event::Unknown {
                kind: "beacon".to_string()
            }
        );
    }

    #[test]
    fn test_message_missing_reply_token_fails_closed() {
        let body = r#"{
            "events": [{
                "type": "message",
                "source": {"type": "user", "userId": "U1"},
                "message": {"id": "m1", "type": "text", "text": "hi"},
                "timestamp": 1
            }]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert_eq!(
            events[0],
            Event::Unknown {
                kind: "message".to_string()
            }
        );
    }

    #[test]
    fn test_parse_empty_payload() {
        let events = parse_webhook(r#"{"events": []}"#).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_parse_preserves_order() {
        let body = r#"{
            "events": [
                {"type": "follow", "replyToken": "a", "source": {"type": "user", "userId": "U1"}, "timestamp": 1},
                {"type": "unfollow", "source": {"type": "user", "userId": "U1"}, "timestamp": 2}
            ]
        }"#;

        let events = parse_webhook(body).unwrap();
        assert!(matches!(events[0], Event::Follow { .. }));
        assert!(matches!(events[1], Event::Unfollow { .. }));
    }
}
