use chrono::{DateTime, TimeZone, Utc};
use google_cloud_pubsub::subscriber::ReceivedMessage;
use std::{borrow::Cow, collections::HashMap};

/// A message delivered to a subscription by a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubMessage {
    pub id: String,
    /// Handle used to acknowledge this particular delivery.
    pub ack_id: String,
    pub publish_time: Option<DateTime<Utc>>,
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl PubsubMessage {
    /// Payload as text, with invalid UTF-8 replaced.
    pub fn data_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl From<ReceivedMessage> for PubsubMessage {
    fn from(value: ReceivedMessage) -> Self {
        let ack_id = value.ack_id().to_string();

        let publish_time = value
            .message
            .publish_time
            .map(|t| Utc.timestamp_opt(t.seconds, t.nanos.try_into().unwrap_or(0)))
            .and_then(|lr| match lr {
                chrono::LocalResult::Single(dt) => Some(dt),
                _ => None,
            });

        Self {
            id: value.message.message_id,
            ack_id,
            publish_time,
            data: value.message.data,
            attributes: value.message.attributes,
        }
    }
}
