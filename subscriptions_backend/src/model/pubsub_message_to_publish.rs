use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubsubMessageToPublish {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl PubsubMessageToPublish {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            attributes: HashMap::new(),
        }
    }
}

impl From<PubsubMessageToPublish> for google_cloud_googleapis::pubsub::v1::PubsubMessage {
    fn from(val: PubsubMessageToPublish) -> Self {
        Self {
            data: val.data,
            attributes: val.attributes,
            ..Default::default()
        }
    }
}
