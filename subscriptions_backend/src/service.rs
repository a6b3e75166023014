use crate::{
    error::ServiceResult,
    model::{
        PubsubMessage, PubsubMessageToPublish, SubscriptionName, SubscriptionSettings, TopicName,
    },
};

/// Lazily produced names; `None` marks the end of the listing.
pub type TopicIter<'a> = Box<dyn Iterator<Item = ServiceResult<TopicName>> + 'a>;
pub type SubscriptionIter<'a> = Box<dyn Iterator<Item = ServiceResult<SubscriptionName>> + 'a>;

/// The operations the demo needs from a Pub/Sub service.
///
/// Every call blocks the calling thread until the service has answered.
pub trait PubsubService {
    fn topics(&self) -> TopicIter<'_>;

    fn subscriptions(&self) -> SubscriptionIter<'_>;

    fn create_topic(&self, topic: &TopicName) -> ServiceResult<()>;

    /// Deleting a topic leaves the subscriptions bound to it in place.
    fn delete_topic(&self, topic: &TopicName) -> ServiceResult<()>;

    /// The topic must already exist.
    fn create_subscription(
        &self,
        subscription: &SubscriptionName,
        topic: &TopicName,
        settings: &SubscriptionSettings,
    ) -> ServiceResult<()>;

    fn delete_subscription(&self, subscription: &SubscriptionName) -> ServiceResult<()>;

    /// Returns the id the service assigned to the message.
    fn publish(&self, topic: &TopicName, message: PubsubMessageToPublish) -> ServiceResult<String>;

    /// Fetches at most `max_messages`. An empty batch means nothing is available right now.
    fn pull(
        &self,
        subscription: &SubscriptionName,
        max_messages: usize,
    ) -> ServiceResult<Vec<PubsubMessage>>;

    fn acknowledge(&self, subscription: &SubscriptionName, ack_id: &str) -> ServiceResult<()>;
}
