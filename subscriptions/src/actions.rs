use std::collections::VecDeque;

use subscriptions_backend::{
    model::{
        PubsubMessage, PubsubMessageToPublish, SubscriptionName, SubscriptionSettings, TopicName,
    },
    PubsubService, ServiceResult,
};

use crate::{
    cleanup::Provisioned,
    error::{Error, Result},
};

pub fn list_topics<S: PubsubService + ?Sized>(service: &S) -> Result<Vec<TopicName>> {
    service
        .topics()
        .collect::<ServiceResult<_>>()
        .map_err(Error::ListTopics)
}

/// Every subscription in the project, in the order the service reports them.
pub fn list_subscriptions<S: PubsubService + ?Sized>(
    service: &S,
) -> Result<Vec<SubscriptionName>> {
    service
        .subscriptions()
        .collect::<ServiceResult<_>>()
        .map_err(Error::ListSubscriptions)
}

pub fn create_topic<'a, S: PubsubService + ?Sized>(
    service: &'a S,
    topic: &TopicName,
) -> Result<Provisioned<'a, S, TopicName>> {
    service.create_topic(topic).map_err(Error::CreateTopic)?;
    Ok(Provisioned::new(service, topic.clone()))
}

pub fn create_subscription<'a, S: PubsubService + ?Sized>(
    service: &'a S,
    subscription: &SubscriptionName,
    topic: &TopicName,
    settings: &SubscriptionSettings,
) -> Result<Provisioned<'a, S, SubscriptionName>> {
    service
        .create_subscription(subscription, topic, settings)
        .map_err(Error::CreateSubscription)?;
    Ok(Provisioned::new(service, subscription.clone()))
}

pub fn message_payload(index: usize) -> String {
    format!("hello world #{index}")
}

/// Publishes `count` numbered messages in order, stopping at the first failure.
///
/// Returns the ids the service assigned, in publish order.
pub fn publish_messages<S: PubsubService + ?Sized>(
    service: &S,
    topic: &TopicName,
    count: usize,
) -> Result<Vec<String>> {
    (0..count)
        .map(|index| {
            service
                .publish(topic, PubsubMessageToPublish::new(message_payload(index)))
                .map_err(|source| Error::Publish { index, source })
        })
        .collect()
}

/// Lazy, finite sequence of messages pulled from one subscription.
///
/// A pull request is only issued once every message of the previous batch has
/// been handed out, and asks for no more than the remaining quota. The sequence
/// ends after `limit` messages or as soon as the service returns an empty batch.
pub struct Pull<'a, S: PubsubService + ?Sized> {
    service: &'a S,
    subscription: &'a SubscriptionName,
    remaining: usize,
    buffered: VecDeque<PubsubMessage>,
    exhausted: bool,
}

impl<'a, S: PubsubService + ?Sized> Pull<'a, S> {
    pub fn new(service: &'a S, subscription: &'a SubscriptionName, limit: usize) -> Self {
        Self {
            service,
            subscription,
            remaining: limit,
            buffered: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<S: PubsubService + ?Sized> Iterator for Pull<'_, S> {
    type Item = ServiceResult<PubsubMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted || self.remaining == 0 {
            return None;
        }

        if self.buffered.is_empty() {
            match self.service.pull(self.subscription, self.remaining) {
                Ok(batch) if batch.is_empty() => {
                    self.exhausted = true;
                    return None;
                }
                Ok(batch) => self.buffered.extend(batch),
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }

        let message = self.buffered.pop_front()?;
        self.remaining -= 1;
        Some(Ok(message))
    }
}

/// Pulls up to `limit` messages, handing each to `handle` and then acknowledging
/// it before moving on. Returns how many messages were handled.
pub fn pull_messages<S, F>(
    service: &S,
    subscription: &SubscriptionName,
    limit: usize,
    mut handle: F,
) -> Result<usize>
where
    S: PubsubService + ?Sized,
    F: FnMut(&PubsubMessage) -> Result<()>,
{
    let mut handled = 0;
    for message in Pull::new(service, subscription, limit) {
        let message = message.map_err(Error::Pull)?;
        handle(&message)?;
        service
            .acknowledge(subscription, &message.ack_id)
            .map_err(|source| Error::Acknowledge {
                id: message.id.clone(),
                source,
            })?;
        handled += 1;
    }
    Ok(handled)
}
