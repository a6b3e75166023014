//! In-memory [`PubsubService`] for tests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};

use chrono::Utc;
use google_cloud_gax::grpc::{Code, Status};

use crate::{
    error::{ServiceError, ServiceResult},
    model::{
        PubsubMessage, PubsubMessageToPublish, SubscriptionName, SubscriptionSettings, TopicName,
    },
    service::{PubsubService, SubscriptionIter, TopicIter},
};

/// The kinds of call the fake can record and fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListTopics,
    ListSubscriptions,
    CreateTopic,
    DeleteTopic,
    CreateSubscription,
    DeleteSubscription,
    Publish,
    Pull,
    Acknowledge,
}

/// One entry of the call journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListTopics,
    ListSubscriptions,
    CreateTopic(TopicName),
    DeleteTopic(TopicName),
    CreateSubscription {
        subscription: SubscriptionName,
        topic: TopicName,
        settings: SubscriptionSettings,
    },
    DeleteSubscription(SubscriptionName),
    Publish {
        topic: TopicName,
        data: Vec<u8>,
    },
    Pull {
        subscription: SubscriptionName,
        max_messages: usize,
    },
    Acknowledge {
        subscription: SubscriptionName,
        ack_id: String,
    },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::ListTopics => Operation::ListTopics,
            Call::ListSubscriptions => Operation::ListSubscriptions,
            Call::CreateTopic(_) => Operation::CreateTopic,
            Call::DeleteTopic(_) => Operation::DeleteTopic,
            Call::CreateSubscription { .. } => Operation::CreateSubscription,
            Call::DeleteSubscription(_) => Operation::DeleteSubscription,
            Call::Publish { .. } => Operation::Publish,
            Call::Pull { .. } => Operation::Pull,
            Call::Acknowledge { .. } => Operation::Acknowledge,
        }
    }
}

#[derive(Debug)]
struct Subscription {
    name: SubscriptionName,
    topic: TopicName,
    settings: SubscriptionSettings,
    backlog: VecDeque<PubsubMessage>,
}

#[derive(Debug, Default)]
struct State {
    topics: Vec<TopicName>,
    subscriptions: Vec<Subscription>,
    /// Pulled but not yet acknowledged, keyed by ack id.
    outstanding: HashMap<String, SubscriptionName>,
    next_message_id: u64,
    next_ack_id: u64,
    max_pull_batch: Option<usize>,
    failures: HashMap<Operation, usize>,
    calls: Vec<Call>,
}

impl State {
    /// Records the call and fails it if a failure was injected for this invocation.
    fn record(&mut self, call: Call) -> ServiceResult<()> {
        let operation = call.operation();
        let nth = self
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count();
        self.calls.push(call);

        if self.failures.get(&operation) == Some(&nth) {
            self.failures.remove(&operation);
            return Err(Status::new(
                Code::Unavailable,
                format!("injected failure for {operation:?} call #{nth}"),
            )
            .into());
        }
        Ok(())
    }

    fn subscription_mut(&mut self, name: &SubscriptionName) -> ServiceResult<&mut Subscription> {
        self.subscriptions
            .iter_mut()
            .find(|s| &s.name == name)
            .ok_or_else(|| not_found("subscription", &name.0))
    }
}

/// Single-threaded fake that follows the service's resource rules.
#[derive(Debug, Default)]
pub struct InMemoryPubsub {
    state: RefCell<State>,
}

impl InMemoryPubsub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a topic that exists before the run starts.
    pub fn with_topic(self, topic: &str) -> Self {
        self.state.borrow_mut().topics.push(TopicName(topic.to_string()));
        self
    }

    /// Seeds a subscription that exists before the run starts. The topic need not exist.
    pub fn with_subscription(self, subscription: &str, topic: &str) -> Self {
        self.state.borrow_mut().subscriptions.push(Subscription {
            name: SubscriptionName(subscription.to_string()),
            topic: TopicName(topic.to_string()),
            settings: SubscriptionSettings::default(),
            backlog: VecDeque::new(),
        });
        self
    }

    /// Caps how many messages a single pull returns, whatever the caller asks for.
    pub fn with_max_pull_batch(self, max: usize) -> Self {
        self.state.borrow_mut().max_pull_batch = Some(max);
        self
    }

    /// Makes the `nth` (0-based) call of `operation` fail with `UNAVAILABLE`.
    pub fn fail_on(self, operation: Operation, nth: usize) -> Self {
        self.state.borrow_mut().failures.insert(operation, nth);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn topic_names(&self) -> Vec<TopicName> {
        self.state.borrow().topics.clone()
    }

    pub fn subscription_names(&self) -> Vec<SubscriptionName> {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Settings the subscription was created with, if it exists.
    pub fn subscription_settings(&self, subscription: &str) -> Option<SubscriptionSettings> {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .find(|s| s.name.0 == subscription)
            .map(|s| s.settings)
    }

    /// Messages waiting to be pulled from `subscription`.
    pub fn backlog(&self, subscription: &str) -> usize {
        self.state
            .borrow()
            .subscriptions
            .iter()
            .find(|s| s.name.0 == subscription)
            .map_or(0, |s| s.backlog.len())
    }

    /// Messages pulled but not yet acknowledged, across all subscriptions.
    pub fn unacknowledged(&self) -> usize {
        self.state.borrow().outstanding.len()
    }
}

impl PubsubService for InMemoryPubsub {
    fn topics(&self) -> TopicIter<'_> {
        let mut state = self.state.borrow_mut();
        if let Err(err) = state.record(Call::ListTopics) {
            return Box::new(std::iter::once(Err::<TopicName, _>(err)));
        }
        Box::new(state.topics.clone().into_iter().map(Ok::<_, ServiceError>))
    }

    fn subscriptions(&self) -> SubscriptionIter<'_> {
        let mut state = self.state.borrow_mut();
        if let Err(err) = state.record(Call::ListSubscriptions) {
            return Box::new(std::iter::once(Err::<SubscriptionName, _>(err)));
        }
        let names: Vec<_> = state.subscriptions.iter().map(|s| s.name.clone()).collect();
        Box::new(names.into_iter().map(Ok::<_, ServiceError>))
    }

    fn create_topic(&self, topic: &TopicName) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.record(Call::CreateTopic(topic.clone()))?;

        if state.topics.contains(topic) {
            return Err(already_exists("topic", &topic.0));
        }
        state.topics.push(topic.clone());
        Ok(())
    }

    fn delete_topic(&self, topic: &TopicName) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.record(Call::DeleteTopic(topic.clone()))?;

        let before = state.topics.len();
        state.topics.retain(|t| t != topic);
        if state.topics.len() == before {
            return Err(not_found("topic", &topic.0));
        }
        Ok(())
    }

    fn create_subscription(
        &self,
        subscription: &SubscriptionName,
        topic: &TopicName,
        settings: &SubscriptionSettings,
    ) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.record(Call::CreateSubscription {
            subscription: subscription.clone(),
            topic: topic.clone(),
            settings: *settings,
        })?;

        if !state.topics.contains(topic) {
            return Err(not_found("topic", &topic.0));
        }
        if state.subscriptions.iter().any(|s| &s.name == subscription) {
            return Err(already_exists("subscription", &subscription.0));
        }
        state.subscriptions.push(Subscription {
            name: subscription.clone(),
            topic: topic.clone(),
            settings: *settings,
            backlog: VecDeque::new(),
        });
        Ok(())
    }

    fn delete_subscription(&self, subscription: &SubscriptionName) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.record(Call::DeleteSubscription(subscription.clone()))?;

        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| &s.name != subscription);
        if state.subscriptions.len() == before {
            return Err(not_found("subscription", &subscription.0));
        }
        state.outstanding.retain(|_, owner| owner != subscription);
        Ok(())
    }

    fn publish(&self, topic: &TopicName, message: PubsubMessageToPublish) -> ServiceResult<String> {
        let mut state = self.state.borrow_mut();
        state.record(Call::Publish {
            topic: topic.clone(),
            data: message.data.clone(),
        })?;

        if !state.topics.contains(topic) {
            return Err(not_found("topic", &topic.0));
        }

        state.next_message_id += 1;
        let id = state.next_message_id.to_string();
        let publish_time = Some(Utc::now());

        for subscription in state.subscriptions.iter_mut().filter(|s| &s.topic == topic) {
            subscription.backlog.push_back(PubsubMessage {
                id: id.clone(),
                ack_id: String::new(),
                publish_time,
                data: message.data.clone(),
                attributes: message.attributes.clone(),
            });
        }
        Ok(id)
    }

    fn pull(
        &self,
        subscription: &SubscriptionName,
        max_messages: usize,
    ) -> ServiceResult<Vec<PubsubMessage>> {
        let mut state = self.state.borrow_mut();
        state.record(Call::Pull {
            subscription: subscription.clone(),
            max_messages,
        })?;

        let limit = state
            .max_pull_batch
            .map_or(max_messages, |cap| cap.min(max_messages));
        let mut next_ack_id = state.next_ack_id;

        let backlog = &mut state.subscription_mut(subscription)?.backlog;
        let count = limit.min(backlog.len());
        let mut batch: Vec<_> = backlog.drain(..count).collect();

        for message in batch.iter_mut() {
            next_ack_id += 1;
            message.ack_id = format!("ack-{next_ack_id}");
        }
        state.next_ack_id = next_ack_id;
        for message in &batch {
            state
                .outstanding
                .insert(message.ack_id.clone(), subscription.clone());
        }
        Ok(batch)
    }

    fn acknowledge(&self, subscription: &SubscriptionName, ack_id: &str) -> ServiceResult<()> {
        let mut state = self.state.borrow_mut();
        state.record(Call::Acknowledge {
            subscription: subscription.clone(),
            ack_id: ack_id.to_string(),
        })?;

        state.subscription_mut(subscription)?;
        let outstanding = state
            .outstanding
            .get(ack_id)
            .is_some_and(|owner| owner == subscription);
        if !outstanding {
            return Err(Status::new(
                Code::InvalidArgument,
                format!("unknown ack id {ack_id} for {subscription}"),
            )
            .into());
        }
        state.outstanding.remove(ack_id);
        Ok(())
    }
}

fn not_found(kind: &str, name: &str) -> ServiceError {
    Status::new(Code::NotFound, format!("{kind} not found: {name}")).into()
}

fn already_exists(kind: &str, name: &str) -> ServiceError {
    Status::new(Code::AlreadyExists, format!("{kind} already exists: {name}")).into()
}
