use google_cloud_gax::conn::Environment;
use google_cloud_pubsub::{
    client::{Client, ClientConfig},
    subscription::SubscriptionConfig,
};
use tokio::runtime::{Builder, Runtime};

use crate::{
    error::{ServiceError, ServiceResult},
    model::{
        PubsubMessage, PubsubMessageToPublish, SubscriptionName, SubscriptionSettings, TopicName,
    },
    service::{PubsubService, SubscriptionIter, TopicIter},
};

/// [`PubsubService`] backed by Google Cloud Pub/Sub (or its emulator).
pub struct CloudPubsub {
    client: Client,
    // Store and reuse the same runtime (that created the client) for every call,
    // because the gRPC channels are bound to the runtime they were created on:
    // https://github.com/hyperium/tonic/issues/942#issuecomment-1313396286
    rt: Runtime,
}

impl CloudPubsub {
    pub fn connect(project_id: &str) -> ServiceResult<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let client = rt.block_on(create_client(project_id))?;

        Ok(Self { client, rt })
    }
}

async fn create_client(project_id: &str) -> ServiceResult<Client> {
    let mut config = ClientConfig::default()
        .with_auth()
        .await
        .map_err(|err| ServiceError::Auth(err.to_string()))?;

    if let Environment::Emulator(host) = &config.environment {
        log::info!("Using the Pub/Sub emulator at {host}");
    }
    config.project_id = Some(project_id.to_string());

    log::info!("Creating Pub/Sub client for project {project_id}");
    Ok(Client::new(config).await?)
}

impl PubsubService for CloudPubsub {
    fn topics(&self) -> TopicIter<'_> {
        log::debug!("Listing topics");
        match self.rt.block_on(self.client.get_topics(None)) {
            Ok(names) => Box::new(
                names
                    .into_iter()
                    .map(|name| Ok::<_, ServiceError>(TopicName(name))),
            ),
            Err(status) => Box::new(std::iter::once(Err::<TopicName, _>(ServiceError::from(
                status,
            )))),
        }
    }

    fn subscriptions(&self) -> SubscriptionIter<'_> {
        log::debug!("Listing subscriptions");
        match self.rt.block_on(self.client.get_subscriptions(None)) {
            Ok(subscriptions) => Box::new(subscriptions.into_iter().map(|subscription| {
                Ok::<_, ServiceError>(SubscriptionName(
                    subscription.fully_qualified_name().to_string(),
                ))
            })),
            Err(status) => Box::new(std::iter::once(Err::<SubscriptionName, _>(
                ServiceError::from(status),
            ))),
        }
    }

    fn create_topic(&self, topic: &TopicName) -> ServiceResult<()> {
        log::debug!("Creating topic {topic}");
        self.rt
            .block_on(self.client.create_topic(&topic.0, None, None))?;
        Ok(())
    }

    fn delete_topic(&self, topic: &TopicName) -> ServiceResult<()> {
        log::debug!("Deleting topic {topic}");
        self.rt.block_on(self.client.topic(&topic.0).delete(None))?;
        Ok(())
    }

    fn create_subscription(
        &self,
        subscription: &SubscriptionName,
        topic: &TopicName,
        settings: &SubscriptionSettings,
    ) -> ServiceResult<()> {
        log::debug!("Creating subscription {subscription} on {topic}");
        let config = SubscriptionConfig {
            ack_deadline_seconds: i32::try_from(settings.ack_deadline.as_secs())
                .unwrap_or(i32::MAX),
            ..Default::default()
        };

        self.rt.block_on(
            self.client
                .create_subscription(&subscription.0, &topic.0, config, None),
        )?;
        Ok(())
    }

    fn delete_subscription(&self, subscription: &SubscriptionName) -> ServiceResult<()> {
        log::debug!("Deleting subscription {subscription}");
        self.rt
            .block_on(self.client.subscription(&subscription.0).delete(None))?;
        Ok(())
    }

    fn publish(&self, topic: &TopicName, message: PubsubMessageToPublish) -> ServiceResult<String> {
        log::debug!("Publishing {} bytes to {topic}", message.data.len());
        self.rt.block_on(async {
            let mut publisher = self.client.topic(&topic.0).new_publisher(None);
            let awaiter = publisher.publish(message.into()).await;
            let result = awaiter.get().await;
            publisher.shutdown().await;
            Ok(result?)
        })
    }

    fn pull(
        &self,
        subscription: &SubscriptionName,
        max_messages: usize,
    ) -> ServiceResult<Vec<PubsubMessage>> {
        log::debug!("Pulling up to {max_messages} messages from {subscription}");
        let max_messages = i32::try_from(max_messages).unwrap_or(i32::MAX);
        let messages = self.rt.block_on(
            self.client
                .subscription(&subscription.0)
                .pull(max_messages, None),
        )?;

        Ok(messages.into_iter().map(PubsubMessage::from).collect())
    }

    fn acknowledge(&self, subscription: &SubscriptionName, ack_id: &str) -> ServiceResult<()> {
        log::debug!("Acknowledging {ack_id} on {subscription}");
        self.rt.block_on(
            self.client
                .subscription(&subscription.0)
                .ack(vec![ack_id.to_string()]),
        )?;
        Ok(())
    }
}
