use subscriptions_backend::ServiceError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} environment variable must be set.")]
    MissingProjectId(&'static str),
    #[error("Could not create pubsub client: {0}")]
    Connect(#[source] ServiceError),
    #[error("Failed to list topics: {0}")]
    ListTopics(#[source] ServiceError),
    #[error("Failed to list subscriptions: {0}")]
    ListSubscriptions(#[source] ServiceError),
    #[error("Failed to create the topic: {0}")]
    CreateTopic(#[source] ServiceError),
    #[error("Failed to create a new subscription: {0}")]
    CreateSubscription(#[source] ServiceError),
    #[error("Failed to publish message #{index}: {source}")]
    Publish {
        index: usize,
        #[source]
        source: ServiceError,
    },
    #[error("Failed to pull from subscription: {0}")]
    Pull(#[source] ServiceError),
    #[error("Failed to acknowledge message {id}: {source}")]
    Acknowledge {
        id: String,
        #[source]
        source: ServiceError,
    },
    #[error("Failed to delete the subscription: {0}")]
    DeleteSubscription(#[source] ServiceError),
    #[error("Failed to delete the topic: {0}")]
    DeleteTopic(#[source] ServiceError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}
