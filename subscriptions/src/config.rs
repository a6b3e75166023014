use std::time::Duration;

use clap::Parser;
use subscriptions_backend::model::{SubscriptionName, SubscriptionSettings, TopicName};

use crate::{
    error::{Error, Result},
    output::OutputFormat,
};

pub const PROJECT_ENV_VAR: &str = "GOOGLE_CLOUD_PROJECT";

/// Creates a Pub/Sub topic and subscription, sends a few messages through them, then cleans up.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Project that owns the topic and subscription.
    #[arg(long, env = PROJECT_ENV_VAR)]
    pub project: Option<String>,

    #[arg(long, default_value = "example-topic")]
    pub topic: String,

    #[arg(long, default_value = "example-subscription")]
    pub subscription: String,

    /// Seconds the service waits for an ack before redelivering.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(10..=600))]
    pub ack_deadline_secs: u64,

    /// How many messages to publish, and at most how many to pull back.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub messages: u64,

    /// Also print the topics in the project before the subscriptions.
    #[arg(long)]
    pub list_topics: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// What a single run creates and how much traffic it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub topic: TopicName,
    pub subscription: SubscriptionName,
    pub subscription_settings: SubscriptionSettings,
    pub message_count: usize,
    pub list_topics: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            topic: TopicName("example-topic".to_string()),
            subscription: SubscriptionName("example-subscription".to_string()),
            subscription_settings: SubscriptionSettings::default(),
            message_count: 10,
            list_topics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_id: String,
    pub run: RunSettings,
    pub output: OutputFormat,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let project_id = args
            .project
            .map(|project| project.trim().to_string())
            .filter(|project| !project.is_empty())
            .ok_or(Error::MissingProjectId(PROJECT_ENV_VAR))?;

        Ok(Self {
            project_id,
            run: RunSettings {
                topic: TopicName(args.topic),
                subscription: SubscriptionName(args.subscription),
                subscription_settings: SubscriptionSettings {
                    ack_deadline: Duration::from_secs(args.ack_deadline_secs),
                },
                message_count: usize::try_from(args.messages).unwrap_or(usize::MAX),
                list_topics: args.list_topics,
            },
            output: args.output,
        })
    }
}
