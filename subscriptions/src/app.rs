use std::io::Write;

use subscriptions_backend::PubsubService;

use crate::{
    actions::{
        create_subscription, create_topic, list_subscriptions, list_topics, publish_messages,
        pull_messages,
    },
    config::RunSettings,
    error::{Error, Result},
    output::{Event, Reporter},
};

/// Runs the whole demo against `service`, stopping at the first failing step.
///
/// The topic and subscription are deleted on every exit path: explicitly on
/// success, best-effort when an earlier step fails.
pub fn run<S, W>(service: &S, settings: &RunSettings, reporter: &mut Reporter<W>) -> Result<()>
where
    S: PubsubService + ?Sized,
    W: Write,
{
    if settings.list_topics {
        reporter.heading("Listing all topics from the project:")?;
        for topic in list_topics(service)? {
            reporter.report(&Event::TopicListed { name: &topic.0 })?;
        }
    }

    reporter.heading("Listing all subscriptions from the project:")?;
    for subscription in list_subscriptions(service)? {
        reporter.report(&Event::SubscriptionListed {
            name: &subscription.0,
        })?;
    }

    let topic = create_topic(service, &settings.topic)?;
    reporter.report(&Event::TopicCreated {
        name: &topic.name().0,
    })?;

    let subscription = create_subscription(
        service,
        &settings.subscription,
        topic.name(),
        &settings.subscription_settings,
    )?;
    reporter.report(&Event::SubscriptionCreated {
        name: &subscription.name().0,
        topic: &topic.name().0,
        ack_deadline_secs: settings.subscription_settings.ack_deadline.as_secs(),
    })?;

    let ids = publish_messages(service, topic.name(), settings.message_count)?;
    for (index, id) in ids.iter().enumerate() {
        reporter.report(&Event::MessagePublished { index, id })?;
    }

    let received = pull_messages(
        service,
        subscription.name(),
        settings.message_count,
        |message| {
            reporter.report(&Event::MessageReceived {
                id: &message.id,
                data: message.data_lossy(),
                publish_time: message.publish_time,
            })
        },
    )?;
    log::info!(
        "Received {received} of {} published messages",
        settings.message_count
    );

    let subscription_name = subscription.name().clone();
    subscription.release().map_err(Error::DeleteSubscription)?;
    reporter.report(&Event::SubscriptionDeleted {
        name: &subscription_name.0,
    })?;

    let topic_name = topic.name().clone();
    topic.release().map_err(Error::DeleteTopic)?;
    reporter.report(&Event::TopicDeleted {
        name: &topic_name.0,
    })?;

    Ok(())
}
