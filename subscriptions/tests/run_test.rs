//! End-to-end runs of the demo against the in-memory service.

use subscriptions::{
    actions::{publish_messages, pull_messages},
    output::{OutputFormat, Reporter},
    run, Error, RunSettings,
};
use subscriptions_backend::{
    memory::{Call, Operation},
    model::{SubscriptionName, TopicName},
    InMemoryPubsub,
};

fn run_demo(service: &InMemoryPubsub, settings: &RunSettings) -> (Result<(), Error>, String) {
    let mut reporter = Reporter::new(OutputFormat::Text, Vec::new());
    let result = run(service, settings, &mut reporter);
    let out = String::from_utf8(reporter.into_inner()).expect("utf8 output");
    (result, out)
}

fn topic() -> TopicName {
    TopicName("example-topic".to_string())
}

fn subscription() -> SubscriptionName {
    SubscriptionName("example-subscription".to_string())
}

#[test]
fn test_full_run_succeeds_and_cleans_up() {
    let service = InMemoryPubsub::new()
        .with_topic("existing-topic")
        .with_subscription("first", "existing-topic")
        .with_subscription("second", "existing-topic");

    let (result, out) = run_demo(&service, &RunSettings::default());

    result.expect("run should succeed");
    let mut expected = vec![
        "Listing all subscriptions from the project:".to_string(),
        "first".to_string(),
        "second".to_string(),
        "Created topic: example-topic".to_string(),
        "Created subscription: example-subscription".to_string(),
    ];
    expected.extend((0..10).map(|i| format!("Got message: \"hello world #{i}\"")));
    expected.push("Subscription deleted.".to_string());
    expected.push("Topic deleted.".to_string());
    assert_eq!(out.lines().collect::<Vec<_>>(), expected);

    assert_eq!(service.topic_names(), vec![TopicName("existing-topic".to_string())]);
    assert_eq!(
        service.subscription_names(),
        vec![
            SubscriptionName("first".to_string()),
            SubscriptionName("second".to_string())
        ]
    );
    assert_eq!(service.unacknowledged(), 0);
}

#[test]
fn test_steps_run_in_order() {
    let service = InMemoryPubsub::new();

    let (result, _) = run_demo(&service, &RunSettings::default());
    result.expect("run should succeed");

    let calls = service.calls();
    assert_eq!(calls[0], Call::ListSubscriptions);
    assert_eq!(calls[1], Call::CreateTopic(topic()));
    assert!(matches!(
        &calls[2],
        Call::CreateSubscription { subscription: s, topic: t, settings }
            if s == &subscription() && t == &topic() && settings.ack_deadline.as_secs() == 10
    ));

    let published: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Publish { data, .. } => Some(data.clone()),
            _ => None,
        })
        .collect();
    let expected: Vec<Vec<u8>> = (0..10)
        .map(|i| format!("hello world #{i}").into_bytes())
        .collect();
    assert_eq!(published, expected);

    let n = calls.len();
    assert_eq!(calls[n - 2], Call::DeleteSubscription(subscription()));
    assert_eq!(calls[n - 1], Call::DeleteTopic(topic()));
}

#[test]
fn test_every_message_acked_once_before_next_pull() {
    let service = InMemoryPubsub::new().with_max_pull_batch(3);

    let (result, _) = run_demo(&service, &RunSettings::default());
    result.expect("run should succeed");

    let consume: Vec<_> = service
        .calls()
        .into_iter()
        .filter(|c| matches!(c.operation(), Operation::Pull | Operation::Acknowledge))
        .collect();

    // Batches of 3, 3, 3 and 1: each pull is followed by one ack per message it returned.
    let shape: Vec<_> = consume
        .iter()
        .map(|c| match c {
            Call::Pull { max_messages, .. } => format!("pull({max_messages})"),
            _ => "ack".to_string(),
        })
        .collect();
    let mut expected = Vec::new();
    for asked in [10, 7, 4, 1] {
        expected.push(format!("pull({asked})"));
        expected.extend(std::iter::repeat("ack".to_string()).take(asked.min(3)));
    }
    assert_eq!(shape, expected);

    let mut ack_ids: Vec<_> = consume
        .iter()
        .filter_map(|c| match c {
            Call::Acknowledge { ack_id, .. } => Some(ack_id.clone()),
            _ => None,
        })
        .collect();
    ack_ids.sort();
    ack_ids.dedup();
    assert_eq!(ack_ids.len(), 10);
}

#[test]
fn test_pull_stops_early_when_fewer_messages_are_available() {
    let service = InMemoryPubsub::new()
        .with_topic("example-topic")
        .with_subscription("example-subscription", "example-topic");
    publish_messages(&service, &topic(), 4).expect("publish");

    let mut seen = Vec::new();
    let handled = pull_messages(&service, &subscription(), 10, |message| {
        seen.push(message.data_lossy().into_owned());
        Ok(())
    })
    .expect("pull should end without error");

    assert_eq!(handled, 4);
    assert_eq!(
        seen,
        vec!["hello world #0", "hello world #1", "hello world #2", "hello world #3"]
    );
    let pulls: Vec<_> = service
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Pull { max_messages, .. } => Some(max_messages),
            _ => None,
        })
        .collect();
    assert_eq!(pulls, vec![10, 6]);
    assert_eq!(service.unacknowledged(), 0);
}

#[test]
fn test_publish_failure_reports_index_and_cleans_up() {
    let service = InMemoryPubsub::new().fail_on(Operation::Publish, 3);

    let (result, out) = run_demo(&service, &RunSettings::default());

    let err = result.expect_err("publish #3 should fail");
    assert!(matches!(err, Error::Publish { index: 3, .. }));
    assert!(err.to_string().starts_with("Failed to publish message #3"));

    let publishes = service
        .calls()
        .iter()
        .filter(|c| c.operation() == Operation::Publish)
        .count();
    assert_eq!(publishes, 4);
    assert!(!out.contains("Got message"));

    // Both resources are removed by the guards, subscription first.
    let calls = service.calls();
    let n = calls.len();
    assert_eq!(calls[n - 2], Call::DeleteSubscription(subscription()));
    assert_eq!(calls[n - 1], Call::DeleteTopic(topic()));
    assert!(service.topic_names().is_empty());
    assert!(service.subscription_names().is_empty());
}

#[test]
fn test_pull_failure_still_deletes_subscription() {
    let service = InMemoryPubsub::new().fail_on(Operation::Pull, 0);

    let (result, _) = run_demo(&service, &RunSettings::default());

    assert!(matches!(result, Err(Error::Pull(_))));
    assert!(service.subscription_names().is_empty());
    assert!(service.topic_names().is_empty());
}

#[test]
fn test_list_failure_stops_before_creating_anything() {
    let service = InMemoryPubsub::new().fail_on(Operation::ListSubscriptions, 0);

    let (result, out) = run_demo(&service, &RunSettings::default());

    let err = result.expect_err("listing should fail");
    assert!(err.to_string().starts_with("Failed to list subscriptions"));
    assert_eq!(service.calls(), vec![Call::ListSubscriptions]);
    assert_eq!(out, "Listing all subscriptions from the project:\n");
}

#[test]
fn test_existing_topic_is_left_alone() {
    let service = InMemoryPubsub::new().with_topic("example-topic");

    let (result, _) = run_demo(&service, &RunSettings::default());

    assert!(matches!(result, Err(Error::CreateTopic(_))));
    assert_eq!(service.topic_names(), vec![topic()]);
    assert!(!service
        .calls()
        .iter()
        .any(|c| c.operation() == Operation::DeleteTopic));
}

#[test]
fn test_subscription_delete_failure_is_fatal_but_topic_is_still_removed() {
    let service = InMemoryPubsub::new().fail_on(Operation::DeleteSubscription, 0);

    let (result, out) = run_demo(&service, &RunSettings::default());

    assert!(matches!(result, Err(Error::DeleteSubscription(_))));
    assert!(!out.contains("Subscription deleted."));
    assert!(service.topic_names().is_empty());
}

#[test]
fn test_list_topics_and_json_output() {
    let service = InMemoryPubsub::new().with_topic("existing-topic");
    let settings = RunSettings {
        list_topics: true,
        message_count: 2,
        ..RunSettings::default()
    };

    let mut reporter = Reporter::new(OutputFormat::Json, Vec::new());
    run(&service, &settings, &mut reporter).expect("run should succeed");
    let out = String::from_utf8(reporter.into_inner()).expect("utf8 output");

    let events: Vec<serde_json::Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    let kinds: Vec<_> = events
        .iter()
        .map(|e| e["event"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "topic_listed",
            "topic_created",
            "subscription_created",
            "message_published",
            "message_published",
            "message_received",
            "message_received",
            "subscription_deleted",
            "topic_deleted",
        ]
    );
    assert_eq!(events[0]["name"], "existing-topic");
    assert_eq!(events[2]["ack_deadline_secs"], 10);
    assert_eq!(events[5]["data"], "hello world #0");
}
