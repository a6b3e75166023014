use std::{borrow::Cow, io::Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Something worth telling the user about.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event<'a> {
    TopicListed {
        name: &'a str,
    },
    SubscriptionListed {
        name: &'a str,
    },
    TopicCreated {
        name: &'a str,
    },
    SubscriptionCreated {
        name: &'a str,
        topic: &'a str,
        ack_deadline_secs: u64,
    },
    MessagePublished {
        index: usize,
        id: &'a str,
    },
    MessageReceived {
        id: &'a str,
        data: Cow<'a, str>,
        publish_time: Option<DateTime<Utc>>,
    },
    SubscriptionDeleted {
        name: &'a str,
    },
    TopicDeleted {
        name: &'a str,
    },
}

pub struct Reporter<W> {
    format: OutputFormat,
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Section title; only shown in text mode.
    pub fn heading(&mut self, title: &str) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{title}")?;
        }
        Ok(())
    }

    pub fn report(&mut self, event: &Event<'_>) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if let Some(line) = text_line(event) {
                    writeln!(self.out, "{line}")?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, event)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn text_line(event: &Event<'_>) -> Option<String> {
    match event {
        Event::TopicListed { name } | Event::SubscriptionListed { name } => Some(name.to_string()),
        Event::TopicCreated { name } => Some(format!("Created topic: {name}")),
        Event::SubscriptionCreated { name, .. } => Some(format!("Created subscription: {name}")),
        Event::MessagePublished { .. } => None,
        Event::MessageReceived { data, .. } => Some(format!("Got message: {data:?}")),
        Event::SubscriptionDeleted { .. } => Some("Subscription deleted.".to_string()),
        Event::TopicDeleted { .. } => Some("Topic deleted.".to_string()),
    }
}
