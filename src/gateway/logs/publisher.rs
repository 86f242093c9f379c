use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// LogPublisher forwards each event as a json line on the tracing subscriber.
#[derive(Debug)]
pub struct LogPublisher {
    topic: String,
}

impl LogPublisher {
    pub(crate) fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
        }
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let json = serde_json::to_string(event)?;
        info!(topic = self.topic.as_str(), event = json.as_str(), "published {:?} {}", event.kind, event.name);
        Ok(())
    }
}
