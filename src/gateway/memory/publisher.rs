use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// MemoryPublisher keeps published events; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryPublisher {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_events(&self) -> Vec<DomainEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        debug!("keeping event {} {}", event.name, event.event_id);
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{DomainEvent, DomainEventType};
    use crate::gateway::events::EventPublisher;
    use crate::gateway::memory::publisher::MemoryPublisher;

    #[tokio::test]
    async fn test_should_publish_to_memory() {
        let publisher = MemoryPublisher::new();
        let shared = publisher.clone();
        let event = DomainEvent::borrowed("book_borrowed", "loans", "key", &HashMap::new(), &"data").expect("build event");
        let _ = publisher.publish(&event).await.expect("should publish");

        let events = shared.get_events().await;
        assert_eq!(1, events.len());
        assert_eq!(DomainEventType::Borrowed, events[0].kind);
        assert_eq!(event.event_id, events[0].event_id);
    }
}
