use std::cmp;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

// MemoryStore keeps entities keyed by id in insertion order and applies the optimistic
// version check on update that a real table would enforce with a condition expression.
#[derive(Debug)]
pub(crate) struct MemoryStore<T> {
    table_name: String,
    inner: RwLock<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    order: Vec<String>,
    items: HashMap<String, T>,
}

impl<T: Identifiable + Clone> MemoryStore<T> {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            inner: RwLock::new(Inner { order: vec![], items: HashMap::new() }),
        }
    }

    pub(crate) async fn create(&self, entity: &T) -> LibraryResult<usize> {
        let mut inner = self.inner.write().await;
        let id = entity.id();
        if inner.items.contains_key(&id) {
            return Err(LibraryError::duplicate_key(
                format!("{} already has an item with id {}", self.table_name, id).as_str()));
        }
        debug!("{} create {}", self.table_name, id);
        inner.order.push(id.to_string());
        inner.items.insert(id, entity.clone());
        Ok(1)
    }

    pub(crate) async fn update(&self, entity: &T) -> LibraryResult<usize> {
        let mut inner = self.inner.write().await;
        let id = entity.id();
        let existing = inner.items.get_mut(&id).ok_or_else(|| LibraryError::not_found(
            format!("{} item not found for {}", self.table_name, id).as_str()))?;
        if existing.version() != entity.version() {
            return Err(LibraryError::unavailable(
                format!("{} item {} was modified, expected version {} but found {}",
                        self.table_name, id, entity.version(), existing.version()).as_str(),
                Some("409".to_string()), true));
        }
        let mut updated = entity.clone();
        updated.set_version(entity.version() + 1);
        debug!("{} update {} to version {}", self.table_name, id, updated.version());
        *existing = updated;
        Ok(1)
    }

    pub(crate) async fn get(&self, id: &str) -> LibraryResult<T> {
        let inner = self.inner.read().await;
        inner.items.get(id).cloned().ok_or_else(|| LibraryError::not_found(
            format!("{} item not found for {}", self.table_name, id).as_str()))
    }

    pub(crate) async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut inner = self.inner.write().await;
        if inner.items.remove(id).is_some() {
            inner.order.retain(|k| k != id);
            debug!("{} delete {}", self.table_name, id);
            Ok(1)
        } else {
            Ok(0)
        }
    }

    pub(crate) async fn list(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<T>> {
        let offset = parse_page(page)?;
        let inner = self.inner.read().await;
        let end = cmp::min(offset.saturating_add(page_size), inner.order.len());
        let records = inner.order.iter()
            .skip(offset)
            .take(end.saturating_sub(offset))
            .filter_map(|id| inner.items.get(id).cloned())
            .collect();
        let next_page = if end < inner.order.len() { Some(end.to_string()) } else { None };
        Ok(PaginatedResult::new(page, page_size, next_page, records))
    }
}

fn parse_page(page: Option<&str>) -> LibraryResult<usize> {
    match page {
        None => Ok(0),
        Some(token) => token.parse::<usize>().map_err(|_| LibraryError::validation(
            format!("invalid page token {}", token).as_str(), Some("400".to_string()))),
    }
}
