use async_trait::async_trait;
use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryStore;

#[derive(Debug)]
pub struct MemoryBookRepository {
    store: MemoryStore<Book>,
}

impl MemoryBookRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            store: MemoryStore::new(table_name),
        }
    }
}

#[async_trait]
impl Repository<Book> for MemoryBookRepository {
    async fn create(&self, entity: &Book) -> LibraryResult<usize> {
        self.store.create(entity).await
    }

    async fn update(&self, entity: &Book) -> LibraryResult<usize> {
        self.store.update(entity).await
    }

    async fn get(&self, id: &str) -> LibraryResult<Book> {
        self.store.get(id).await
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id).await
    }

    async fn list(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Book>> {
        self.store.list(page, page_size).await
    }
}

impl BookRepository for MemoryBookRepository {}
