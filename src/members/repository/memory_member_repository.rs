use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::members::domain::model::Member;
use crate::members::repository::MemberRepository;
use crate::utils::memory::MemoryStore;

#[derive(Debug)]
pub struct MemoryMemberRepository {
    store: MemoryStore<Member>,
}

impl MemoryMemberRepository {
    pub(crate) fn new(table_name: &str) -> Self {
        Self {
            store: MemoryStore::new(table_name),
        }
    }
}

#[async_trait]
impl Repository<Member> for MemoryMemberRepository {
    async fn create(&self, entity: &Member) -> LibraryResult<usize> {
        self.store.create(entity).await
    }

    async fn update(&self, entity: &Member) -> LibraryResult<usize> {
        self.store.update(entity).await
    }

    async fn get(&self, id: &str) -> LibraryResult<Member> {
        self.store.get(id).await
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id).await
    }

    async fn list(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Member>> {
        self.store.list(page, page_size).await
    }
}

impl MemberRepository for MemoryMemberRepository {}
