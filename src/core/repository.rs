use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};

#[async_trait]
pub trait Repository<Entity>: Sync + Send {
    // create an entity
    async fn create(&self, entity: &Entity) -> LibraryResult<usize>;

    // updates an entity
    async fn update(&self, entity: &Entity) -> LibraryResult<usize>;

    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Entity>;

    // delete an entity
    async fn delete(&self, id: &str) -> LibraryResult<usize>;

    // list entities in insertion order
    async fn list(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Entity>>;
}
