use crate::books::factory::create_book_repository;
use crate::core::domain::Configuration;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::events::EventPublisher;
use crate::gateway::factory::create_publisher;
use crate::library::domain::LibraryService;
use crate::library::domain::service::LibraryServiceImpl;
use crate::members::factory::create_member_repository;

pub fn create_library_service(config: &Configuration, via: GatewayPublisherVia) -> Box<dyn LibraryService> {
    create_library_service_with_publisher(config, create_publisher(via))
}

pub fn create_library_service_with_publisher(config: &Configuration,
                                             publisher: Box<dyn EventPublisher>) -> Box<dyn LibraryService> {
    let book_repo = create_book_repository();
    let member_repo = create_member_repository();
    Box::new(LibraryServiceImpl::new(config, book_repo, member_repo, publisher))
}
