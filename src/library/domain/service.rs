use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use crate::books::domain::model::Book;
use crate::books::repository::BookRepository;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::gateway::events::EventPublisher;
use crate::library::domain::LibraryService;
use crate::library::dto::{LoanDto, ReturnDto};
use crate::members::domain::model::Member;
use crate::members::repository::MemberRepository;
use crate::payments::PaymentProcessor;
use crate::utils::date::today;

pub(crate) struct LibraryServiceImpl {
    branch_id: String,
    book_loan_days: i64,
    book_repository: Box<dyn BookRepository>,
    member_repository: Box<dyn MemberRepository>,
    events_publisher: Box<dyn EventPublisher>,
    // borrow and return read-modify-write a book and a member together
    loans: Mutex<()>,
}

impl LibraryServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
                      member_repository: Box<dyn MemberRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            book_loan_days: config.book_loan_days,
            book_repository,
            member_repository,
            events_publisher,
            loans: Mutex::new(()),
        }
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([("branch_id".to_string(), self.branch_id.to_string())])
    }

    // Writes the pre-return copies back over the ones stored by return_book; each
    // stored version is one ahead of the copy taken before the return.
    async fn reopen_loan(&self, book: &Book, member: Option<&Member>) {
        if let Err(err) = restore(&*self.book_repository, book).await {
            error!("book {} is stored as returned but still on loan: {}", book.book_id, err);
        }
        if let Some(member) = member {
            if let Err(err) = restore(&*self.member_repository, member).await {
                error!("member {} is stored without {} but still holds it: {}", member.member_id, book.book_id, err);
            }
        }
    }
}

async fn restore<Entity, R>(repository: &R, entity: &Entity) -> LibraryResult<usize>
    where Entity: Identifiable + Clone, R: Repository<Entity> + ?Sized {
    let mut previous = entity.clone();
    previous.set_version(entity.version() + 1);
    repository.update(&previous).await
}

#[async_trait]
impl LibraryService for LibraryServiceImpl {
    async fn add_book(&self, book: &Book) -> LibraryResult<Book> {
        let _ = self.book_repository.create(book).await?;
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "books", "books", book.book_id.as_str(), &self.metadata(), book)?).await?;
        info!("added book {} {}", book.book_id, book.title);
        Ok(book.clone())
    }

    async fn add_member(&self, member: &Member) -> LibraryResult<Member> {
        let _ = self.member_repository.create(member).await?;
        let _ = self.events_publisher.publish(&DomainEvent::added(
            "members", "members", member.member_id.as_str(), &self.metadata(), member)?).await?;
        info!("added member {}", member.member_id);
        Ok(member.clone())
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<Book> {
        self.book_repository.get(id).await
    }

    async fn find_member_by_id(&self, id: &str) -> LibraryResult<Member> {
        self.member_repository.get(id).await
    }

    async fn list_books(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Book>> {
        self.book_repository.list(page, page_size).await
    }

    async fn borrow_book(&self, member_id: &str, book_id: &str) -> LibraryResult<LoanDto> {
        let _guard = self.loans.lock().await;
        let mut member = self.member_repository.get(member_id).await?;
        let mut book = self.book_repository.get(book_id).await?;
        let due_date = Duration::try_days(self.book_loan_days)
            .and_then(|period| today().checked_add_signed(period))
            .ok_or_else(|| LibraryError::validation(format!("loan period of {} days is out of range",
                                                            self.book_loan_days).as_str(), Some("400".to_string())))?;
        if !member.borrow_book(&mut book, due_date) {
            warn!("member {} cannot borrow {}, already borrowed", member_id, book_id);
            return Err(LibraryError::validation(format!("book is not available {}",
                                                        book_id).as_str(), Some("400".to_string())));
        }
        self.book_repository.update(&book).await?;
        self.member_repository.update(&member).await?;
        let loan = LoanDto::new(self.branch_id.as_str(), member_id, &book, due_date);
        let _ = self.events_publisher.publish(&DomainEvent::borrowed(
            "book_borrowed", "loans", book_id, &self.metadata(), &loan)?).await?;
        info!("member {} borrowed {} due {}", member_id, book_id, due_date);
        Ok(loan)
    }

    async fn return_book(&self, member_id: &str, book_id: &str,
                         payment: &dyn PaymentProcessor) -> LibraryResult<ReturnDto> {
        let _guard = self.loans.lock().await;
        let mut member = self.member_repository.get(member_id).await?;
        let mut book = self.book_repository.get(book_id).await?;
        if !member.has_borrowed(book_id) || book.borrower() != Some(member_id) {
            warn!("member {} returned {} without borrowing it", member_id, book_id);
            return Err(LibraryError::validation(format!("book {} is not borrowed by member {}",
                                                        book_id, member_id).as_str(), Some("400".to_string())));
        }

        // the charge cannot be undone, so both writes land before it
        let late_fee = book.calculate_late_fee();
        let (loaned_book, loaned_member) = (book.clone(), member.clone());
        if !member.return_book(&mut book) {
            return Err(LibraryError::runtime(format!("book {} could not be returned by {}",
                                                     book_id, member_id).as_str(), None));
        }
        self.book_repository.update(&book).await?;
        if let Err(err) = self.member_repository.update(&member).await {
            warn!("member {} update failed, reopening loan of {}: {}", member_id, book_id, err);
            self.reopen_loan(&loaned_book, None).await;
            return Err(err);
        }

        let paid_with = if late_fee > 0.0 {
            if !payment.process_payment(late_fee) {
                warn!("{} declined late fee {:.2} for {}", payment.name(), late_fee, book_id);
                self.reopen_loan(&loaned_book, Some(&loaned_member)).await;
                return Err(LibraryError::not_granted(format!("payment of {:.2} declined by {}",
                                                             late_fee, payment.name()).as_str(), Some("402".to_string())));
            }
            Some(payment.name().to_string())
        } else {
            None
        };

        let returned = ReturnDto::new(self.branch_id.as_str(), member_id, book_id, late_fee, paid_with);
        let _ = self.events_publisher.publish(&DomainEvent::returned(
            "book_returned", "loans", book_id, &self.metadata(), &returned)?).await?;
        if returned.paid_with.is_some() {
            let _ = self.events_publisher.publish(&DomainEvent::paid(
                "late_fee_paid", "payments", book_id, &self.metadata(), &returned)?).await?;
        }
        info!("member {} returned {} with late fee {:.2}", member_id, book_id, late_fee);
        Ok(returned)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_once::AsyncOnce;
    use async_trait::async_trait;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::books::domain::model::Book;
    use crate::books::factory::create_book_repository;
    use crate::core::domain::Configuration;
    use crate::core::events::DomainEventType;
    use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
    use crate::core::repository::Repository;
    use crate::library::domain::service::LibraryServiceImpl;
    use crate::members::repository::MemberRepository;
    use crate::members::repository::memory_member_repository::MemoryMemberRepository;
    use crate::gateway::GatewayPublisherVia;
    use crate::gateway::memory::publisher::MemoryPublisher;
    use crate::library::domain::LibraryService;
    use crate::library::factory;
    use crate::members::domain::model::Member;
    use crate::payments::processors::{CashPayment, CreditCardPayment, PayPalPayment};
    use crate::utils::date::today;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Box<dyn LibraryService>> = AsyncOnce::new(async {
                factory::create_library_service(&Configuration::new("test"), GatewayPublisherVia::Memory)
            });
    }

    // loans made by this service are already five days overdue
    fn overdue_service(publisher: &MemoryPublisher) -> Box<dyn LibraryService> {
        let mut config = Configuration::new("test");
        config.book_loan_days = -5;
        factory::create_library_service_with_publisher(&config, Box::new(publisher.clone()))
    }

    async fn add_member(svc: &dyn LibraryService) -> Member {
        let member = Member::new(Uuid::new_v4().to_string().as_str(), "Ada");
        svc.add_member(&member).await.expect("should add member")
    }

    #[tokio::test]
    async fn test_should_add_book() {
        let library_svc = SUT_SVC.get().await.clone();

        let book = Book::printed("title", "author", "isbn", 2000, 250);
        let _ = library_svc.add_book(&book).await.expect("should add book");

        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(book.book_id, loaded.book_id);
        assert!(!loaded.is_borrowed());
    }

    #[tokio::test]
    async fn test_should_not_find_missing() {
        let library_svc = SUT_SVC.get().await.clone();
        assert!(matches!(library_svc.find_book_by_id("missing").await, Err(LibraryError::NotFound { .. })));
        assert!(matches!(library_svc.find_member_by_id("missing").await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_borrow_and_return() {
        let library_svc = SUT_SVC.get().await.clone();
        let member = add_member(&**library_svc).await;
        let book = Book::ebook("title", "author", "isbn", 2000, "EPUB");
        let _ = library_svc.add_book(&book).await.expect("should add book");

        let loan = library_svc.borrow_book(member.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");
        assert_eq!(today() + chrono::Duration::days(15), loan.due_date);
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(Some(member.member_id.as_str()), loaded.borrower());
        let holder = library_svc.find_member_by_id(member.member_id.as_str()).await.expect("should return member");
        assert_eq!(vec![book.book_id.to_string()], holder.get_borrowed_books());

        // no fee is owed, so the card is never charged
        let returned = library_svc.return_book(member.member_id.as_str(), book.book_id.as_str(),
                                               &CreditCardPayment::new("4111111111111111")).await.expect("should return");
        assert_eq!(0.0, returned.late_fee);
        assert_eq!(None, returned.paid_with);
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert!(!loaded.is_borrowed());
        let holder = library_svc.find_member_by_id(member.member_id.as_str()).await.expect("should return member");
        assert!(holder.get_borrowed_books().is_empty());
    }

    #[tokio::test]
    async fn test_should_not_borrow_borrowed_book() {
        let library_svc = SUT_SVC.get().await.clone();
        let ada = add_member(&**library_svc).await;
        let bob = add_member(&**library_svc).await;
        let book = Book::new("title", "author", "isbn", 2000);
        let _ = library_svc.add_book(&book).await.expect("should add book");

        let _ = library_svc.borrow_book(ada.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");
        let res = library_svc.borrow_book(bob.member_id.as_str(), book.book_id.as_str()).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let bob = library_svc.find_member_by_id(bob.member_id.as_str()).await.expect("should return member");
        assert!(bob.get_borrowed_books().is_empty());
    }

    #[tokio::test]
    async fn test_should_not_return_book_of_other_member() {
        let library_svc = SUT_SVC.get().await.clone();
        let ada = add_member(&**library_svc).await;
        let bob = add_member(&**library_svc).await;
        let book = Book::new("title", "author", "isbn", 2000);
        let _ = library_svc.add_book(&book).await.expect("should add book");
        let _ = library_svc.borrow_book(ada.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        let res = library_svc.return_book(bob.member_id.as_str(), book.book_id.as_str(), &CashPayment).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(Some(ada.member_id.as_str()), loaded.borrower());
    }

    #[tokio::test]
    async fn test_should_list_books() {
        let publisher = MemoryPublisher::new();
        let library_svc = factory::create_library_service_with_publisher(
            &Configuration::new("test"), Box::new(publisher.clone()));
        for i in 0..3 {
            let _ = library_svc.add_book(&Book::new(format!("title {}", i).as_str(), "author", "isbn", 2000))
                .await.expect("should add book");
        }
        let res = library_svc.list_books(None, 2).await.expect("should list books");
        assert_eq!(2, res.records.len());
        assert_eq!(Some("2".to_string()), res.next_page);
        let events = publisher.get_events().await;
        assert_eq!(3, events.len());
        assert!(events.iter().all(|e| e.kind == DomainEventType::Added));
    }

    #[tokio::test]
    async fn test_should_charge_late_fee_on_return() {
        let publisher = MemoryPublisher::new();
        let library_svc = overdue_service(&publisher);
        let member = add_member(&*library_svc).await;
        let book = Book::printed("title", "author", "isbn", 2000, 250);
        let _ = library_svc.add_book(&book).await.expect("should add book");
        let _ = library_svc.borrow_book(member.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        let returned = library_svc.return_book(member.member_id.as_str(), book.book_id.as_str(), &PayPalPayment)
            .await.expect("should return");
        assert_eq!(3.75, returned.late_fee);
        assert_eq!(Some("paypal".to_string()), returned.paid_with);

        let kinds: Vec<DomainEventType> = publisher.get_events().await
            .iter().map(|e| e.kind).collect();
        assert_eq!(vec![DomainEventType::Added, DomainEventType::Added, DomainEventType::Borrowed,
                        DomainEventType::Returned, DomainEventType::Paid], kinds);
    }

    #[tokio::test]
    async fn test_should_keep_loan_when_payment_declined() {
        let publisher = MemoryPublisher::new();
        let library_svc = overdue_service(&publisher);
        let member = add_member(&*library_svc).await;
        let book = Book::new("title", "author", "isbn", 2000);
        let _ = library_svc.add_book(&book).await.expect("should add book");
        let _ = library_svc.borrow_book(member.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        let declining = DecliningPayment;
        let res = library_svc.return_book(member.member_id.as_str(), book.book_id.as_str(), &declining).await;
        assert!(matches!(res, Err(LibraryError::NotGranted { .. })));
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert!(loaded.is_borrowed());
        let holder = library_svc.find_member_by_id(member.member_id.as_str()).await.expect("should return member");
        assert_eq!(vec![book.book_id.to_string()], holder.get_borrowed_books());

        let returned = library_svc.return_book(member.member_id.as_str(), book.book_id.as_str(), &CashPayment)
            .await.expect("should return after declined payment");
        assert_eq!(2.5, returned.late_fee);
        assert_eq!(Some("cash".to_string()), returned.paid_with);
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert!(!loaded.is_borrowed());
    }

    #[tokio::test]
    async fn test_should_reject_out_of_range_loan_period() {
        for days in [1_000_000_000, i64::MAX, i64::MIN] {
            let mut config = Configuration::new("test");
            config.book_loan_days = days;
            let library_svc = factory::create_library_service(&config, GatewayPublisherVia::Memory);
            let member = add_member(&*library_svc).await;
            let book = Book::new("title", "author", "isbn", 2000);
            let _ = library_svc.add_book(&book).await.expect("should add book");

            let res = library_svc.borrow_book(member.member_id.as_str(), book.book_id.as_str()).await;
            assert!(matches!(res, Err(LibraryError::Validation { .. })), "{} days should be rejected", days);
            let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
            assert!(!loaded.is_borrowed());
        }
    }

    #[tokio::test]
    async fn test_should_not_charge_when_member_update_fails() {
        let mut config = Configuration::new("test");
        config.book_loan_days = -5;
        // the borrow may update the member, the return may not
        let library_svc = LibraryServiceImpl::new(
            &config, create_book_repository(),
            Box::new(FailingMemberRepository::new(1)), Box::new(MemoryPublisher::new()));
        let member = add_member(&library_svc).await;
        let book = Book::new("title", "author", "isbn", 2000);
        let _ = library_svc.add_book(&book).await.expect("should add book");
        let _ = library_svc.borrow_book(member.member_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        let payment = RecordingPayment::default();
        let res = library_svc.return_book(member.member_id.as_str(), book.book_id.as_str(), &payment).await;
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
        assert_eq!(0, payment.charges.load(Ordering::SeqCst));
        let loaded = library_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(Some(member.member_id.as_str()), loaded.borrower());
        let holder = library_svc.find_member_by_id(member.member_id.as_str()).await.expect("should return member");
        assert_eq!(vec![book.book_id.to_string()], holder.get_borrowed_books());
    }

    struct FailingMemberRepository {
        inner: MemoryMemberRepository,
        updates_allowed: AtomicUsize,
    }

    impl FailingMemberRepository {
        fn new(updates_allowed: usize) -> Self {
            Self {
                inner: MemoryMemberRepository::new("members"),
                updates_allowed: AtomicUsize::new(updates_allowed),
            }
        }
    }

    #[async_trait]
    impl Repository<Member> for FailingMemberRepository {
        async fn create(&self, entity: &Member) -> LibraryResult<usize> {
            self.inner.create(entity).await
        }

        async fn update(&self, entity: &Member) -> LibraryResult<usize> {
            let allowed = self.updates_allowed.load(Ordering::SeqCst);
            if allowed == 0 {
                return Err(LibraryError::unavailable("members table is unavailable", None, true));
            }
            self.updates_allowed.store(allowed - 1, Ordering::SeqCst);
            self.inner.update(entity).await
        }

        async fn get(&self, id: &str) -> LibraryResult<Member> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: &str) -> LibraryResult<usize> {
            self.inner.delete(id).await
        }

        async fn list(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<Member>> {
            self.inner.list(page, page_size).await
        }
    }

    impl MemberRepository for FailingMemberRepository {}

    #[derive(Default)]
    struct RecordingPayment {
        charges: AtomicUsize,
    }

    impl crate::payments::PaymentProcessor for RecordingPayment {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn process_payment(&self, _amount: f64) -> bool {
            self.charges.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    struct DecliningPayment;

    impl crate::payments::PaymentProcessor for DecliningPayment {
        fn name(&self) -> &'static str {
            "declining"
        }

        fn process_payment(&self, _amount: f64) -> bool {
            false
        }
    }
}
