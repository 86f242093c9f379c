use library_catalog::books::domain::model::Book;
use library_catalog::core::domain::Configuration;
use library_catalog::core::library::LibraryResult;
use library_catalog::gateway::GatewayPublisherVia;
use library_catalog::library::factory::create_library_service;
use library_catalog::members::domain::model::Member;
use library_catalog::payments::PaymentMethod;
use library_catalog::payments::factory::create_payment_processor;
use library_catalog::utils::logging::setup_tracing;

const BRANCH_ID: &str = "main";

#[tokio::main]
async fn main() -> LibraryResult<()> {
    setup_tracing();

    let config = Configuration::from_env(BRANCH_ID);
    let library = create_library_service(&config, GatewayPublisherVia::Logs);

    let printed = library.add_book(&Book::printed(
        "The Pragmatic Programmer", "Andrew Hunt", "978-0201616224", 1999, 352)).await?;
    let ebook = library.add_book(&Book::ebook(
        "Programming Rust", "Jim Blandy", "978-1492052593", 2021, "EPUB")).await?;
    let _ = library.add_book(&Book::new(
        "Structure and Interpretation of Computer Programs", "Harold Abelson", "978-0262510875", 1996)).await?;
    let member = library.add_member(&Member::new("M-001", "Ada Lovelace")).await?;

    let loan = library.borrow_book(member.member_id.as_str(), printed.book_id.as_str()).await?;
    println!("{} borrowed '{}' until {}", member.name, loan.title, loan.due_date);
    let _ = library.borrow_book(member.member_id.as_str(), ebook.book_id.as_str()).await?;

    if let Err(err) = library.borrow_book(member.member_id.as_str(), printed.book_id.as_str()).await {
        println!("second borrow rejected: {}", err);
    }

    println!("\nLibrary books:");
    let page = library.list_books(None, config.page_size).await?;
    for book in page.records.iter() {
        println!("  {}", book);
    }
    println!();

    let cash = create_payment_processor(PaymentMethod::Cash);
    let returned = library.return_book(member.member_id.as_str(), printed.book_id.as_str(), &*cash).await?;
    println!("returned {} with late fee ${:.2}", returned.book_id, returned.late_fee);

    let card = create_payment_processor(PaymentMethod::CreditCard("4111111111111111".to_string()));
    let returned = library.return_book(member.member_id.as_str(), ebook.book_id.as_str(), &*card).await?;
    println!("returned {} with late fee ${:.2}", returned.book_id, returned.late_fee);

    Ok(())
}
