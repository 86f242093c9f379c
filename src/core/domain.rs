use serde::{Deserialize, Serialize};
use tracing::warn;

pub const BOOK_LOAN_DAYS_ENV: &str = "LIBRARY_BOOK_LOAN_DAYS";
const DEFAULT_BOOK_LOAN_DAYS: i64 = 15;
const MAX_BOOK_LOAN_DAYS: i64 = 3650;

// Identifiable defines common traits that can be shared by stored objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
    fn set_version(&mut self, version: i64);
}

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub branch_id: String,
    pub book_loan_days: i64,
    pub page_size: usize,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            book_loan_days: DEFAULT_BOOK_LOAN_DAYS,
            page_size: 50,
        }
    }

    // Same defaults as `new`, with the loan period taken from LIBRARY_BOOK_LOAN_DAYS
    // when it is a whole number of days between 1 and MAX_BOOK_LOAN_DAYS.
    pub fn from_env(branch_id: &str) -> Self {
        let mut config = Self::new(branch_id);
        if let Ok(value) = std::env::var(BOOK_LOAN_DAYS_ENV) {
            match value.trim().parse::<i64>() {
                Ok(days) if (1..=MAX_BOOK_LOAN_DAYS).contains(&days) => {
                    config.book_loan_days = days;
                }
                _ => {
                    warn!("ignoring {}={}, using {} days", BOOK_LOAN_DAYS_ENV, value, DEFAULT_BOOK_LOAN_DAYS);
                }
            }
        }
        config
    }
}
