pub mod breaker;
pub mod directory;
pub mod receipts;
pub mod store;

pub use breaker::{BreakerConfig, BreakerState, CircuitBreaker};
pub use directory::{LookupOutcome, StudentDirectoryClient};
pub use receipts::ReceiptService;
pub use store::{InMemoryReceiptStore, ReceiptStore};
