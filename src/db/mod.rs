//! Canonical store access.

pub mod gateway;
pub mod memory;
pub mod postgres;
pub mod store;

pub use gateway::{BatchFailure, PersistenceGateway, WriteSummary, DEFAULT_BATCH_SIZE};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{DeleteFilter, IndicatorStore, ValueFilter};
