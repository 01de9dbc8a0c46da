//! [`scribe_content::ContentStore`] implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryContentStore;
pub use postgres::PostgresContentStore;
