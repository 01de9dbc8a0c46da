//! [`scribe_auth::IdentityStore`] implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryIdentityStore;
pub use postgres::PostgresIdentityStore;
