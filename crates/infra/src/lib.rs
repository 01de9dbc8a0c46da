//! Infrastructure layer: identity and content storage (in-memory and PostgreSQL).

pub mod content;
pub mod db;
pub mod identity;


pub use content::{InMemoryContentStore, PostgresContentStore};
pub use identity::{InMemoryIdentityStore, PostgresIdentityStore};
