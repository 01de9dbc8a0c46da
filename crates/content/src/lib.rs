//! Posts and comments owned by authenticated users.
//!
//! Pure domain rules and the storage seam; no HTTP, no SQL.

pub mod comment;
pub mod error;
pub mod post;
pub mod service;
pub mod store;

pub use comment::{Comment, CommentDraft};
pub use error::ContentError;
pub use post::{Post, PostDraft, PostQuery};
pub use service::ContentService;
pub use store::ContentStore;
