//! Domain layer types and rules that hold regardless of where content is stored.

pub mod comments;
pub mod entities;
pub mod error;
pub mod newsletter;
pub mod posts;
pub mod slug;
pub mod types;
