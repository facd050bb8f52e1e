//! Application services: the use cases behind the public site and the admin area.

pub mod admin;
pub mod auth;
pub mod autosave;
pub mod chrome;
pub mod comments;
pub mod error;
pub mod feed;
pub mod newsletter;
pub mod pagination;
pub mod render;
pub mod repos;
pub mod stream;
