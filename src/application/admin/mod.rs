//! Application services for the administrative surface.

pub mod chrome;
pub mod comments;
pub mod dashboard;
pub mod posts;
pub mod subscribers;
pub mod taxonomy;
