//! View models and askama templates for the public site and the admin area.

pub mod admin;
pub mod views;
