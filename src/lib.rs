//! Quire: a server-rendered blog front end over a remote REST API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
