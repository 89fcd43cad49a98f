//! discfinder - barcode to movie metadata resolver
//!
//! This library crate exposes the resolver pipeline for the CLI, the HTTP
//! server, and integration tests.

pub mod config;
pub mod http;
pub mod metadata;
pub mod resolver;
pub mod server;
pub mod upc;
