//! Shared utilities

pub mod http;
