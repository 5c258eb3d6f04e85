//! Workspace integration tests: whole IDE caches read through the facade.

#[path = "../common/mod.rs"]
mod common;

mod legacy_store;
mod log_store;
