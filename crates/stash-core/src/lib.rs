//! Core domain + application logic for the stash bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the HTTP
//! server live behind ports (traits) implemented in adapter crates.

pub mod actions;
pub mod archive;
pub mod attachment;
pub mod callback;
pub mod config;
pub mod domain;
pub mod download;
pub mod errors;
pub mod filename;
pub mod formatting;
pub mod logging;
pub mod messaging;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
