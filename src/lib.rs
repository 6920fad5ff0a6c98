#![doc(test(attr(deny(warnings))))]

//! Interreg Core tracks recurring project tasks, expands them into dated
//! subtasks, and runs expenses through a multi-level approval workflow
//! against planned budget lines.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod periodicity;
pub mod storage;
pub mod utils;

pub use errors::{CoreError, Result};

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    if utils::init_tracing() {
        tracing::info!("Interreg Core tracing initialized.");
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_installs_subscriber_once() {
        super::init();
        super::init();
        assert!(!super::utils::init_tracing());
    }
}
