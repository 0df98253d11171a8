#![doc(test(attr(deny(warnings))))]

//! Asset Tracker keeps per-kind collections of a personal portfolio (cash, holdings,
//! fixed assets, liabilities and other assets) optimistically in sync with a remote
//! store, and ships a small shell to drive them.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod portfolio;
pub mod storage;
pub mod sync;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Asset Tracker tracing initialized.");
        tracing::debug!("{}", utils::build_info::current().summary());
    });
}
