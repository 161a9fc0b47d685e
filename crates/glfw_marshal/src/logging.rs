//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Route log output through the test harness. Safe to call from every test.
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
