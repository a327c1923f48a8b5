//! Logging utilities.
//!
//! Centralizes logger initialization. Library code only talks to the `log`
//! facade; `env_logger` is wired up once by the binary.

mod init;

pub use init::{LoggingConfig, init_logging};
