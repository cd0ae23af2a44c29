//! CLI command implementations
//!
//! Exit codes: 0 success, 2 configuration error, 4 backend connection
//! error, 5 fatal error.

pub mod init;
pub mod run;
pub mod validate;
