//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod ask;
pub mod check_db;
pub mod documents;
pub mod extract;
pub mod init;
pub mod serve;
