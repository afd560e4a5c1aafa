//! CLI command implementations.

pub mod init;
pub mod investigate;
pub mod lesson;
