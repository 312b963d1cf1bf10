//! One module per subcommand.  Each exposes an `execute` function called
//! from `main`.

#[cfg(feature = "audit-log")]
pub mod audit_cmd;
pub mod add;
pub mod completions;
pub mod copy;
pub mod get;
pub mod init;
pub mod list;
pub mod remove;
pub mod shell;
pub mod summary;
