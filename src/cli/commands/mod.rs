//! CLI command implementations

pub mod attrs;
pub mod completions;
pub mod init;
pub mod matching;
pub mod next;
pub mod rpc;
pub mod sync;
pub mod templates;
