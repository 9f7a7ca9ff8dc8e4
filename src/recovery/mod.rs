//! Crash recovery: durable RecoveryLog artifacts and the startup resume choice.

pub mod errors;
pub mod log_store;
pub mod selection;

pub use errors::RecoveryError;
pub use log_store::{CONSUMED_SUFFIX, RecoveryLogStore};
pub use selection::{Prompt, StartMode, TerminalPrompt, initial_snapshot, select_recovery_log};
