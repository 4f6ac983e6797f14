//! The unit of work the catalog manages

use crate::core::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// A named, invocable report or action.
///
/// `H` is the shared resource handle the caller owns (a database
/// connection for the built-in reports). Commands borrow it for the
/// duration of one `execute` call and never close it.
///
/// Implementations are constructed once and are immutable afterwards, so
/// `name` must return the same value for the whole process.
#[async_trait]
pub trait Command<H: Send>: Send + Sync {
    /// Identifier the user types; matched case-insensitively
    fn name(&self) -> &str;

    /// One-line text shown in help listings
    fn description(&self) -> &str;

    /// Run the command.
    ///
    /// `args` holds every token of the input line, the command name
    /// included at index 0 exactly as typed.
    async fn execute(
        &self,
        handle: &mut H,
        args: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<()>;
}

/// Snapshot of one catalog entry for help output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
}
