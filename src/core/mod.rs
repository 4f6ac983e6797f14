//! Command catalog, discovery and table layout
//!
//! Everything here is independent of the database: commands are generic
//! over the handle type they borrow while executing.

pub mod catalog;
pub mod command;
pub mod discovery;
pub mod error;
pub mod layout;

#[cfg(test)]
pub(crate) mod testing;


pub use catalog::CommandCatalog;
pub use command::{Command, CommandInfo};
pub use discovery::{
    discover_all, discover_explicit, Archive, Constructor, DiscoveryMode, DiscoveryResult,
    ModuleTree, SkippedUnit, Unit, UnitEntry, UnitKind, UnitSource,
};
pub use error::{Result, UserFriendlyError, WorldError};
pub use layout::{group_thousands, repeated_line, separator_width, Align, Cell, Column, TableLayout};

/// Best-effort text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
