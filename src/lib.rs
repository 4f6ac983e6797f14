//! # world-reports
//!
//! An interactive console that runs named population reports against the
//! MySQL `world` sample database.
//!
//! The building blocks are database independent:
//!
//! - [`core`](crate::core): the [`Command`](crate::core::Command) capability, the
//!   case-insensitive [`CommandCatalog`](crate::core::CommandCatalog), command
//!   discovery and fixed-width [`TableLayout`](crate::core::TableLayout)s
//! - [`runtime`](crate::runtime): the read / resolve / execute [`Session`](runtime::Session)
//!   and [`run_session`](runtime::run_session)
//!
//! With the `mysql` feature, `database` provides the pooled connection
//! provider and `reports` the built-in report commands. The `cli` feature
//! (on by default) adds the `world-reports` binary.
//!
//! ```rust
//! use world_reports::core::{separator_width, CommandCatalog};
//!
//! assert_eq!(separator_width("%-10s %20s %,15d"), 47);
//!
//! let catalog: CommandCatalog<()> = CommandCatalog::new();
//! assert!(catalog.lookup("topcities").is_none());
//! ```

pub mod core;
pub mod runtime;

#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "mysql")]
pub mod reports;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::{Command, CommandCatalog, CommandInfo, Result, TableLayout, WorldError};
pub use crate::runtime::{run_session, ReplOptions, ResourceProvider, Session};
