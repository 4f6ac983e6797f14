//! Line-oriented read / resolve / execute loop
//!
//! One line is processed to completion before the next is read. Every
//! failure raised by a command, including a panic, is caught here and
//! turned into an error line; the loop only ends on `exit` or end of
//! input.

use crate::core::{panic_message, CommandCatalog, Result, WorldError};
use futures::FutureExt;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

#[cfg(feature = "cli")]
use colored::Colorize;

/// Ends the session when it is the only token on the line
pub const EXIT_DIRECTIVE: &str = "exit";

/// Tokens that list the catalog unless a command claims the name
pub const HELP_ALIASES: [&str; 2] = ["help", "?"];

/// Presentation settings for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplOptions {
    pub prompt: String,
    /// Colored error labels (needs the `cli` feature)
    pub color: bool,
    /// Print the greeting line before the first prompt
    pub banner: bool,
}

impl Default for ReplOptions {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            color: false,
            banner: true,
        }
    }
}

/// What a single input line led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank line; the catalog was not consulted
    Empty,
    Help,
    Unknown(String),
    Executed(String),
    Failed { command: String, message: String },
    Exit,
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Non-blank lines dispatched
    pub lines: usize,
    pub executed: usize,
    pub failed: usize,
    pub unknown: usize,
}

/// Run-time state of one interactive session.
///
/// The handle is borrowed from the caller, who stays responsible for
/// releasing it after the session returns.
pub struct Session<'a, H: Send> {
    catalog: &'a CommandCatalog<H>,
    handle: &'a mut H,
    options: ReplOptions,
    running: bool,
    stats: SessionStats,
}

impl<'a, H: Send + 'static> Session<'a, H> {
    pub fn new(catalog: &'a CommandCatalog<H>, handle: &'a mut H) -> Self {
        Self {
            catalog,
            handle,
            options: ReplOptions::default(),
            running: true,
            stats: SessionStats::default(),
        }
    }

    pub fn with_options(mut self, options: ReplOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Read lines from `input` until `exit` or end of input
    pub async fn run<R, W>(&mut self, mut input: R, out: &mut W) -> Result<SessionStats>
    where
        R: AsyncBufRead + Unpin,
        W: Write + Send,
    {
        info!(commands = self.catalog.len(), "Interactive session started");

        if self.options.banner {
            writeln!(
                out,
                "{} commands available. Type 'help' to list them or '{}' to quit.",
                self.catalog.len(),
                EXIT_DIRECTIVE
            )?;
        }

        let mut buffer = Vec::new();
        while self.running {
            write!(out, "{}", self.options.prompt)?;
            out.flush()?;

            buffer.clear();
            if input.read_until(b'\n', &mut buffer).await? == 0 {
                // end of input behaves like `exit`
                writeln!(out)?;
                self.stop(out)?;
                break;
            }

            let line = String::from_utf8_lossy(&buffer);
            self.dispatch_line(&line, out).await?;
        }

        info!(
            lines = self.stats.lines,
            executed = self.stats.executed,
            failed = self.stats.failed,
            "Interactive session ended"
        );
        Ok(self.stats)
    }

    /// Process one input line.
    ///
    /// Only writes to `out` can fail; command errors come back as
    /// [`Dispatch::Failed`].
    pub async fn dispatch_line<W>(&mut self, line: &str, out: &mut W) -> Result<Dispatch>
    where
        W: Write + Send,
    {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(first) = tokens.first().cloned() else {
            return Ok(Dispatch::Empty);
        };
        self.stats.lines += 1;

        if tokens.len() == 1 && first.eq_ignore_ascii_case(EXIT_DIRECTIVE) {
            self.stop(out)?;
            return Ok(Dispatch::Exit);
        }

        let Some(command) = self.catalog.lookup(&first) else {
            if HELP_ALIASES.iter().any(|alias| first.eq_ignore_ascii_case(alias)) {
                self.print_help(out)?;
                return Ok(Dispatch::Help);
            }

            debug!(command = %first, "Unknown command");
            self.stats.unknown += 1;
            writeln!(out, "{}", WorldError::CommandNotFound(first.clone()).user_message())?;
            return Ok(Dispatch::Unknown(first));
        };

        let name = command.name().to_string();
        debug!(command = %name, args = ?&tokens[1..], "Executing command");

        let outcome = {
            let sink: &mut (dyn Write + Send) = &mut *out;
            AssertUnwindSafe(command.execute(&mut *self.handle, &tokens, sink))
                .catch_unwind()
                .await
        };

        let message = match outcome {
            Ok(Ok(())) => {
                out.flush()?;
                self.stats.executed += 1;
                return Ok(Dispatch::Executed(name));
            }
            Ok(Err(e)) => e.user_message(),
            Err(payload) => format!("command panicked: {}", panic_message(&*payload)),
        };

        warn!(command = %name, error = %message, "Command failed");
        self.stats.failed += 1;
        writeln!(out, "{} {}", self.error_label(), message)?;
        out.flush()?;

        Ok(Dispatch::Failed {
            command: name,
            message,
        })
    }

    fn stop<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.running = false;
        writeln!(out, "Goodbye!")?;
        out.flush()?;
        Ok(())
    }

    fn print_help<W: Write>(&self, out: &mut W) -> Result<()> {
        let commands = self.catalog.list();
        let help_label = HELP_ALIASES.join(", ");

        let width = commands
            .iter()
            .map(|info| info.name.chars().count())
            .chain([help_label.chars().count(), EXIT_DIRECTIVE.len()])
            .max()
            .unwrap_or(0);

        if commands.is_empty() {
            writeln!(out, "No commands are registered.")?;
        } else {
            writeln!(out, "Available commands:")?;
            for info in &commands {
                writeln!(out, "  {:<width$}  {}", info.name, info.description, width = width)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "  {:<width$}  Show this list", help_label, width = width)?;
        writeln!(
            out,
            "  {:<width$}  Leave the session",
            EXIT_DIRECTIVE,
            width = width
        )?;
        Ok(())
    }

    #[cfg(feature = "cli")]
    fn error_label(&self) -> String {
        if self.options.color {
            "Error:".red().bold().to_string()
        } else {
            "Error:".to_string()
        }
    }

    #[cfg(not(feature = "cli"))]
    fn error_label(&self) -> String {
        "Error:".to_string()
    }
}
