//! Test doubles shared by the catalog, discovery and dispatcher tests

use crate::core::command::Command;
use crate::core::error::{Result, WorldError};
use async_trait::async_trait;
use std::io::Write;

/// Stand-in for a database connection: remembers every invocation
#[derive(Debug, Default)]
pub struct RecordingHandle {
    pub calls: Vec<(String, Vec<String>)>,
}

/// What a `StaticCommand` does when executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Command with a fixed name, description and outcome
#[derive(Debug, Clone)]
pub struct StaticCommand {
    name: String,
    description: String,
    behavior: Behavior,
}

impl StaticCommand {
    pub fn new(name: &str, description: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            behavior,
        }
    }

    pub fn ok(name: &str, description: &str) -> Self {
        Self::new(name, description, Behavior::Succeed)
    }

    pub fn failing(name: &str, description: &str) -> Self {
        Self::new(name, description, Behavior::Fail)
    }

    pub fn panicking(name: &str, description: &str) -> Self {
        Self::new(name, description, Behavior::Panic)
    }
}

#[async_trait]
impl Command<RecordingHandle> for StaticCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(
        &self,
        handle: &mut RecordingHandle,
        args: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        handle.calls.push((self.name.clone(), args.to_vec()));

        match self.behavior {
            Behavior::Succeed => {
                writeln!(out, "{} ran with {} args", self.name, args.len())?;
                Ok(())
            }
            Behavior::Fail => Err(WorldError::execution(format!(
                "{} could not reach the data",
                self.name
            ))),
            Behavior::Panic => panic!("{} exploded", self.name),
        }
    }
}
