//! Name to command registry
//!
//! Keys are the case-folded command names. Enumeration follows insertion
//! order; registering a name that already exists replaces the command in
//! place, so the entry keeps its original position.

use crate::core::command::{Command, CommandInfo};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of invocable commands
pub struct CommandCatalog<H: Send> {
    commands: Vec<Arc<dyn Command<H>>>,
    index: HashMap<String, usize>,
}

impl<H: Send> CommandCatalog<H> {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a command under its case-folded name.
    ///
    /// Last write wins: an existing entry with the same name is replaced.
    pub fn register(&mut self, command: Arc<dyn Command<H>>) {
        let key = fold(command.name());

        match self.index.get(&key) {
            Some(&slot) => {
                debug!(command = %key, "Replacing registered command");
                self.commands[slot] = command;
            }
            None => {
                debug!(command = %key, "Registering command");
                self.index.insert(key, self.commands.len());
                self.commands.push(command);
            }
        }
    }

    /// Find a command by exact, case-insensitive name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Command<H>>> {
        self.index
            .get(&fold(name))
            .map(|&slot| Arc::clone(&self.commands[slot]))
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&fold(name))
    }

    /// Names and descriptions in registration order
    pub fn list(&self) -> Vec<CommandInfo> {
        self.commands
            .iter()
            .map(|command| CommandInfo {
                name: command.name().to_string(),
                description: command.description().to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Uppercasing first maps `ß` to `SS`, so `straße`, `STRASSE` and
/// `strasse` share one key.
fn fold(name: &str) -> String {
    name.to_uppercase().to_lowercase()
}

impl<H: Send> Default for CommandCatalog<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{RecordingHandle, StaticCommand};
    use proptest::prelude::*;

    fn catalog_with(names: &[&str]) -> CommandCatalog<RecordingHandle> {
        let mut catalog = CommandCatalog::new();
        for name in names {
            catalog.register(Arc::new(StaticCommand::ok(name, "test command")));
        }
        catalog
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = catalog_with(&["capital-cities-continent"]);

        assert!(catalog.contains("capital-cities-continent"));
        assert!(catalog.contains("CAPITAL-CITIES-CONTINENT"));
        assert!(catalog.contains("Capital-Cities-Continent"));

        let command = catalog.lookup("Capital-Cities-Continent").unwrap();
        assert_eq!(command.name(), "capital-cities-continent");
    }

    #[test]
    fn test_lookup_folds_non_ascii_names() {
        let catalog = catalog_with(&["straße"]);

        assert!(catalog.contains("straße"));
        assert!(catalog.contains("STRASSE"));
        assert!(catalog.contains("strasse"));
        assert_eq!(catalog.lookup("Straße").unwrap().name(), "straße");
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let catalog = catalog_with(&["top-countries"]);

        assert!(!catalog.contains("non-existent-command"));
        assert!(catalog.lookup("non-existent-command").is_none());
        // no prefix matching
        assert!(catalog.lookup("top").is_none());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut catalog = CommandCatalog::<RecordingHandle>::new();
        catalog.register(Arc::new(StaticCommand::ok("alpha", "first")));
        catalog.register(Arc::new(StaticCommand::ok("beta", "second")));
        catalog.register(Arc::new(StaticCommand::ok("ALPHA", "replacement")));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("alpha").unwrap().description(), "replacement");

        // the replacement keeps the slot of the original entry
        let names: Vec<String> = catalog.list().into_iter().map(|info| info.name).collect();
        assert_eq!(names, vec!["ALPHA", "beta"]);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let catalog = catalog_with(&["zeta", "alpha", "mu"]);
        let names: Vec<String> = catalog.list().into_iter().map(|info| info.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let mut catalog = catalog_with(&["alpha"]);
        let snapshot = catalog.list();

        catalog.register(Arc::new(StaticCommand::ok("beta", "second")));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(catalog.list().len(), 2);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = CommandCatalog::<RecordingHandle>::default();
        assert!(catalog.is_empty());
        assert!(catalog.list().is_empty());
        assert!(catalog.lookup("anything").is_none());
    }

    proptest! {
        #[test]
        fn prop_lookup_ignores_case(name in "[a-zA-Zßİıçéøąσς][a-zA-Z0-9ßİıçéøąσς-]{0,20}") {
            let catalog = catalog_with(&[name.as_str()]);

            let lower = catalog.lookup(&name.to_lowercase()).map(|c| c.name().to_string());
            let upper = catalog.lookup(&name.to_uppercase()).map(|c| c.name().to_string());
            let exact = catalog.lookup(&name).map(|c| c.name().to_string());

            prop_assert_eq!(&exact, &Some(name.clone()));
            prop_assert_eq!(&lower, &exact);
            prop_assert_eq!(&upper, &exact);
        }

        #[test]
        fn prop_last_write_wins(name in "[a-z][a-z-]{0,15}", first in "[a-z ]{1,20}", second in "[a-z ]{1,20}") {
            let mut catalog = CommandCatalog::<RecordingHandle>::new();
            catalog.register(Arc::new(StaticCommand::ok(&name, &first)));
            catalog.register(Arc::new(StaticCommand::ok(&name.to_uppercase(), &second)));

            prop_assert_eq!(catalog.len(), 1);
            let found = catalog.lookup(&name).unwrap();
            prop_assert_eq!(found.description(), second.as_str());
        }
    }
}
