//! Command discovery
//!
//! Two ways of filling a [`CommandCatalog`]:
//! - explicit registration from a fixed list of constructors, in order
//! - scanning a namespace of loadable units, either a nested module tree
//!   or a flat archive of entry names resolved against a type table
//!
//! Both report construction failures as skips instead of aborting, so a
//! broken report never prevents the console from starting.

use crate::core::catalog::CommandCatalog;
use crate::core::command::Command;
use crate::core::error::Result;
use crate::core::panic_message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Zero-argument factory for one command type
pub type Constructor<H> = Arc<dyn Fn() -> Result<Box<dyn Command<H>>> + Send + Sync>;

/// How the catalog gets populated at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Fixed constructor table, known order
    #[default]
    Explicit,
    /// Walk the built-in module tree
    Scan,
    /// Resolve the entries listed in a manifest file
    Manifest,
}

/// Shape of a loadable unit
pub enum UnitKind<H: Send> {
    Concrete(Constructor<H>),
    /// Shared base that cannot be instantiated on its own
    Abstract,
    /// Capability declaration with no implementation
    Trait,
}

impl<H: Send + 'static> Clone for UnitKind<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Concrete(ctor) => Self::Concrete(Arc::clone(ctor)),
            Self::Abstract => Self::Abstract,
            Self::Trait => Self::Trait,
        }
    }
}

/// A named type found in a namespace
pub struct Unit<H: Send> {
    path: String,
    kind: UnitKind<H>,
}

impl<H: Send + 'static> Clone for Unit<H> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<H: Send + 'static> Unit<H> {
    /// A concrete unit built by `constructor`
    pub fn concrete<F>(path: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Command<H>>> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            kind: UnitKind::Concrete(Arc::new(constructor)),
        }
    }

    /// A concrete unit whose zero-argument constructor is `Default`
    pub fn of<C>(path: impl Into<String>) -> Self
    where
        C: Command<H> + Default + 'static,
    {
        Self::concrete(path, || Ok(Box::new(C::default()) as Box<dyn Command<H>>))
    }

    pub fn abstract_unit(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: UnitKind::Abstract,
        }
    }

    pub fn trait_unit(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: UnitKind::Trait,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &UnitKind<H> {
        &self.kind
    }

    /// The constructor, if this unit can be instantiated
    pub fn constructor(&self) -> Option<Constructor<H>> {
        match &self.kind {
            UnitKind::Concrete(ctor) => Some(Arc::clone(ctor)),
            UnitKind::Abstract | UnitKind::Trait => None,
        }
    }

    fn with_path(&self, path: String) -> Self {
        Self {
            path,
            kind: self.kind.clone(),
        }
    }
}

/// One candidate produced by a [`UnitSource`]
pub enum UnitEntry<H: Send> {
    Resolved(Unit<H>),
    /// An entry that names no loadable type
    Unresolved { path: String, reason: String },
}

/// A deployment shape that can enumerate the units under a namespace
pub trait UnitSource<H: Send> {
    fn entries(&self, namespace: &str) -> Vec<UnitEntry<H>>;
}

/// `true` when `path` is `namespace` itself or lives below it
pub fn in_namespace(path: &str, namespace: &str) -> bool {
    let namespace = namespace.trim_end_matches("::");
    if namespace.is_empty() {
        return true;
    }
    path == namespace
        || path
            .strip_prefix(namespace)
            .map_or(false, |rest| rest.starts_with("::"))
}

/// Nested modules, walked recursively
pub struct ModuleTree<H: Send> {
    name: String,
    units: Vec<Unit<H>>,
    children: Vec<ModuleTree<H>>,
}

impl<H: Send + 'static> ModuleTree<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a unit; its path is relative to this module
    pub fn with_unit(mut self, unit: Unit<H>) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_units(mut self, units: impl IntoIterator<Item = Unit<H>>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn with_child(mut self, child: ModuleTree<H>) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every unit in the tree with its fully qualified path
    pub fn flatten(&self) -> Vec<Unit<H>> {
        let mut units = Vec::new();
        self.walk("", &mut units);
        units
    }

    fn walk(&self, parent: &str, out: &mut Vec<Unit<H>>) {
        let module_path = if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", parent, self.name)
        };

        for unit in &self.units {
            out.push(unit.with_path(format!("{}::{}", module_path, unit.path)));
        }
        for child in &self.children {
            child.walk(&module_path, out);
        }
    }
}

impl<H: Send + 'static> UnitSource<H> for ModuleTree<H> {
    fn entries(&self, namespace: &str) -> Vec<UnitEntry<H>> {
        self.flatten()
            .into_iter()
            .filter(|unit| in_namespace(&unit.path, namespace))
            .map(UnitEntry::Resolved)
            .collect()
    }
}

/// Flat list of entry names resolved against a table of known types
pub struct Archive<H: Send> {
    entries: Vec<String>,
    types: HashMap<String, Unit<H>>,
}

impl<H: Send + 'static> Archive<H> {
    pub fn new(entries: Vec<String>, types: impl IntoIterator<Item = Unit<H>>) -> Self {
        let types = types
            .into_iter()
            .map(|unit| (unit.path.clone(), unit))
            .collect();
        Self { entries, types }
    }

    /// Read the entry list from a manifest file
    pub fn from_manifest(
        path: impl AsRef<Path>,
        types: impl IntoIterator<Item = Unit<H>>,
    ) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::new(parse_manifest(&content), types))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Send + 'static> UnitSource<H> for Archive<H> {
    fn entries(&self, namespace: &str) -> Vec<UnitEntry<H>> {
        self.entries
            .iter()
            .map(|entry| entry_to_path(entry))
            .filter(|path| in_namespace(path, namespace))
            .map(|path| match self.types.get(&path) {
                Some(unit) => UnitEntry::Resolved(unit.clone()),
                None => UnitEntry::Unresolved {
                    path,
                    reason: "no loadable type for entry".to_string(),
                },
            })
            .collect()
    }
}

/// One entry per line; blank lines and `#` comments are ignored
pub fn parse_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// `reports/city/AllCities` and `reports::city::AllCities` name the same unit
fn entry_to_path(entry: &str) -> String {
    entry
        .trim_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("::")
}

/// A candidate that was not turned into a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUnit {
    pub path: String,
    pub reason: String,
}

/// Outcome of one discovery pass
pub struct DiscoveryResult<H: Send> {
    pub commands: Vec<Box<dyn Command<H>>>,
    pub skipped: Vec<SkippedUnit>,
    /// Abstract and trait units passed over by the shape filter
    pub ignored: usize,
}

impl<H: Send + 'static> Default for DiscoveryResult<H> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            skipped: Vec::new(),
            ignored: 0,
        }
    }
}

impl<H: Send + 'static> DiscoveryResult<H> {
    pub fn command_names(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|command| command.name().to_string())
            .collect()
    }

    /// Register every constructed command, in discovery order.
    ///
    /// Returns how many commands were registered.
    pub fn register_into(self, catalog: &mut CommandCatalog<H>) -> usize {
        let count = self.commands.len();
        for command in self.commands {
            catalog.register(Arc::from(command));
        }
        count
    }

    fn construct(&mut self, path: &str, constructor: &Constructor<H>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| constructor()));

        let reason = match outcome {
            Ok(Ok(command)) if command.name().trim().is_empty() => {
                "constructed command has an empty name".to_string()
            }
            Ok(Ok(command)) => {
                debug!(unit = %path, command = %command.name(), "Constructed command");
                self.commands.push(command);
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panicked during construction: {}", panic_message(&*payload)),
        };

        warn!(unit = %path, %reason, "Failed to instantiate command");
        self.skipped.push(SkippedUnit {
            path: path.to_string(),
            reason,
        });
    }
}

/// Walk `namespace` in `source` and construct every eligible unit.
///
/// Never fails: unresolvable entries and failing constructors end up in
/// [`DiscoveryResult::skipped`].
pub fn discover_all<H: Send + 'static>(
    source: &dyn UnitSource<H>,
    namespace: &str,
) -> DiscoveryResult<H> {
    let mut result = DiscoveryResult::default();

    for entry in source.entries(namespace) {
        match entry {
            UnitEntry::Unresolved { path, reason } => {
                warn!(unit = %path, %reason, "Skipping unresolvable entry");
                result.skipped.push(SkippedUnit { path, reason });
            }
            UnitEntry::Resolved(unit) => match unit.constructor() {
                Some(constructor) => result.construct(&unit.path, &constructor),
                None => {
                    debug!(unit = %unit.path, "Ignoring non-instantiable unit");
                    result.ignored += 1;
                }
            },
        }
    }

    info!(
        namespace = %namespace,
        discovered = result.commands.len(),
        skipped = result.skipped.len(),
        "Command discovery finished"
    );
    result
}

/// Build every command from a fixed constructor list, in order
pub fn discover_explicit<H: Send + 'static>(constructors: &[Constructor<H>]) -> DiscoveryResult<H> {
    let mut result = DiscoveryResult::default();

    for (position, constructor) in constructors.iter().enumerate() {
        result.construct(&format!("explicit[{}]", position), constructor);
    }

    info!(
        discovered = result.commands.len(),
        skipped = result.skipped.len(),
        "Explicit registration finished"
    );
    result
}
