//! Population reports over the MySQL `world` schema
//!
//! Every report is a [`Command`](crate::core::Command) executed against a
//! pooled connection. Listings share one rendering path: a title, an `=`
//! frame sized by the table layout, a header, a `-` rule, the rows and a
//! closing frame.

pub mod args;
pub mod cities;
pub mod countries;
pub mod language;
pub mod population;
pub mod registry;

pub use cities::CityReport;
pub use countries::CountryReport;
pub use language::LanguageDistribution;
pub use population::{BreakdownScope, PopulationBreakdown, PopulationTotal, TotalScope};
pub use registry::{build_catalog, builtin_constructors, module_tree, type_table, BUNDLED_MANIFEST};

use crate::core::{Cell, Result, TableLayout};
use sqlx::pool::PoolConnection;
use sqlx::MySql;
use std::io::Write;

/// Handle every report borrows while it runs
pub type WorldConnection = PoolConnection<MySql>;

/// Geographic filter of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    World,
    Country,
    Continent,
    Region,
    District,
}

impl Scope {
    /// Column compared with the scope value; `None` for the whole world
    pub fn column(&self) -> Option<&'static str> {
        match self {
            Scope::World => None,
            Scope::Country => Some("country.Name"),
            Scope::Continent => Some("country.Continent"),
            Scope::Region => Some("country.Region"),
            Scope::District => Some("city.District"),
        }
    }

    /// Placeholder used in usage strings
    pub fn placeholder(&self) -> &'static str {
        match self {
            Scope::World => "",
            Scope::Country => "<country>",
            Scope::Continent => "<continent>",
            Scope::Region => "<region>",
            Scope::District => "<district>",
        }
    }

    pub fn describe(&self, value: Option<&str>) -> String {
        match (self, value) {
            (Scope::World, _) | (_, None) => "the World".to_string(),
            (_, Some(value)) => value.to_string(),
        }
    }
}

/// Usage line of a scoped listing; world "top" reports take an optional count
pub(crate) fn listing_usage(name: &str, scope: Scope, ranked: bool) -> String {
    match (scope, ranked) {
        (Scope::World, false) => format!("Usage: {}", name),
        (Scope::World, true) => format!("Usage: {} [N]", name),
        (scope, false) => format!("Usage: {} {}", name, scope.placeholder()),
        (scope, true) => format!("Usage: {} {} <N>", name, scope.placeholder()),
    }
}

/// Scope value and row limit of a listing
pub(crate) fn listing_args(
    args: &[String],
    scope: Scope,
    ranked: bool,
    usage: &str,
) -> Result<(Option<String>, Option<u32>)> {
    match (scope, ranked) {
        (Scope::World, false) => Ok((None, None)),
        (Scope::World, true) => Ok((None, Some(args::optional_count(args, usage)?))),
        (_, false) => Ok((Some(args::scope(args, usage)?), None)),
        (_, true) => {
            let (value, count) = args::scope_and_count(args, usage)?;
            Ok((Some(value), Some(count)))
        }
    }
}

/// A framed table
pub(crate) struct Table<'a> {
    pub title: String,
    pub layout: TableLayout,
    pub labels: &'a [&'a str],
    /// Printed instead of rows when there are none
    pub empty: String,
}

impl Table<'_> {
    pub fn write(&self, rows: &[Vec<Cell>], out: &mut (dyn Write + Send)) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.title)?;
        writeln!(out, "{}", self.layout.separator('='))?;
        writeln!(out, "{}", self.layout.header(self.labels).trim_end())?;
        writeln!(out, "{}", self.layout.separator('-'))?;

        if rows.is_empty() {
            writeln!(out, "  {}", self.empty)?;
        }
        for row in rows {
            writeln!(out, "{}", self.layout.row(row).trim_end())?;
        }

        writeln!(out, "{}", self.layout.separator('='))?;
        Ok(())
    }
}
