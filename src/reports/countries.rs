//! Country listings

use super::{listing_args, listing_usage, Scope, Table, WorldConnection};
use crate::core::{Cell, Command, Result, TableLayout};
use async_trait::async_trait;
use sqlx::Row;
use std::io::Write;
use tracing::debug;

const COLUMNS: &str = "%-5s %-45s %-15s %-26s %,15d";
const LABELS: [&str; 5] = ["Code", "Country", "Continent", "Region", "Population"];

/// Countries ordered by population, in the world, a continent or a region
#[derive(Debug, Clone)]
pub struct CountryReport {
    name: &'static str,
    description: &'static str,
    usage: String,
    scope: Scope,
    ranked: bool,
}

impl CountryReport {
    pub fn new(name: &'static str, description: &'static str, scope: Scope) -> Self {
        Self {
            name,
            description,
            usage: listing_usage(name, scope, false),
            scope,
            ranked: false,
        }
    }

    pub fn ranked(mut self) -> Self {
        self.ranked = true;
        self.usage = listing_usage(self.name, self.scope, true);
        self
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub(crate) fn sql(&self) -> String {
        let mut sql = String::from(
            "SELECT country.Code AS Code, country.Name AS Country, \
             CAST(country.Continent AS CHAR) AS Continent, country.Region AS Region, \
             country.Population AS Population FROM country",
        );
        if let Some(column) = self.scope.column() {
            sql.push_str(&format!(" WHERE {} = ?", column));
        }
        sql.push_str(" ORDER BY country.Population DESC");
        if self.ranked {
            sql.push_str(" LIMIT ?");
        }
        sql
    }

    fn layout(&self) -> (TableLayout, Vec<&'static str>) {
        if self.ranked {
            let mut labels = vec!["No."];
            labels.extend(LABELS);
            (TableLayout::parse(&format!("%-5d {}", COLUMNS)), labels)
        } else {
            (TableLayout::parse(COLUMNS), LABELS.to_vec())
        }
    }
}

#[async_trait]
impl Command<WorldConnection> for CountryReport {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn execute(
        &self,
        conn: &mut WorldConnection,
        args: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        let (value, count) = listing_args(args, self.scope, self.ranked, &self.usage)?;
        let sql = self.sql();
        debug!(report = self.name, ?value, ?count, "Running country report");

        let mut query = sqlx::query(&sql);
        if let Some(value) = &value {
            query = query.bind(value.as_str());
        }
        if let Some(count) = count {
            query = query.bind(count);
        }
        let rows = query.fetch_all(&mut **conn).await?;

        let mut cells = Vec::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            let mut line = Vec::with_capacity(6);
            if self.ranked {
                line.push(Cell::Int(position as i64 + 1));
            }
            line.push(Cell::Text(row.try_get("Code")?));
            line.push(Cell::Text(row.try_get("Country")?));
            line.push(Cell::Text(row.try_get("Continent")?));
            line.push(Cell::Text(row.try_get("Region")?));
            line.push(Cell::Int(row.try_get("Population")?));
            cells.push(line);
        }

        let place = self.scope.describe(value.as_deref());
        let title = match count {
            Some(count) => format!("Top {} Countries in {} by Population", count, place),
            None => format!("All Countries in {} by Population", place),
        };

        let (layout, labels) = self.layout();
        Table {
            title,
            layout,
            labels: &labels,
            empty: format!("No countries found in {}.", place),
        }
        .write(&cells, out)
    }
}
