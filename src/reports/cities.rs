//! City and capital city listings

use super::{listing_args, listing_usage, Scope, Table, WorldConnection};
use crate::core::{Cell, Command, Result, TableLayout};
use async_trait::async_trait;
use sqlx::Row;
use std::io::Write;
use tracing::debug;

/// Cities ordered by population, optionally limited to capitals or the top N
#[derive(Debug, Clone)]
pub struct CityReport {
    name: &'static str,
    description: &'static str,
    usage: String,
    scope: Scope,
    capitals: bool,
    ranked: bool,
}

impl CityReport {
    pub fn new(name: &'static str, description: &'static str, scope: Scope) -> Self {
        Self {
            name,
            description,
            usage: listing_usage(name, scope, false),
            scope,
            capitals: false,
            ranked: false,
        }
    }

    /// Only cities that are the capital of their country
    pub fn capitals(mut self) -> Self {
        self.capitals = true;
        self
    }

    /// Number the rows and stop after N of them
    pub fn ranked(mut self) -> Self {
        self.ranked = true;
        self.usage = listing_usage(self.name, self.scope, true);
        self
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub(crate) fn sql(&self) -> String {
        let join = if self.capitals {
            "country.Capital = city.ID"
        } else {
            "city.CountryCode = country.Code"
        };

        let mut sql = format!(
            "SELECT city.Name AS City, country.Name AS Country, city.District AS District, \
             city.Population AS Population \
             FROM city JOIN country ON {}",
            join
        );
        if let Some(column) = self.scope.column() {
            sql.push_str(&format!(" WHERE {} = ?", column));
        }
        sql.push_str(" ORDER BY city.Population DESC");
        if self.ranked {
            sql.push_str(" LIMIT ?");
        }
        sql
    }

    fn layout(&self) -> (TableLayout, Vec<&'static str>) {
        let mut spec = String::new();
        let mut labels = Vec::new();

        if self.ranked {
            spec.push_str("%-5d ");
            labels.push("No.");
        }
        if self.capitals {
            spec.push_str("%-35s %-30s %,15d");
            labels.extend(["Capital City", "Country", "Population"]);
        } else {
            spec.push_str("%-35s %-30s %-20s %,15d");
            labels.extend(["City", "Country", "District", "Population"]);
        }
        (TableLayout::parse(&spec), labels)
    }

    fn title(&self, value: Option<&str>, count: Option<u32>) -> String {
        let noun = if self.capitals { "Capital Cities" } else { "Cities" };
        let place = self.scope.describe(value);
        match count {
            Some(count) => format!("Top {} {} in {} by Population", count, noun, place),
            None => format!("All {} in {} by Population", noun, place),
        }
    }
}

#[async_trait]
impl Command<WorldConnection> for CityReport {
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
        debug!(report = self.name, ?value, ?count, "Running city report");

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
            let mut line = Vec::with_capacity(5);
            if self.ranked {
                line.push(Cell::Int(position as i64 + 1));
            }
            line.push(Cell::Text(row.try_get("City")?));
            line.push(Cell::Text(row.try_get("Country")?));
            if !self.capitals {
                line.push(Cell::Text(row.try_get("District")?));
            }
            line.push(Cell::Int(row.try_get("Population")?));
            cells.push(line);
        }

        let (layout, labels) = self.layout();
        let noun = if self.capitals { "capital cities" } else { "cities" };
        Table {
            title: self.title(value.as_deref(), count),
            layout,
            labels: &labels,
            empty: format!("No {} found in {}.", noun, self.scope.describe(value.as_deref())),
        }
        .write(&cells, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_listing_sql() {
        let report = CityReport::new("all-cities", "", Scope::World);
        assert_eq!(
            report.sql(),
            "SELECT city.Name AS City, country.Name AS Country, city.District AS District, \
             city.Population AS Population \
             FROM city JOIN country ON city.CountryCode = country.Code \
             ORDER BY city.Population DESC"
        );
    }

    #[test]
    fn test_scoped_top_capitals_sql() {
        let report = CityReport::new("top-capital-cities-region", "", Scope::Region)
            .capitals()
            .ranked();
        let sql = report.sql();

        assert!(sql.contains("JOIN country ON country.Capital = city.ID"));
        assert!(sql.contains("WHERE country.Region = ?"));
        assert!(sql.ends_with("ORDER BY city.Population DESC LIMIT ?"));
        assert_eq!(report.usage(), "Usage: top-capital-cities-region <region> <N>");
    }

    #[test]
    fn test_district_filter() {
        let report = CityReport::new("all-cities-district", "", Scope::District);
        assert!(report.sql().contains("WHERE city.District = ?"));
        assert!(!report.sql().contains("LIMIT"));
    }

    #[test]
    fn test_layout_columns() {
        let (layout, labels) = CityReport::new("topcities", "", Scope::World).ranked().layout();
        assert_eq!(labels, vec!["No.", "City", "Country", "District", "Population"]);
        assert_eq!(layout.columns().len(), labels.len());
        assert_eq!(layout.width(), 5 + 35 + 30 + 20 + 15 + 4);

        let (layout, labels) = CityReport::new("all-capitals", "", Scope::World).capitals().layout();
        assert_eq!(labels, vec!["Capital City", "Country", "Population"]);
        assert_eq!(layout.width(), 35 + 30 + 15 + 2);
    }

    #[test]
    fn test_titles() {
        let report = CityReport::new("top-cities-continent", "", Scope::Continent).ranked();
        assert_eq!(
            report.title(Some("Asia"), Some(3)),
            "Top 3 Cities in Asia by Population"
        );

        let report = CityReport::new("all-capitals", "", Scope::World).capitals();
        assert_eq!(
            report.title(None, None),
            "All Capital Cities in the World by Population"
        );
    }
}
