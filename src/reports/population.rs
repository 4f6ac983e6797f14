//! Population totals and urban/rural breakdowns
//!
//! Urban population is the sum of a country's city populations; rural is
//! whatever remains of the country total. City populations are summed per
//! country before joining, so a country total is never repeated per city.

use super::{args, Table, WorldConnection};
use crate::core::{Cell, Command, Result, TableLayout};
use async_trait::async_trait;
use sqlx::mysql::MySqlConnection;
use sqlx::Row;
use std::io::Write;
use tracing::debug;

const BREAKDOWN_COLUMNS: &str = "%-30s %,15d %,15d %,15d %8.2f %8.2f";

/// Which rows a breakdown groups and how the argument selects them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownScope {
    /// Every continent, no argument
    Continents,
    Continent,
    Region,
    /// Regions whose name contains the argument
    RegionMatching,
    Country,
}

impl BreakdownScope {
    fn label_column(&self) -> &'static str {
        match self {
            Self::Continents | Self::Continent => "CAST(country.Continent AS CHAR)",
            Self::Region | Self::RegionMatching => "country.Region",
            Self::Country => "country.Name",
        }
    }

    fn filter(&self) -> Option<&'static str> {
        match self {
            Self::Continents => None,
            Self::Continent => Some("country.Continent = ?"),
            Self::Region => Some("country.Region = ?"),
            Self::RegionMatching => Some("country.Region LIKE ?"),
            Self::Country => Some("country.Name = ?"),
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Self::Continents | Self::Continent => "Continent",
            Self::Region | Self::RegionMatching => "Region",
            Self::Country => "Country",
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            Self::Continents => "",
            Self::Continent => " <continent>",
            Self::Region | Self::RegionMatching => " <region>",
            Self::Country => " <country>",
        }
    }

    /// Value bound to the filter placeholder
    fn pattern(&self, value: &str) -> String {
        match self {
            Self::RegionMatching => format!("%{}%", value),
            _ => value.to_string(),
        }
    }
}

/// Total, urban and rural population of one group
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub label: String,
    pub total: i64,
    pub urban: i64,
}

impl Breakdown {
    pub fn rural(&self) -> i64 {
        self.total - self.urban
    }

    pub fn urban_percent(&self) -> f64 {
        percent(self.urban, self.total)
    }

    pub fn rural_percent(&self) -> f64 {
        percent(self.rural(), self.total)
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::from(&self.label),
            Cell::Int(self.total),
            Cell::Int(self.urban),
            Cell::Int(self.rural()),
            Cell::Float(self.urban_percent()),
            Cell::Float(self.rural_percent()),
        ]
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0
pub fn percent(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Urban/rural split of continents, regions or a country
#[derive(Debug, Clone)]
pub struct PopulationBreakdown {
    name: &'static str,
    description: &'static str,
    usage: String,
    scope: BreakdownScope,
}

impl PopulationBreakdown {
    pub fn new(name: &'static str, description: &'static str, scope: BreakdownScope) -> Self {
        Self {
            name,
            description,
            usage: format!("Usage: {}{}", name, scope.placeholder()),
            scope,
        }
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub(crate) fn sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} AS Label, \
             CAST(SUM(country.Population) AS SIGNED) AS Total, \
             CAST(COALESCE(SUM(urban.Population), 0) AS SIGNED) AS Urban \
             FROM country \
             LEFT JOIN (SELECT CountryCode, SUM(Population) AS Population \
             FROM city GROUP BY CountryCode) AS urban \
             ON urban.CountryCode = country.Code",
            self.scope.label_column()
        );
        if let Some(filter) = self.scope.filter() {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
        sql.push_str(" GROUP BY Label ORDER BY Total DESC");
        sql
    }
}

#[async_trait]
impl Command<WorldConnection> for PopulationBreakdown {
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
        let value = match self.scope {
            BreakdownScope::Continents => None,
            _ => Some(args::scope(args, &self.usage)?),
        };
        let sql = self.sql();
        debug!(report = self.name, ?value, "Running population breakdown");

        let mut query = sqlx::query(&sql);
        if let Some(value) = &value {
            query = query.bind(self.scope.pattern(value));
        }
        let rows = query.fetch_all(&mut **conn).await?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            let breakdown = Breakdown {
                label: row.try_get("Label")?,
                total: row.try_get::<Option<i64>, _>("Total")?.unwrap_or(0),
                urban: row.try_get("Urban")?,
            };
            cells.push(breakdown.cells());
        }

        let title = match &value {
            Some(value) => format!("Population of {} {}", self.scope.heading(), value),
            None => format!("Population by {}", self.scope.heading()),
        };
        let empty = match &value {
            Some(value) => format!(
                "No population data found for {}: {}",
                self.scope.heading().to_lowercase(),
                value
            ),
            None => "No population data found.".to_string(),
        };

        Table {
            title,
            layout: TableLayout::parse(BREAKDOWN_COLUMNS),
            labels: &[self.scope.heading(), "Total", "Urban", "Rural", "Urban %", "Rural %"],
            empty,
        }
        .write(&cells, out)
    }
}

/// What a [`PopulationTotal`] adds up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalScope {
    World,
    District,
    /// Every city with the given name
    City,
}

/// A single population figure for the world, a district or a city
#[derive(Debug, Clone)]
pub struct PopulationTotal {
    name: &'static str,
    description: &'static str,
    usage: String,
    scope: TotalScope,
}

impl PopulationTotal {
    pub fn new(name: &'static str, description: &'static str, scope: TotalScope) -> Self {
        let placeholder = match scope {
            TotalScope::World => "",
            TotalScope::District => " <district>",
            TotalScope::City => " <city>",
        };
        Self {
            name,
            description,
            usage: format!("Usage: {}{}", name, placeholder),
            scope,
        }
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    async fn write_world(&self, conn: &mut MySqlConnection, out: &mut (dyn Write + Send)) -> Result<()> {
        let total = world_population(conn).await?;
        let rows: Vec<Vec<Cell>> = total
            .into_iter()
            .map(|total| vec![Cell::from("World"), Cell::Int(total)])
            .collect();

        Table {
            title: "Total World Population".to_string(),
            layout: TableLayout::parse("%-30s %,20d"),
            labels: &["Scope", "Population"],
            empty: "No population data found.".to_string(),
        }
        .write(&rows, out)
    }

    async fn write_district(
        &self,
        conn: &mut MySqlConnection,
        district: &str,
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT CAST(SUM(Population) AS SIGNED) FROM city WHERE District = ?",
        )
        .bind(district)
        .fetch_one(conn)
        .await?;

        let rows: Vec<Vec<Cell>> = total
            .into_iter()
            .map(|total| vec![Cell::from(district), Cell::Int(total)])
            .collect();

        Table {
            title: format!("Population of District {}", district),
            layout: TableLayout::parse("%-30s %,20d"),
            labels: &["District", "Population"],
            empty: format!("No data found for district: {}", district),
        }
        .write(&rows, out)
    }

    async fn write_city(
        &self,
        conn: &mut MySqlConnection,
        city: &str,
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        let rows = sqlx::query(
            "SELECT city.Name AS City, country.Name AS Country, city.District AS District, \
             city.Population AS Population \
             FROM city JOIN country ON city.CountryCode = country.Code \
             WHERE city.Name = ? ORDER BY city.Population DESC",
        )
        .bind(city)
        .fetch_all(conn)
        .await?;

        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            cells.push(vec![
                Cell::Text(row.try_get("City")?),
                Cell::Text(row.try_get("Country")?),
                Cell::Text(row.try_get("District")?),
                Cell::Int(row.try_get("Population")?),
            ]);
        }

        Table {
            title: format!("Population of City {}", city),
            layout: TableLayout::parse("%-35s %-30s %-20s %,15d"),
            labels: &["City", "Country", "District", "Population"],
            empty: format!("No city found with the name: {}", city),
        }
        .write(&cells, out)
    }
}

#[async_trait]
impl Command<WorldConnection> for PopulationTotal {
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
        debug!(report = self.name, "Running population total");
        match self.scope {
            TotalScope::World => self.write_world(&mut **conn, out).await,
            TotalScope::District => {
                let district = args::scope(args, &self.usage)?;
                self.write_district(&mut **conn, &district, out).await
            }
            TotalScope::City => {
                let city = args::scope(args, &self.usage)?;
                self.write_city(&mut **conn, &city, out).await
            }
        }
    }
}

/// Sum of every country's population; `None` when the table is empty
pub async fn world_population(conn: &mut MySqlConnection) -> Result<Option<i64>> {
    let total: Option<i64> =
        sqlx::query_scalar("SELECT CAST(SUM(Population) AS SIGNED) FROM country")
            .fetch_one(conn)
            .await?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_arithmetic() {
        let breakdown = Breakdown {
            label: "Europe".to_string(),
            total: 1_000,
            urban: 250,
        };
        assert_eq!(breakdown.rural(), 750);
        assert!((breakdown.urban_percent() - 25.0).abs() < f64::EPSILON);
        assert!((breakdown.rural_percent() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_total_has_no_percentages() {
        let breakdown = Breakdown {
            label: "Antarctica".to_string(),
            total: 0,
            urban: 0,
        };
        assert_eq!(breakdown.urban_percent(), 0.0);
        assert_eq!(breakdown.rural_percent(), 0.0);
    }

    #[test]
    fn test_breakdown_row_rendering() {
        let breakdown = Breakdown {
            label: "Oceania".to_string(),
            total: 30_401_150,
            urban: 13_886_149,
        };
        let line = TableLayout::parse(BREAKDOWN_COLUMNS).row(&breakdown.cells());
        assert!(line.starts_with("Oceania "));
        assert!(line.contains("30,401,150"));
        assert!(line.contains("13,886,149"));
        assert!(line.contains("16,515,001"));
        assert!(line.ends_with("   45.68    54.32"));
    }

    #[test]
    fn test_breakdown_sql_counts_each_country_once() {
        let sql = PopulationBreakdown::new("population-continent", "", BreakdownScope::Continents).sql();
        assert!(sql.contains("FROM city GROUP BY CountryCode) AS urban"));
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("GROUP BY Label ORDER BY Total DESC"));
    }

    #[test]
    fn test_breakdown_filters() {
        let region = PopulationBreakdown::new("region-pop", "", BreakdownScope::RegionMatching);
        assert!(region.sql().contains("WHERE country.Region LIKE ?"));
        assert_eq!(BreakdownScope::RegionMatching.pattern("Europe"), "%Europe%");
        assert_eq!(BreakdownScope::Region.pattern("Western Europe"), "Western Europe");
        assert_eq!(region.usage(), "Usage: region-pop <region>");

        let country = PopulationBreakdown::new("countrypop", "", BreakdownScope::Country);
        assert!(country.sql().contains("SELECT country.Name AS Label"));
        assert!(country.sql().contains("WHERE country.Name = ?"));
    }

    #[test]
    fn test_total_usage() {
        assert_eq!(
            PopulationTotal::new("population-world", "", TotalScope::World).usage(),
            "Usage: population-world"
        );
        assert_eq!(
            PopulationTotal::new("citypop", "", TotalScope::City).usage(),
            "Usage: citypop <city>"
        );
    }
}
