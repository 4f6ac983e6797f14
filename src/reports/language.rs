//! Speakers of the major world languages

use super::population::{percent, world_population};
use super::{Table, WorldConnection};
use crate::core::{Cell, Command, Result, TableLayout};
use async_trait::async_trait;
use sqlx::Row;
use std::io::Write;
use tracing::debug;

/// Languages covered by the distribution report
pub const LANGUAGES: [&str; 5] = ["Chinese", "English", "Hindi", "Spanish", "Arabic"];

/// Estimated speakers of one language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub language: String,
    pub speakers: i64,
    /// Share of the world population, in percent
    pub percent: f64,
}

impl LanguageShare {
    pub fn new(language: impl Into<String>, speakers: i64, world: i64) -> Self {
        Self {
            language: language.into(),
            speakers,
            percent: percent(speakers, world),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LanguageDistribution {
    name: &'static str,
    description: &'static str,
}

impl LanguageDistribution {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }

    pub(crate) fn sql() -> String {
        let placeholders = vec!["?"; LANGUAGES.len()].join(", ");
        format!(
            "SELECT countrylanguage.Language AS Language, \
             CAST(ROUND(SUM(country.Population * countrylanguage.Percentage / 100)) AS SIGNED) AS Speakers \
             FROM countrylanguage JOIN country ON countrylanguage.CountryCode = country.Code \
             WHERE countrylanguage.Language IN ({}) \
             GROUP BY countrylanguage.Language ORDER BY Speakers DESC",
            placeholders
        )
    }
}

#[async_trait]
impl Command<WorldConnection> for LanguageDistribution {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn execute(
        &self,
        conn: &mut WorldConnection,
        _args: &[String],
        out: &mut (dyn Write + Send),
    ) -> Result<()> {
        let layout = TableLayout::parse("%-12s %,20d %,20.2f");
        let labels = ["Language", "Speakers", "% of World"];

        let world = world_population(&mut **conn).await?.unwrap_or(0);
        debug!(report = self.name, world, "Running language distribution");

        let mut shares = Vec::new();
        if world > 0 {
            let sql = Self::sql();
            let mut query = sqlx::query(&sql);
            for language in LANGUAGES {
                query = query.bind(language);
            }

            for row in query.fetch_all(&mut **conn).await? {
                let speakers: Option<i64> = row.try_get("Speakers")?;
                shares.push(LanguageShare::new(
                    row.try_get::<String, _>("Language")?,
                    speakers.unwrap_or(0),
                    world,
                ));
            }
        }

        let rows: Vec<Vec<Cell>> = shares
            .iter()
            .map(|share| {
                vec![
                    Cell::from(&share.language),
                    Cell::Int(share.speakers),
                    Cell::Float(share.percent),
                ]
            })
            .collect();

        Table {
            title: "Global Language Distribution".to_string(),
            layout,
            labels: &labels,
            empty: "No language data found.".to_string(),
        }
        .write(&rows, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_binds_every_language() {
        let sql = LanguageDistribution::sql();
        assert!(sql.contains("IN (?, ?, ?, ?, ?)"));
        assert!(sql.ends_with("ORDER BY Speakers DESC"));
    }

    #[test]
    fn test_share_percentage() {
        let share = LanguageShare::new("Chinese", 1_191_843_539, 6_078_749_450);
        assert!((share.percent - 19.606_8).abs() < 0.001);

        let row = TableLayout::parse("%-12s %,20d %,20.2f").row(&[
            Cell::from(&share.language),
            Cell::Int(share.speakers),
            Cell::Float(share.percent),
        ]);
        assert_eq!(
            row,
            "Chinese             1,191,843,539                19.61"
        );
    }

    #[test]
    fn test_share_without_world_population() {
        assert_eq!(LanguageShare::new("Arabic", 10, 0).percent, 0.0);
    }
}
