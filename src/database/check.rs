//! Startup connectivity check (`--test-db`)

use crate::core::layout::group_thousands;
use crate::core::Result;
use crate::database::DatabaseConfig;
use sqlx::mysql::MySqlPool;
use sqlx::Row;
use std::io::Write;
use tracing::{error, info};

/// What the check learned about the server and the schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub server_version: String,
    /// `(table, approximate row count)` in name order
    pub tables: Vec<(String, i64)>,
    /// `(country, continent, population)` for the most populated countries
    pub top_countries: Vec<(String, String, i64)>,
}

impl ConnectivityReport {
    /// The schema is usable only when it holds at least one table
    pub fn passed(&self) -> bool {
        !self.tables.is_empty()
    }

    pub fn write_to<W: Write + ?Sized>(&self, config: &DatabaseConfig, out: &mut W) -> Result<()> {
        writeln!(out, "Database connection established.")?;
        writeln!(out)?;
        writeln!(out, "Server version : {}", self.server_version)?;
        writeln!(out, "Connection URL : {}", config.display_url())?;
        writeln!(out, "Username       : {}", config.user)?;
        writeln!(
            out,
            "Tables found in '{}' database: {}",
            config.name,
            self.tables.len()
        )?;

        if !self.passed() {
            writeln!(out, "Warning: no tables found in '{}' database", config.name)?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "Tables:")?;
        for (table, rows) in &self.tables {
            writeln!(out, "  - {} ({} rows)", table, rows)?;
        }

        writeln!(out)?;
        writeln!(out, "Top {} countries by population:", self.top_countries.len())?;
        for (name, continent, population) in &self.top_countries {
            writeln!(
                out,
                "  {} ({}) - {} people",
                name,
                continent,
                group_thousands(*population)
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Connectivity check completed successfully.")?;
        Ok(())
    }
}

/// Query server metadata, the schema's tables and a sample of country data
pub async fn inspect(pool: &MySqlPool, schema: &str) -> Result<ConnectivityReport> {
    let mut conn = pool.acquire().await?;

    let server_version: String = sqlx::query_scalar("SELECT VERSION()")
        .fetch_one(&mut *conn)
        .await?;

    let rows = sqlx::query(
        "SELECT CAST(table_name AS CHAR) AS name, \
                CAST(COALESCE(table_rows, 0) AS SIGNED) AS row_count \
         FROM information_schema.tables \
         WHERE table_schema = ? \
         ORDER BY table_name",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        tables.push((row.try_get::<String, _>("name")?, row.try_get::<i64, _>("row_count")?));
    }

    let mut top_countries = Vec::new();
    if !tables.is_empty() {
        let rows = sqlx::query(
            "SELECT Name, CAST(Continent AS CHAR) AS Continent, Population \
             FROM country ORDER BY Population DESC LIMIT 5",
        )
        .fetch_all(&mut *conn)
        .await?;

        for row in &rows {
            top_countries.push((
                row.try_get::<String, _>("Name")?,
                row.try_get::<String, _>("Continent")?,
                row.try_get::<i64, _>("Population")?,
            ));
        }
    }

    Ok(ConnectivityReport {
        server_version,
        tables,
        top_countries,
    })
}

/// Run the check and print its findings; returns whether it passed
pub async fn check_connectivity<W: Write + ?Sized>(
    pool: &MySqlPool,
    config: &DatabaseConfig,
    out: &mut W,
) -> Result<bool> {
    match inspect(pool, &config.name).await {
        Ok(report) => {
            report.write_to(config, out)?;
            info!(tables = report.tables.len(), "Connectivity check finished");
            Ok(report.passed())
        }
        Err(e) => {
            error!("Connectivity check failed: {}", e);
            writeln!(out, "Database connection failed: {}", e)?;
            writeln!(out, "Connection URL : {}", config.display_url())?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectivityReport {
        ConnectivityReport {
            server_version: "8.0.36".to_string(),
            tables: vec![
                ("city".to_string(), 4079),
                ("country".to_string(), 239),
                ("countrylanguage".to_string(), 984),
            ],
            top_countries: vec![
                ("China".to_string(), "Asia".to_string(), 1_277_558_000),
                ("India".to_string(), "Asia".to_string(), 1_013_662_000),
            ],
        }
    }

    #[test]
    fn test_report_output() {
        let mut out = Vec::new();
        sample().write_to(&DatabaseConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Server version : 8.0.36"));
        assert!(text.contains("Tables found in 'world' database: 3"));
        assert!(text.contains("  - countrylanguage (984 rows)"));
        assert!(text.contains("  China (Asia) - 1,277,558,000 people"));
        assert!(text.ends_with("Connectivity check completed successfully.\n"));
        assert!(!text.contains("devpass"));
    }

    #[test]
    fn test_empty_schema_fails() {
        let report = ConnectivityReport {
            server_version: "8.0.36".to_string(),
            ..Default::default()
        };
        assert!(!report.passed());

        let mut out = Vec::new();
        report.write_to(&DatabaseConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Warning: no tables found in 'world' database"));
        assert!(!text.contains("completed successfully"));
    }
}
