//! The built-in report table and catalog assembly
//!
//! One table feeds all three discovery modes: the explicit constructor
//! list, the `reports` module tree, and the type table manifests are
//! resolved against.

use super::{
    BreakdownScope, CityReport, CountryReport, LanguageDistribution, PopulationBreakdown,
    PopulationTotal, Scope, TotalScope, WorldConnection,
};
use crate::core::discovery::parse_manifest;
use crate::core::{
    discover_all, discover_explicit, Archive, Command, CommandCatalog, Constructor, DiscoveryMode,
    DiscoveryResult, ModuleTree, SkippedUnit, Unit,
};
use std::path::Path;
use tracing::{info, warn};

/// Entry list shipped with the binary, used when no manifest file is configured
pub const BUNDLED_MANIFEST: &str = include_str!("commands.manifest");

fn unit<C, F>(path: &str, build: F) -> Unit<WorldConnection>
where
    C: Command<WorldConnection> + 'static,
    F: Fn() -> C + Send + Sync + 'static,
{
    Unit::concrete(path, move || {
        Ok(Box::new(build()) as Box<dyn Command<WorldConnection>>)
    })
}

fn city_units() -> Vec<Unit<WorldConnection>> {
    vec![
        unit("AllCities", || {
            CityReport::new(
                "all-cities",
                "Display all cities in the world sorted by population (usage: all-cities)",
                Scope::World,
            )
        }),
        unit("CitiesInCountry", || {
            CityReport::new(
                "cities-country",
                "Display all cities in a country ordered by population (usage: cities-country <country>)",
                Scope::Country,
            )
        }),
        unit("CitiesInContinent", || {
            CityReport::new(
                "all-cities-continent",
                "Display all cities in a continent sorted by population (usage: all-cities-continent <continent>)",
                Scope::Continent,
            )
        }),
        unit("CitiesInRegion", || {
            CityReport::new(
                "all-cities-region",
                "Display all cities in a region sorted by population (usage: all-cities-region <region>)",
                Scope::Region,
            )
        }),
        unit("CitiesInDistrict", || {
            CityReport::new(
                "all-cities-district",
                "Display all cities in a district sorted by population (usage: all-cities-district <district>)",
                Scope::District,
            )
        }),
        unit("TopCities", || {
            CityReport::new(
                "topcities",
                "Display the top N cities in the world by population (usage: topcities [N])",
                Scope::World,
            )
            .ranked()
        }),
        unit("TopCitiesInCountry", || {
            CityReport::new(
                "top-cities-country",
                "Display the top N cities in a country by population (usage: top-cities-country <country> <N>)",
                Scope::Country,
            )
            .ranked()
        }),
        unit("TopCitiesInContinent", || {
            CityReport::new(
                "top-cities-continent",
                "Display the top N cities in a continent by population (usage: top-cities-continent <continent> <N>)",
                Scope::Continent,
            )
            .ranked()
        }),
        unit("TopCitiesInRegion", || {
            CityReport::new(
                "top-cities-region",
                "Display the top N cities in a region by population (usage: top-cities-region <region> <N>)",
                Scope::Region,
            )
            .ranked()
        }),
        unit("TopCitiesInDistrict", || {
            CityReport::new(
                "topcities-district",
                "Display the top N cities in a district by population (usage: topcities-district <district> <N>)",
                Scope::District,
            )
            .ranked()
        }),
        unit("AllCapitals", || {
            CityReport::new(
                "all-capitals",
                "Display all capital cities in the world sorted by population (usage: all-capitals)",
                Scope::World,
            )
            .capitals()
        }),
        unit("CapitalsInContinent", || {
            CityReport::new(
                "capital-cities-continent",
                "Display all capital cities in a continent sorted by population (usage: capital-cities-continent <continent>)",
                Scope::Continent,
            )
            .capitals()
        }),
        unit("CapitalsInRegion", || {
            CityReport::new(
                "capital-cities-region",
                "Display all capital cities in a region sorted by population (usage: capital-cities-region <region>)",
                Scope::Region,
            )
            .capitals()
        }),
        unit("TopCapitals", || {
            CityReport::new(
                "topcapitals",
                "Display the top N capital cities in the world by population (usage: topcapitals [N])",
                Scope::World,
            )
            .capitals()
            .ranked()
        }),
        unit("TopCapitalsInContinent", || {
            CityReport::new(
                "top-capital-cities-continent",
                "Display the top N capital cities in a continent by population (usage: top-capital-cities-continent <continent> <N>)",
                Scope::Continent,
            )
            .capitals()
            .ranked()
        }),
        unit("TopCapitalsInRegion", || {
            CityReport::new(
                "top-capital-cities-region",
                "Display the top N capital cities in a region by population (usage: top-capital-cities-region <region> <N>)",
                Scope::Region,
            )
            .capitals()
            .ranked()
        }),
    ]
}

fn country_units() -> Vec<Unit<WorldConnection>> {
    vec![
        unit("AllCountries", || {
            CountryReport::new(
                "all-countries",
                "Display all countries in the world sorted by population (usage: all-countries)",
                Scope::World,
            )
        }),
        unit("CountriesInContinent", || {
            CountryReport::new(
                "all-countries-continent",
                "Display all countries in a continent sorted by population (usage: all-countries-continent <continent>)",
                Scope::Continent,
            )
        }),
        unit("CountriesInRegion", || {
            CountryReport::new(
                "all-countries-region",
                "Display all countries in a region sorted by population (usage: all-countries-region <region>)",
                Scope::Region,
            )
        }),
        unit("TopCountries", || {
            CountryReport::new(
                "top-countries",
                "Display the top N countries in the world by population (usage: top-countries [N])",
                Scope::World,
            )
            .ranked()
        }),
        unit("TopCountriesInContinent", || {
            CountryReport::new(
                "top-countries-continent",
                "Display the top N countries in a continent by population (usage: top-countries-continent <continent> <N>)",
                Scope::Continent,
            )
            .ranked()
        }),
        unit("TopCountriesInRegion", || {
            CountryReport::new(
                "top-countries-region",
                "Display the top N countries in a region by population (usage: top-countries-region <region> <N>)",
                Scope::Region,
            )
            .ranked()
        }),
    ]
}

fn population_units() -> Vec<Unit<WorldConnection>> {
    vec![
        unit("PopulationByContinent", || {
            PopulationBreakdown::new(
                "population-continent",
                "Display total, urban and rural population of every continent (usage: population-continent)",
                BreakdownScope::Continents,
            )
        }),
        unit("ContinentPopulation", || {
            PopulationBreakdown::new(
                "continent-pop",
                "Display total, urban and rural population of a continent (usage: continent-pop <continent>)",
                BreakdownScope::Continent,
            )
        }),
        unit("RegionPopulation", || {
            PopulationBreakdown::new(
                "population-region",
                "Display total, urban and rural population of a region (usage: population-region <region>)",
                BreakdownScope::Region,
            )
        }),
        unit("RegionPopulationMatching", || {
            PopulationBreakdown::new(
                "region-pop",
                "Display population details of every region matching a name (usage: region-pop <region>)",
                BreakdownScope::RegionMatching,
            )
        }),
        unit("CountryPopulation", || {
            PopulationBreakdown::new(
                "countrypop",
                "Display the population of a country (usage: countrypop <country>)",
                BreakdownScope::Country,
            )
        }),
        unit("CountryPopulationDetails", || {
            PopulationBreakdown::new(
                "populationdetailscountry",
                "Display population details of a country (usage: populationdetailscountry <country>)",
                BreakdownScope::Country,
            )
        }),
        unit("WorldPopulation", || {
            PopulationTotal::new(
                "population-world",
                "Display the total population of the world (usage: population-world)",
                TotalScope::World,
            )
        }),
        unit("DistrictPopulation", || {
            PopulationTotal::new(
                "districtpop",
                "Display the population of a district (usage: districtpop <district>)",
                TotalScope::District,
            )
        }),
        unit("CityPopulation", || {
            PopulationTotal::new(
                "citypop",
                "Display the population of a city (usage: citypop <city>)",
                TotalScope::City,
            )
        }),
    ]
}

fn language_units() -> Vec<Unit<WorldConnection>> {
    vec![unit("LanguageDistribution", || {
        LanguageDistribution::new(
            "language-dist",
            "Display speakers of Chinese, English, Hindi, Spanish and Arabic and their share of the world population",
        )
    })]
}

/// `reports::{city, country, population, language}`
pub fn module_tree() -> ModuleTree<WorldConnection> {
    ModuleTree::new("reports")
        .with_child(ModuleTree::new("city").with_units(city_units()))
        .with_child(ModuleTree::new("country").with_units(country_units()))
        .with_child(ModuleTree::new("population").with_units(population_units()))
        .with_child(ModuleTree::new("language").with_units(language_units()))
}

/// Every built-in report with its fully qualified path
pub fn type_table() -> Vec<Unit<WorldConnection>> {
    module_tree().flatten()
}

/// Constructors in registration order
pub fn builtin_constructors() -> Vec<Constructor<WorldConnection>> {
    type_table().iter().filter_map(Unit::constructor).collect()
}

/// Populate a catalog the way `mode` prescribes.
///
/// Never fails: reports that cannot be constructed and a configured
/// manifest that cannot be read are logged and skipped, so the catalog may
/// be partial or empty.
pub fn build_catalog(
    mode: DiscoveryMode,
    namespace: &str,
    manifest: Option<&Path>,
) -> CommandCatalog<WorldConnection> {
    let result: DiscoveryResult<WorldConnection> = match mode {
        DiscoveryMode::Explicit => discover_explicit(&builtin_constructors()),
        DiscoveryMode::Scan => discover_all(&module_tree(), namespace),
        DiscoveryMode::Manifest => match manifest {
            Some(path) => match Archive::from_manifest(path, type_table()) {
                Ok(archive) => discover_all(&archive, namespace),
                Err(e) => {
                    warn!(manifest = %path.display(), error = %e, "Error reading manifest file");
                    DiscoveryResult {
                        skipped: vec![SkippedUnit {
                            path: path.display().to_string(),
                            reason: e.to_string(),
                        }],
                        ..DiscoveryResult::default()
                    }
                }
            },
            None => discover_all(
                &Archive::new(parse_manifest(BUNDLED_MANIFEST), type_table()),
                namespace,
            ),
        },
    };

    for skipped in &result.skipped {
        warn!(unit = %skipped.path, reason = %skipped.reason, "Report not registered");
    }

    let mut catalog = CommandCatalog::new();
    let registered = result.register_into(&mut catalog);
    info!(?mode, registered, "Report catalog ready");
    catalog
}
