pub mod es_operation;
pub mod eui_benchmark;
pub mod facility_tables;
pub mod region;

use crate::core::location::TownBoundaries;
use crate::errors::EstimationError;
use anyhow::Context;
use es_operation::EsOperationTable;
use eui_benchmark::EuiBenchmarkTable;
use facility_tables::{FacilityTableSources, FacilityTables};
use lazy_static::lazy_static;
use region::RegionTables;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

/// Read-only coefficient and benchmark tables used by the whole estimation.
///
/// Tables are parsed once and shared; every building and facility is constructed against an
/// explicit reference to a provider, so tests and callers can swap the data set.
#[derive(Clone, Debug)]
pub struct CoefficientTables {
    pub es_operation: EsOperationTable,
    pub eui_min: EuiBenchmarkTable,
    pub eui_m: EuiBenchmarkTable,
    pub eui_max: EuiBenchmarkTable,
    pub regions: RegionTables,
    pub facilities: FacilityTables,
    pub town_boundaries: TownBoundaries,
}

/// Raw text of every table file, keyed by the file it is read from.
#[derive(Clone, Debug)]
pub struct TableSources {
    pub es_operation: String,
    pub eui_min: String,
    pub eui_m: String,
    pub eui_max: String,
    pub climate_zone: String,
    pub urban_region: String,
    pub cdd: String,
    pub facility_usage: String,
    pub elevator_energy: String,
    pub escalator_power: String,
    pub heater: String,
    pub heater_efficiency: String,
    pub water_consumption: String,
    pub town_boundaries: String,
}

pub const ES_OPERATION_FILE: &str = "coef_es_operation.csv";
pub const EUI_MIN_FILE: &str = "eui_criteria.min.csv";
pub const EUI_M_FILE: &str = "eui_criteria.m.csv";
pub const EUI_MAX_FILE: &str = "eui_criteria.max.csv";
pub const CLIMATE_ZONE_FILE: &str = "coef_climatezone.csv";
pub const URBAN_REGION_FILE: &str = "coef_urbanregion.csv";
pub const CDD_FILE: &str = "climate_data_cdd_town.csv";
pub const FACILITY_USAGE_FILE: &str = "coef_facility_usage_elevator_escalator.csv";
pub const ELEVATOR_ENERGY_FILE: &str = "coef_facility_ec_elevator.csv";
pub const ESCALATOR_POWER_FILE: &str = "coef_facility_power_escalator.csv";
pub const HEATER_FILE: &str = "coef_facility_heater.csv";
pub const HEATER_EFFICIENCY_FILE: &str = "coef_facility_eff_heater.csv";
pub const WATER_CONSUMPTION_FILE: &str = "water_consumption_coef.csv";
pub const TOWN_BOUNDARIES_FILE: &str = "town_boundaries.json";

impl TableSources {
    /// Text of the sample tables under `data/`.
    pub fn bundled() -> Self {
        Self {
            es_operation: include_str!("./data/coef_es_operation.csv").to_string(),
            eui_min: include_str!("./data/eui_criteria.min.csv").to_string(),
            eui_m: include_str!("./data/eui_criteria.m.csv").to_string(),
            eui_max: include_str!("./data/eui_criteria.max.csv").to_string(),
            climate_zone: include_str!("./data/coef_climatezone.csv").to_string(),
            urban_region: include_str!("./data/coef_urbanregion.csv").to_string(),
            cdd: include_str!("./data/climate_data_cdd_town.csv").to_string(),
            facility_usage: include_str!("./data/coef_facility_usage_elevator_escalator.csv")
                .to_string(),
            elevator_energy: include_str!("./data/coef_facility_ec_elevator.csv").to_string(),
            escalator_power: include_str!("./data/coef_facility_power_escalator.csv").to_string(),
            heater: include_str!("./data/coef_facility_heater.csv").to_string(),
            heater_efficiency: include_str!("./data/coef_facility_eff_heater.csv").to_string(),
            water_consumption: include_str!("./data/water_consumption_coef.csv").to_string(),
            town_boundaries: include_str!("./data/town_boundaries.json").to_string(),
        }
    }

    /// Read every table from a directory holding files named like the bundled ones.
    pub fn from_directory(directory: impl AsRef<Path>) -> anyhow::Result<Self> {
        let directory = directory.as_ref();
        let read = |file_name: &str| {
            fs::read_to_string(directory.join(file_name)).with_context(|| {
                format!(
                    "Could not read coefficient table {}",
                    directory.join(file_name).display()
                )
            })
        };

        Ok(Self {
            es_operation: read(ES_OPERATION_FILE)?,
            eui_min: read(EUI_MIN_FILE)?,
            eui_m: read(EUI_M_FILE)?,
            eui_max: read(EUI_MAX_FILE)?,
            climate_zone: read(CLIMATE_ZONE_FILE)?,
            urban_region: read(URBAN_REGION_FILE)?,
            cdd: read(CDD_FILE)?,
            facility_usage: read(FACILITY_USAGE_FILE)?,
            elevator_energy: read(ELEVATOR_ENERGY_FILE)?,
            escalator_power: read(ESCALATOR_POWER_FILE)?,
            heater: read(HEATER_FILE)?,
            heater_efficiency: read(HEATER_EFFICIENCY_FILE)?,
            water_consumption: read(WATER_CONSUMPTION_FILE)?,
            town_boundaries: read(TOWN_BOUNDARIES_FILE)?,
        })
    }
}

lazy_static! {
    static ref BUNDLED_TABLES: Arc<CoefficientTables> = Arc::new(
        CoefficientTables::from_sources(&TableSources::bundled())
            .expect("Reading the bundled coefficient tables failed.")
    );
}

impl CoefficientTables {
    /// The sample tables shipped with the crate, parsed on first use.
    ///
    /// They cover a subset of towns with simplified boundaries and a subset of section types,
    /// enough for the demos and tests. Published tables are loaded with
    /// [`CoefficientTables::from_directory`] (`--tables-dir` on the command line).
    pub fn bundled() -> Arc<Self> {
        BUNDLED_TABLES.clone()
    }

    pub fn from_directory(directory: impl AsRef<Path>) -> anyhow::Result<Arc<Self>> {
        let sources = TableSources::from_directory(directory)?;
        Ok(Arc::new(Self::from_sources(&sources)?))
    }

    pub fn from_sources(sources: &TableSources) -> Result<Self, EstimationError> {
        Ok(Self {
            es_operation: EsOperationTable::from_csv(text(&sources.es_operation))?,
            eui_min: EuiBenchmarkTable::from_csv(text(&sources.eui_min), "min")?,
            eui_m: EuiBenchmarkTable::from_csv(text(&sources.eui_m), "m")?,
            eui_max: EuiBenchmarkTable::from_csv(text(&sources.eui_max), "max")?,
            regions: RegionTables::from_csv(
                text(&sources.climate_zone),
                text(&sources.urban_region),
                text(&sources.cdd),
            )?,
            facilities: FacilityTables::from_csv(FacilityTableSources {
                usage_ratios: text(&sources.facility_usage),
                elevator_energy: text(&sources.elevator_energy),
                escalator_power: text(&sources.escalator_power),
                heaters: text(&sources.heater),
                heater_efficiencies: text(&sources.heater_efficiency),
                water_consumption: text(&sources.water_consumption),
            })?,
            town_boundaries: TownBoundaries::from_json(text(&sources.town_boundaries))?,
        })
    }
}

fn text(source: &str) -> Cursor<&[u8]> {
    Cursor::new(source.as_bytes())
}

/// Section id of a table label such as `"B2. 一般商場"`, i.e. the text before the first `". "`.
pub(crate) fn section_id_from_label(label: &str) -> &str {
    label
        .split_once(". ")
        .map_or(label, |(section_id, _)| section_id)
        .trim()
}

pub(crate) fn read_csv_rows<T: DeserializeOwned>(
    csv: impl Read,
    table_name: &str,
) -> Result<Vec<T>, EstimationError> {
    csv::Reader::from_reader(csv)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|err| EstimationError::data(format!("Could not read {table_name} table: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("B2. 一般商場", "B2")]
    #[case("N1-1-1. 電腦機房", "N1-1-1")]
    #[case("1. 地下停車場", "1")]
    #[case("H10", "H10")]
    fn test_section_id_from_label(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(section_id_from_label(label), expected);
    }

    #[rstest]
    fn test_bundled_tables_are_shared() {
        let first = CoefficientTables::bundled();
        let second = CoefficientTables::bundled();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[rstest]
    fn test_every_benchmark_section_has_an_operating_schedule() {
        let tables = CoefficientTables::bundled();
        for section_id in tables.eui_m.section_ids() {
            assert!(
                tables.es_operation.contains_section(section_id),
                "{section_id} has no operating schedule"
            );
        }
    }

    #[rstest]
    fn test_tables_load_from_a_directory() {
        let bundled = CoefficientTables::bundled();
        let loaded = CoefficientTables::from_directory("./src/core/coefficients/data").unwrap();

        assert!(!Arc::ptr_eq(&bundled, &loaded));
        assert_eq!(
            loaded.es_operation.operating_hours("B2", 1).unwrap(),
            bundled.es_operation.operating_hours("B2", 1).unwrap()
        );
        assert_eq!(
            loaded.regions.climate_zone("臺北市", "大安區").unwrap(),
            bundled.regions.climate_zone("臺北市", "大安區").unwrap()
        );
        assert_eq!(
            loaded.town_boundaries.locate(121.538, 25.028).unwrap(),
            bundled.town_boundaries.locate(121.538, 25.028).unwrap()
        );
    }

    #[rstest]
    fn test_missing_table_directory() {
        assert!(TableSources::from_directory("/nonexistent/tables").is_err());
    }
}
