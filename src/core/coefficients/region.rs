use super::read_csv_rows;
use crate::errors::EstimationError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
pub enum ClimateZone {
    /// northern Taiwan
    N,
    /// central Taiwan
    C,
    /// southern Taiwan
    S,
}

/// County and town every cooling-degree-day ratio is taken relative to.
pub(crate) const CDD_BASE_TOWN: (&str, &str) = ("臺北市", "中正區");

/// Towns whose CDD ratios stand for the N, C and S benchmark columns respectively.
pub(crate) const CDD_REFERENCE_TOWN_CODES: [(u64, ClimateZone); 3] = [
    (63000050, ClimateZone::N),
    (66000050, ClimateZone::C),
    (64000090, ClimateZone::S),
];

type TownKey = (String, String);

fn town_key(county: &str, town: &str) -> TownKey {
    (county.to_string(), town.to_string())
}

#[derive(Clone, Debug)]
pub struct RegionTables {
    climate_zones: IndexMap<TownKey, ClimateZone>,
    urban_regions: IndexMap<TownKey, String>,
    cdd_by_town: IndexMap<TownKey, CoolingDegreeDays>,
}

#[derive(Clone, Debug, Deserialize)]
struct ClimateZoneRow {
    #[serde(rename = "COUNTYNAME")]
    county: String,
    #[serde(rename = "TOWNNAME")]
    town: String,
    #[serde(rename = "Climate_Zone")]
    climate_zone: ClimateZone,
}

#[derive(Clone, Debug, Deserialize)]
struct UrbanRegionRow {
    #[serde(rename = "COUNTYNAME")]
    county: String,
    #[serde(rename = "TOWNNAME")]
    town: String,
    #[serde(rename = "Urban_Region")]
    urban_region: String,
}

#[derive(Clone, Debug, Deserialize)]
struct CoolingDegreeDays {
    #[serde(rename = "TOWNCODE")]
    town_code: u64,
    #[serde(rename = "COUNTYNAME")]
    county: String,
    #[serde(rename = "TOWNNAME")]
    town: String,
    baseline: f64,
}

impl RegionTables {
    pub(crate) fn from_csv(
        climate_zone_csv: impl Read,
        urban_region_csv: impl Read,
        cdd_csv: impl Read,
    ) -> Result<Self, EstimationError> {
        let climate_zones = read_csv_rows::<ClimateZoneRow>(climate_zone_csv, "climate zone")?
            .into_iter()
            .map(|row| (town_key(&row.county, &row.town), row.climate_zone))
            .collect();
        let urban_regions = read_csv_rows::<UrbanRegionRow>(urban_region_csv, "urban region")?
            .into_iter()
            .map(|row| (town_key(&row.county, &row.town), row.urban_region))
            .collect();
        let cdd_by_town = read_csv_rows::<CoolingDegreeDays>(cdd_csv, "cooling degree day")?
            .into_iter()
            .map(|row| (town_key(&row.county, &row.town), row))
            .collect();

        Ok(Self {
            climate_zones,
            urban_regions,
            cdd_by_town,
        })
    }

    pub fn climate_zone(&self, county: &str, town: &str) -> Result<ClimateZone, EstimationError> {
        self.climate_zones
            .get(&town_key(county, town))
            .copied()
            .ok_or_else(|| {
                EstimationError::data(format!("Climate zone is not defined for {county}{town}."))
            })
    }

    /// Urban-region multiplier of a town: regions A, B and C map to 1.0, 0.95 and 0.8, anything
    /// else to 0.7.
    pub fn urban_region(&self, county: &str, town: &str) -> Result<f64, EstimationError> {
        let region = self
            .urban_regions
            .get(&town_key(county, town))
            .ok_or_else(|| {
                EstimationError::data(format!("Urban region is not defined for {county}{town}."))
            })?;

        Ok(match region.trim() {
            "A" => 1.0,
            "B" => 0.95,
            "C" => 0.8,
            _ => 0.7,
        })
    }

    fn cdd_base(&self) -> Result<f64, EstimationError> {
        let (county, town) = CDD_BASE_TOWN;
        self.cdd_by_town
            .get(&town_key(county, town))
            .map(|cdd| cdd.baseline)
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Cooling degree days are not defined for {county}{town}."
                ))
            })
    }

    /// Cooling degree days of a town relative to the base town.
    pub fn cdd_ratio(&self, county: &str, town: &str) -> Result<f64, EstimationError> {
        let cdd = self.cdd_by_town.get(&town_key(county, town)).ok_or_else(|| {
            EstimationError::data(format!("Cooling degree days are not defined for {county}{town}."))
        })?;

        Ok(cdd.baseline / self.cdd_base()?)
    }

    pub(crate) fn cdd_ratio_for_town_code(&self, town_code: u64) -> Result<f64, EstimationError> {
        let cdd = self
            .cdd_by_town
            .values()
            .find(|cdd| cdd.town_code == town_code)
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Cooling degree days are not defined for town code {town_code}."
                ))
            })?;

        Ok(cdd.baseline / self.cdd_base()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;
    use std::str::FromStr;

    #[fixture]
    fn tables() -> RegionTables {
        RegionTables::from_csv(
            Cursor::new(include_str!("./data/coef_climatezone.csv")),
            Cursor::new(include_str!("./data/coef_urbanregion.csv")),
            Cursor::new(include_str!("./data/climate_data_cdd_town.csv")),
        )
        .unwrap()
    }

    #[rstest]
    fn test_climate_zone(tables: RegionTables) {
        assert_eq!(tables.climate_zone("臺北市", "大安區").unwrap(), ClimateZone::N);
        assert_eq!(tables.climate_zone("臺中市", "西區").unwrap(), ClimateZone::C);
        assert_eq!(tables.climate_zone("高雄市", "苓雅區").unwrap(), ClimateZone::S);
    }

    #[rstest]
    fn test_unknown_town_is_a_data_error(tables: RegionTables) {
        assert!(tables.climate_zone("臺北市", "不存在區").unwrap_err().is_data());
        assert!(tables.urban_region("臺北市", "不存在區").unwrap_err().is_data());
    }

    #[rstest]
    #[case("臺北市", "大安區", 1.0)]
    #[case("新北市", "淡水區", 0.95)]
    #[case("屏東縣", "屏東市", 0.8)]
    #[case("臺東縣", "臺東市", 0.7)]
    fn test_urban_region(
        tables: RegionTables,
        #[case] county: &str,
        #[case] town: &str,
        #[case] expected: f64,
    ) {
        assert_eq!(tables.urban_region(county, town).unwrap(), expected);
    }

    #[rstest]
    fn test_cdd_ratio(tables: RegionTables) {
        assert_relative_eq!(tables.cdd_ratio("臺北市", "中正區").unwrap(), 1.0);
        assert_relative_eq!(tables.cdd_ratio("高雄市", "苓雅區").unwrap(), 1.4);
        assert_relative_eq!(tables.cdd_ratio_for_town_code(66000050).unwrap(), 1.15);
    }

    #[rstest]
    fn test_climate_zone_from_str() {
        assert_eq!(ClimateZone::from_str("S").unwrap(), ClimateZone::S);
        assert!(ClimateZone::from_str("X").is_err());
    }
}
