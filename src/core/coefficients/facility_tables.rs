use super::read_csv_rows;
use crate::errors::EstimationError;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use std::io::Read;
use strum_macros::{Display, EnumString};

/// Facility coefficient tables: elevator and escalator usage ratios, elevator energy use,
/// escalator power, water heater emission and efficiency factors, and non-residential water
/// use coefficients.
#[derive(Clone, Debug)]
pub struct FacilityTables {
    usage_ratios: IndexMap<String, TransportUsageRatio>,
    elevator_energy: Vec<ElevatorEnergyRow>,
    escalator_power: Vec<EscalatorPowerRow>,
    heaters: IndexMap<String, HeaterEmissionRow>,
    heater_efficiencies: IndexMap<String, f64>,
    water_consumption: IndexMap<String, WaterConsumptionRow>,
}

#[derive(Clone, Debug, Deserialize)]
struct TransportUsageRatio {
    #[serde(rename = "Section_ID")]
    section_id: String,
    #[serde(rename = "Or")]
    elevator: Option<f64>,
    #[serde(rename = "Osr")]
    escalator: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
struct ElevatorEnergyRow {
    #[serde(rename = "Stories_min")]
    stories_min: f64,
    #[serde(rename = "Stories_max")]
    stories_max: f64,
    #[serde(rename = "n_People")]
    n_people: f64,
    #[serde(rename = "n_Load")]
    n_load: f64,
    #[serde(rename = "Speed")]
    speed: f64,
    #[serde(rename = "FLE")]
    fle: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct EscalatorPowerRow {
    #[serde(rename = "Elevate_min")]
    elevate_min: f64,
    #[serde(rename = "Elevate_max")]
    elevate_max: f64,
    #[serde(rename = "Width")]
    width: f64,
    #[serde(rename = "Power")]
    power: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, PartialEq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HeaterFuel {
    Electricity,
    Gas,
}

#[derive(Clone, Debug, Deserialize)]
struct HeaterEmissionRow {
    #[serde(rename = "Type")]
    heater_type: String,
    #[serde(rename = "Fuel")]
    fuel: HeaterFuel,
    #[serde(rename = "YCE")]
    yce: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct HeaterEfficiencyRow {
    #[serde(rename = "Energy_Rating")]
    energy_rating: String,
    #[serde(rename = "Coef_Eff")]
    coef_eff: f64,
}

#[derive(Clone, Debug, Deserialize)]
struct WaterConsumptionRow {
    #[serde(rename = "Section_Type")]
    section_type: String,
    #[serde(rename = "Coef_Effective_Area")]
    coef_effective_area: Option<f64>,
    #[serde(rename = "Coef_People_Density")]
    coef_people_density: Option<f64>,
    #[serde(rename = "Qdp")]
    qdp: Option<f64>,
}

/// Water use coefficients of a non-residential section type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterConsumptionCoefficients {
    /// share of the floor area in use, as a fraction
    pub coef_effective_a: f64,
    /// people per m2
    pub coef_people_density: f64,
    /// water use per person per day
    pub coef_water_density: f64,
}

const DEFAULT_EFFECTIVE_AREA_PERCENT: f64 = 50.;
const DEFAULT_PEOPLE_DENSITY: f64 = 0.2;
const DEFAULT_WATER_DENSITY: f64 = 0.1;

// weights of the squared differences in rated people, load and speed
const ELEVATOR_MATCH_WEIGHTS: (f64, f64, f64) = (1., 1e-2, 0.5);

pub(crate) struct FacilityTableSources<R: Read> {
    pub usage_ratios: R,
    pub elevator_energy: R,
    pub escalator_power: R,
    pub heaters: R,
    pub heater_efficiencies: R,
    pub water_consumption: R,
}

impl FacilityTables {
    pub(crate) fn from_csv<R: Read>(sources: FacilityTableSources<R>) -> Result<Self, EstimationError> {
        Ok(Self {
            usage_ratios: read_csv_rows::<TransportUsageRatio>(
                sources.usage_ratios,
                "elevator and escalator usage",
            )?
            .into_iter()
            .map(|row| (row.section_id.trim().to_string(), row))
            .collect(),
            elevator_energy: read_csv_rows(sources.elevator_energy, "elevator energy")?,
            escalator_power: read_csv_rows(sources.escalator_power, "escalator power")?,
            heaters: read_csv_rows::<HeaterEmissionRow>(sources.heaters, "heater emission")?
                .into_iter()
                .map(|row| (row.heater_type.trim().to_string(), row))
                .collect(),
            heater_efficiencies: read_csv_rows::<HeaterEfficiencyRow>(
                sources.heater_efficiencies,
                "heater efficiency",
            )?
            .into_iter()
            .map(|row| (row.energy_rating.trim().to_lowercase(), row.coef_eff))
            .collect(),
            water_consumption: read_csv_rows::<WaterConsumptionRow>(
                sources.water_consumption,
                "water consumption",
            )?
            .into_iter()
            .map(|row| (row.section_type.trim().to_string(), row))
            .collect(),
        })
    }

    fn usage_ratio_row(&self, building_type: &str) -> Result<&TransportUsageRatio, EstimationError> {
        self.usage_ratios.get(building_type).ok_or_else(|| {
            EstimationError::data(format!(
                "Usage ratio of elevators and escalators is not defined for building type {building_type}."
            ))
        })
    }

    /// Or, usage ratio of elevators for a building type
    pub fn elevator_usage_ratio(&self, building_type: &str) -> Result<f64, EstimationError> {
        self.usage_ratio_row(building_type)?
            .elevator
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Or is not defined for building type {building_type}."
                ))
            })
    }

    /// Osr, usage ratio of escalators for a building type
    pub fn escalator_usage_ratio(&self, building_type: &str) -> Result<f64, EstimationError> {
        self.usage_ratio_row(building_type)?
            .escalator
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Osr is not defined for building type {building_type}."
                ))
            })
    }

    /// FLE, hourly energy use of an elevator.
    ///
    /// Among the rows whose story range contains `n_stories`, the row nearest to the rated
    /// people, load and speed is chosen. The first of equally near rows wins.
    pub fn elevator_energy(
        &self,
        n_stories: f64,
        n_people: f64,
        n_load: f64,
        speed: f64,
    ) -> Result<f64, EstimationError> {
        let (people_weight, load_weight, speed_weight) = ELEVATOR_MATCH_WEIGHTS;

        self.elevator_energy
            .iter()
            .filter(|row| row.stories_min <= n_stories && row.stories_max >= n_stories)
            .map(|row| {
                let key = people_weight * (row.n_people - n_people).powi(2)
                    + load_weight * (row.n_load - n_load).powi(2)
                    + speed_weight * (row.speed - speed).powi(2);
                (OrderedFloat(key), row.fle)
            })
            .fold(None, |nearest: Option<(OrderedFloat<f64>, f64)>, candidate| {
                match nearest {
                    Some(nearest) if nearest.0 <= candidate.0 => Some(nearest),
                    _ => Some(candidate),
                }
            })
            .map(|(_, fle)| fle)
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "FLE is not defined for an elevator travelling {n_stories} stories."
                ))
            })
    }

    /// Rated power of an escalator. Rows cover `Elevate_min <= height < Elevate_max`; within
    /// those, the row with the nearest width is chosen.
    pub fn escalator_power(&self, elevate_height: f64, width: f64) -> Result<f64, EstimationError> {
        self.escalator_power
            .iter()
            .filter(|row| row.elevate_min <= elevate_height && row.elevate_max > elevate_height)
            // closest width either side, not the narrowest row; the first row wins a tie
            .fold(None, |nearest: Option<&EscalatorPowerRow>, row| match nearest {
                Some(nearest) if (nearest.width - width).abs() <= (row.width - width).abs() => {
                    Some(nearest)
                }
                _ => Some(row),
            })
            .map(|row| row.power)
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Power is not defined for an escalator elevating {elevate_height} m."
                ))
            })
    }

    /// Fuel and YCE (yearly emission coefficient before the fuel multiplier) of a heater type.
    pub fn heater_emission(&self, heater_type: &str) -> Result<(HeaterFuel, f64), EstimationError> {
        self.heaters
            .get(heater_type)
            .map(|row| (row.fuel, row.yce))
            .ok_or_else(|| {
                EstimationError::data(format!("YCE is not defined for heater type {heater_type}."))
            })
    }

    pub fn heater_efficiency(&self, energy_rating: &str) -> Result<f64, EstimationError> {
        self.heater_efficiencies
            .get(&energy_rating.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                EstimationError::data(format!(
                    "Efficiency is not defined for heater energy rating {energy_rating}."
                ))
            })
    }

    /// Water use coefficients of a non-residential section type, with empty cells falling back
    /// to 50% effective area, 0.2 people/m2 and 0.1 per person-day.
    pub fn water_consumption(
        &self,
        section_type: &str,
    ) -> Result<WaterConsumptionCoefficients, EstimationError> {
        let row = self.water_consumption.get(section_type).ok_or_else(|| {
            EstimationError::data(format!(
                "Water consumption coefficients are not defined for section type {section_type}."
            ))
        })?;

        let present = |value: Option<f64>| value.filter(|value| !value.is_nan());

        Ok(WaterConsumptionCoefficients {
            coef_effective_a: present(row.coef_effective_area)
                .unwrap_or(DEFAULT_EFFECTIVE_AREA_PERCENT)
                / 100.,
            coef_people_density: present(row.coef_people_density)
                .unwrap_or(DEFAULT_PEOPLE_DENSITY),
            coef_water_density: present(row.qdp).unwrap_or(DEFAULT_WATER_DENSITY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    fn tables_with_elevators(elevator_csv: &'static str) -> FacilityTables {
        FacilityTables::from_csv(FacilityTableSources {
            usage_ratios: Cursor::new(include_str!(
                "./data/coef_facility_usage_elevator_escalator.csv"
            )),
            elevator_energy: Cursor::new(elevator_csv),
            escalator_power: Cursor::new(include_str!("./data/coef_facility_power_escalator.csv")),
            heaters: Cursor::new(include_str!("./data/coef_facility_heater.csv")),
            heater_efficiencies: Cursor::new(include_str!("./data/coef_facility_eff_heater.csv")),
            water_consumption: Cursor::new(include_str!("./data/water_consumption_coef.csv")),
        })
        .unwrap()
    }

    #[fixture]
    fn tables() -> FacilityTables {
        tables_with_elevators(include_str!("./data/coef_facility_ec_elevator.csv"))
    }

    #[rstest]
    fn test_usage_ratios(tables: FacilityTables) {
        assert_relative_eq!(tables.elevator_usage_ratio("B2").unwrap(), 0.65);
        assert_relative_eq!(tables.escalator_usage_ratio("B2").unwrap(), 0.7);
        assert!(tables.elevator_usage_ratio("Z1").unwrap_err().is_data());
        // residential rows carry no escalator ratio
        assert!(tables.escalator_usage_ratio("house").unwrap_err().is_data());
    }

    #[rstest]
    fn test_elevator_energy_picks_nearest_row_in_story_range() {
        let tables = tables_with_elevators(
            "Stories_min,Stories_max,n_People,n_Load,Speed,FLE\n\
             1,5,8,600,60,1.5\n\
             1,5,8,600,105,2.5\n\
             1,5,15,1000,105,3.5\n\
             6,10,8,600,105,9.9\n",
        );

        assert_relative_eq!(tables.elevator_energy(5., 8., 600., 100.).unwrap(), 2.5);
        assert_relative_eq!(tables.elevator_energy(3., 14., 990., 105.).unwrap(), 3.5);
        assert_relative_eq!(tables.elevator_energy(6., 8., 600., 60.).unwrap(), 9.9);
    }

    #[rstest]
    fn test_elevator_energy_ties_take_first_row() {
        let tables = tables_with_elevators(
            "Stories_min,Stories_max,n_People,n_Load,Speed,FLE\n\
             1,5,8,600,60,1.5\n\
             1,5,8,600,80,2.5\n",
        );

        assert_relative_eq!(tables.elevator_energy(2., 8., 600., 70.).unwrap(), 1.5);
    }

    #[rstest]
    fn test_elevator_energy_outside_story_ranges(tables: FacilityTables) {
        assert!(tables
            .elevator_energy(120., 8., 600., 105.)
            .unwrap_err()
            .is_data());
    }

    #[rstest]
    fn test_escalator_power(tables: FacilityTables) {
        assert_relative_eq!(tables.escalator_power(5., 800.).unwrap(), 5.5);
        assert_relative_eq!(tables.escalator_power(4., 1150.).unwrap(), 7.15);
        // upper bound of a range is exclusive
        assert_relative_eq!(tables.escalator_power(6., 600.).unwrap(), 6.38);
        assert!(tables.escalator_power(12., 800.).unwrap_err().is_data());
    }

    #[rstest]
    #[case(1150., 7.15)]
    #[case(650., 4.67)]
    #[case(900., 5.50)]
    fn test_escalator_power_takes_nearest_width(
        tables: FacilityTables,
        #[case] width: f64,
        #[case] power: f64,
    ) {
        assert_relative_eq!(tables.escalator_power(5., width).unwrap(), power);
    }

    #[rstest]
    fn test_heater_lookups(tables: FacilityTables) {
        assert_eq!(
            tables.heater_emission("2.1").unwrap(),
            (HeaterFuel::Gas, 110.)
        );
        assert_eq!(
            tables.heater_emission("3").unwrap(),
            (HeaterFuel::Electricity, 160.)
        );
        assert_relative_eq!(tables.heater_efficiency("None").unwrap(), 1.0);
        assert_relative_eq!(tables.heater_efficiency("2").unwrap(), 0.8);
        assert!(tables.heater_emission("9").unwrap_err().is_data());
    }

    #[rstest]
    fn test_water_consumption_defaults_fill_empty_cells(tables: FacilityTables) {
        assert_eq!(
            tables.water_consumption("office").unwrap(),
            WaterConsumptionCoefficients {
                coef_effective_a: 0.6,
                coef_people_density: 0.1,
                coef_water_density: 0.1,
            }
        );
        assert_eq!(
            tables.water_consumption("retail store").unwrap(),
            WaterConsumptionCoefficients {
                coef_effective_a: 0.5,
                coef_people_density: 0.3,
                coef_water_density: 0.05,
            }
        );
        assert_eq!(
            tables.water_consumption("factory").unwrap().coef_water_density,
            0.1
        );
    }
}
