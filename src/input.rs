use crate::form_input::unflatten_form;
use anyhow::anyhow;
use serde::{Deserialize, Deserializer, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};
use strum_macros::{Display, EnumString};

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

/// Ingest a flat web-form submission, where every value is wrapped in a list.
pub fn ingest_form_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_form(json)
}

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, PartialEq, Serialize)]
pub enum EstimationSystem {
    /// existing buildings
    #[serde(rename = "BERSe")]
    #[strum(serialize = "BERSe")]
    Berse,
    /// new residential buildings
    #[serde(rename = "R-BERS")]
    #[strum(serialize = "R-BERS")]
    Rbers,
}

/// Water heating method of the building's common hot water.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum CommonHeatingMethod {
    /// electric heater
    #[default]
    HE,
    /// heat pump
    HPE,
    #[serde(other)]
    Other,
}

/// Water heating method of a bathroom, pool or spa.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum FacilityHeatingMethod {
    /// boiler with heat pump
    #[default]
    BHPE,
    #[serde(other)]
    Other,
}

/// Metered whole-building consumption, either as one annual figure or as a series of readings
/// covering whole years.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnergyConsumptionInput {
    Annual(f64),
    Monthly { monthly: Vec<f64> },
    Bimonthly { bimonthly: Vec<f64> },
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BuildingInput {
    pub estimation_system: EstimationSystem,
    #[serde(deserialize_with = "deserialize_code")]
    pub building_type: String,
    #[serde(default)]
    pub building_name: Option<String>,
    /// longitude and latitude
    #[serde(default)]
    pub building_coordinate: Option<(f64, f64)>,
    #[serde(default)]
    pub building_address_county: Option<String>,
    #[serde(default)]
    pub building_address_town: Option<String>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub building_n_stories_above_ground: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub building_n_stories_below_ground: f64,
    #[serde(default)]
    pub building_floor_offset: f64,
    #[serde(default)]
    pub climate_adjustment: bool,

    // existing buildings
    #[serde(default)]
    pub ec: Option<EnergyConsumptionInput>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub ec_other: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub est_q_rw: f64,
    #[serde(default)]
    pub ec_heating_comm: CommonHeatingMethod,

    // new residential buildings
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub n_suite: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub n_household_big: Option<f64>,
    #[serde(default = "default_efficiency_multiplier")]
    #[validate(minimum = 0.)]
    pub coef_eff_ac_residential: f64,
    #[serde(default = "default_efficiency_multiplier")]
    #[validate(minimum = 0.)]
    pub coef_eff_ac_nonresidential: f64,
    #[serde(default = "default_efficiency_multiplier")]
    #[validate(minimum = 0.)]
    pub coef_eff_envelope: f64,
    #[serde(default = "default_efficiency_multiplier")]
    #[validate(minimum = 0.)]
    pub coef_eff_lighting_residential: f64,
    #[serde(default = "default_efficiency_multiplier")]
    #[validate(minimum = 0.)]
    pub coef_eff_lighting_nonresidential: f64,

    #[serde(default)]
    #[validate]
    pub energy_section: Vec<EnergySectionInput>,
    #[serde(default)]
    #[validate]
    pub exclusive_energy_section: Vec<ExclusiveEnergySectionInput>,
    #[serde(default)]
    #[validate]
    pub nonresidential_energy_section: Vec<NonResidentialEnergySectionInput>,
    #[serde(default)]
    #[validate]
    pub elevator: Vec<ElevatorInput>,
    #[serde(default)]
    #[validate]
    pub escalator: Vec<EscalatorInput>,
    #[serde(default)]
    #[validate]
    pub watertower: Vec<WaterTowerInput>,
    #[serde(default)]
    #[validate]
    pub hotel: Vec<HotelInput>,
    #[serde(default)]
    #[validate]
    pub hospital: Vec<HospitalInput>,
    #[serde(default)]
    #[validate]
    pub sportbathroom: Vec<SportBathroomInput>,
    #[serde(default)]
    #[validate]
    pub swimmingpool: Vec<PoolInput>,
    #[serde(default)]
    #[validate]
    pub spa: Vec<PoolInput>,
    #[serde(default)]
    #[validate]
    pub diningarea: Vec<DiningAreaInput>,
    #[serde(default)]
    #[validate]
    pub exhibitionarea: Vec<ActivityAreaInput>,
    #[serde(default)]
    #[validate]
    pub performancearea: Vec<ActivityAreaInput>,
    #[serde(default)]
    #[validate]
    pub datacenter: Vec<DataCenterInput>,
    #[serde(default)]
    #[validate]
    pub heater: Vec<HeaterInput>,
    #[serde(default)]
    #[validate]
    pub parkinggarage: Vec<ParkingGarageInput>,
}

fn default_efficiency_multiplier() -> f64 {
    0.9
}

fn default_coef_eff() -> f64 {
    1.0
}

fn default_usage_ratio() -> f64 {
    1.0
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EnergySectionInput {
    #[serde(deserialize_with = "deserialize_code")]
    pub id: String,
    #[validate(exclusive_minimum = 0.)]
    pub a: f64,
    pub ac_operation: String,
    #[serde(default)]
    pub ac_type: Option<String>,
    #[serde(default)]
    pub es_sub: Option<u32>,
    #[serde(default)]
    #[validate]
    pub hotel: Option<HotelInput>,
    #[serde(default)]
    #[validate]
    pub hospital: Option<HospitalInput>,
    #[serde(default)]
    #[validate]
    pub sportbathroom: Option<SportBathroomInput>,
    #[serde(default)]
    #[validate]
    pub swimmingpool: Option<PoolInput>,
    #[serde(default)]
    #[validate]
    pub spa: Option<PoolInput>,
    #[serde(default)]
    #[validate]
    pub diningarea: Option<DiningAreaInput>,
    #[serde(default)]
    #[validate]
    pub exhibitionarea: Option<ActivityAreaInput>,
    #[serde(default)]
    #[validate]
    pub performancearea: Option<ActivityAreaInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ExclusiveEnergySectionInput {
    #[serde(deserialize_with = "deserialize_code")]
    pub id: String,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 8760.)]
    pub coef_usage_h: Option<f64>,
    #[serde(default)]
    #[validate]
    pub datacenter: Option<DataCenterInput>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NonResidentialEnergySectionInput {
    pub nonresidential_energy_section_type: String,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ElevatorInput {
    pub elevator_bottom_floor: i32,
    pub elevator_top_floor: i32,
    #[serde(default)]
    pub elevator_floor_offset: i32,
    #[serde(default)]
    pub elevator_es: Vec<String>,
    #[serde(default = "default_coef_eff")]
    #[validate(minimum = 0.)]
    pub coef_eff: f64,
    #[validate(exclusive_minimum = 0.)]
    pub coef_people_per_elevator: f64,
    #[validate(exclusive_minimum = 0.)]
    pub coef_load_per_elevator: f64,
    #[validate(exclusive_minimum = 0.)]
    pub coef_speed: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EscalatorInput {
    #[validate(minimum = 0.)]
    pub escalator_elevate_height: f64,
    #[validate(exclusive_minimum = 0.)]
    pub escalator_width: f64,
    #[serde(default)]
    pub escalator_es: Vec<String>,
    #[serde(default = "default_coef_eff")]
    #[validate(minimum = 0.)]
    pub coef_eff: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct WaterTowerInput {
    #[validate(minimum = 0.)]
    pub height_watertower: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub friction_hydraulic_head: Option<f64>,
    /// actual total head of the installed pump
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub hydraulic_head_total: Option<f64>,
    /// area served, weighting the head across towers
    #[serde(default = "default_tower_weight")]
    #[validate(minimum = 0.)]
    pub a: f64,
    /// design pumping capacity in L/min
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub water_pumping_capacity: Option<f64>,
}

fn default_tower_weight() -> f64 {
    1.0
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HotelInput {
    #[validate(minimum = 0.)]
    pub n_room: f64,
    #[serde(default = "default_usage_ratio")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub coef_usage_r_room: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HospitalInput {
    #[validate(minimum = 0.)]
    pub n_hospitalbed: f64,
    #[serde(default = "default_usage_ratio")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub coef_usage_r_hospitalbed: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SportBathroomInput {
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 8760.)]
    pub coef_usage_h: Option<f64>,
    /// Read for compatibility with form submissions; shower hot water is heated by the
    /// building's common heating method.
    #[serde(default)]
    pub ec_heating: FacilityHeatingMethod,
}

/// A swimming pool or a spa.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct PoolInput {
    #[validate(minimum = 0.)]
    pub v: f64,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 8760.)]
    pub coef_usage_h: Option<f64>,
    #[serde(default = "default_pool_tower_height")]
    #[validate(minimum = 0.)]
    pub height_watertower: f64,
    #[serde(default = "default_constant_temperature")]
    pub constant_temperature: bool,
    #[serde(default)]
    pub ec_heating: FacilityHeatingMethod,
}

fn default_pool_tower_height() -> f64 {
    30.
}

fn default_constant_temperature() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DiningAreaInput {
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
    #[serde(default = "default_meals_per_day")]
    pub n_meal_per_day: u32,
    #[serde(default)]
    pub washdishes_by_hand: bool,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 365.)]
    pub coef_usage_d: Option<f64>,
}

fn default_meals_per_day() -> u32 {
    2
}

/// An exhibition or performance area.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ActivityAreaInput {
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 365.)]
    pub coef_usage_d: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DataCenterInput {
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub a: Option<f64>,
    #[validate(minimum = 0.)]
    pub coef_power_cabinetrack: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HeaterInput {
    #[serde(rename = "type", deserialize_with = "deserialize_code")]
    pub heater_type: String,
    #[validate(minimum = 0.)]
    pub quantity: f64,
    #[serde(default = "default_energy_rating", deserialize_with = "deserialize_code")]
    pub energy_rating: String,
    #[serde(default = "default_coef_eff")]
    #[validate(minimum = 0.)]
    pub coef_eff_powersaving_hotwater_pipeline: f64,
}

fn default_energy_rating() -> String {
    "none".to_string()
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ParkingGarageInput {
    #[validate(minimum = 0.)]
    pub a: f64,
    /// ventilation energy use in kWh/(m2.year)
    #[validate(minimum = 0.)]
    pub ec_ventilation: f64,
    #[serde(default = "default_coef_eff")]
    #[validate(minimum = 0.)]
    pub coef_eff_powersaving_ventilation: f64,
}

/// Codes such as heater types and building types may arrive as numbers; they are kept as text.
fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Integer(i64),
        Number(f64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(text) => text.trim().to_string(),
        Code::Integer(number) => number.to_string(),
        Code::Number(number) => number.to_string(),
    })
}

#[derive(Debug)]
pub struct InputForProcessing {
    input: BuildingInput,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: BuildingInput = serde_json::from_reader(reader)?;

        Self::init_with_input(input)
    }

    pub fn init_with_form(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let form: serde_json::Map<String, serde_json::Value> = serde_json::from_reader(reader)?;
        let input: BuildingInput = serde_json::from_value(unflatten_form(form)?)?;

        Self::init_with_input(input)
    }

    pub fn init_with_input(input: BuildingInput) -> Result<Self, anyhow::Error> {
        input
            .validate()
            .map_err(|errors| anyhow!("Invalid building configuration: {errors}"))?;

        Ok(Self { input })
    }

    pub fn estimation_system(&self) -> EstimationSystem {
        self.input.estimation_system
    }

    pub fn building_name(&self) -> Option<&str> {
        self.input.building_name.as_deref()
    }

    pub fn finalize(self) -> BuildingInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;
    use std::fs::File;
    use walkdir::WalkDir;

    fn minimal_input() -> serde_json::Value {
        json!({
            "estimation_system": "BERSe",
            "building_type": "B2",
            "building_coordinate": [121.538, 25.028],
            "ec": 95169,
            "energy_section": [
                {"id": "B2", "a": 1000, "ac_operation": "CONTINUE"}
            ]
        })
    }

    #[rstest]
    fn test_defaults_fill_optional_fields() {
        let input = InputForProcessing::init_with_json(minimal_input().to_string().as_bytes())
            .unwrap()
            .finalize();

        assert_eq!(input.estimation_system, EstimationSystem::Berse);
        assert_eq!(input.building_coordinate, Some((121.538, 25.028)));
        assert_eq!(input.ec, Some(EnergyConsumptionInput::Annual(95169.)));
        assert_eq!(input.ec_heating_comm, CommonHeatingMethod::HE);
        assert_eq!(input.coef_eff_envelope, 0.9);
        assert!(!input.climate_adjustment);
        assert!(input.elevator.is_empty());
    }

    #[rstest]
    fn test_consumption_series() {
        let monthly: EnergyConsumptionInput =
            serde_json::from_value(json!({"monthly": vec![10.; 24]})).unwrap();
        assert_eq!(
            monthly,
            EnergyConsumptionInput::Monthly {
                monthly: vec![10.; 24]
            }
        );
    }

    #[rstest]
    fn test_unknown_heating_method_reads_as_other() {
        let method: CommonHeatingMethod = serde_json::from_value(json!("GAS")).unwrap();
        assert_eq!(method, CommonHeatingMethod::Other);
    }

    #[rstest]
    fn test_numeric_codes_are_kept_as_text() {
        let heater: HeaterInput =
            serde_json::from_value(json!({"type": 2.1, "quantity": 3, "energy_rating": 2}))
                .unwrap();
        assert_eq!(heater.heater_type, "2.1");
        assert_eq!(heater.energy_rating, "2");

        let heater: HeaterInput =
            serde_json::from_value(json!({"type": "4.1", "quantity": 1})).unwrap();
        assert_eq!(heater.energy_rating, "none");
    }

    #[rstest]
    fn test_non_positive_section_area_is_rejected() {
        let mut input = minimal_input();
        input["energy_section"][0]["a"] = json!(0);

        assert!(InputForProcessing::init_with_json(input.to_string().as_bytes()).is_err());
    }

    #[rstest]
    fn test_unknown_field_is_rejected() {
        let mut input = minimal_input();
        input["building_colour"] = json!("red");

        assert!(InputForProcessing::init_with_json(input.to_string().as_bytes()).is_err());
    }

    #[rstest]
    fn test_estimation_system_text() {
        assert_eq!(EstimationSystem::Rbers.to_string(), "R-BERS");
        let system: EstimationSystem = serde_json::from_value(json!("R-BERS")).unwrap();
        assert_eq!(system, EstimationSystem::Rbers);
    }

    #[rstest]
    fn should_successfully_parse_all_demo_files() {
        for entry in WalkDir::new("./demos/input")
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                !e.file_type().is_dir() && e.file_name().to_str().unwrap().ends_with("json")
            })
        {
            let is_form = entry.path().parent().and_then(|parent| parent.file_name())
                == Some(std::ffi::OsStr::new("form"));
            let parsed = if is_form {
                ingest_form_for_processing(File::open(entry.path()).unwrap())
            } else {
                ingest_for_processing(File::open(entry.path()).unwrap())
            };
            assert!(
                parsed.is_ok(),
                "error was {:?} when parsing file {}",
                parsed.err().unwrap(),
                entry.file_name().to_str().unwrap()
            );
        }
    }
}
