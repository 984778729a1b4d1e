use crate::core::building::{Breakdown, Building, BuildingClass};
use crate::core::coefficients::CoefficientTables;
use crate::core::facility::water_tower::standard_pumping_capacity;
use crate::input::{BuildingInput, InputForProcessing};
use crate::{EstimationResult, ScoreLevel};
use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use rstest::*;
use serde_json::{json, Value};
use std::sync::Arc;

const ECE: f64 = 0.509;

#[fixture]
fn tables() -> Arc<CoefficientTables> {
    CoefficientTables::bundled()
}

fn building_input(value: Value) -> BuildingInput {
    InputForProcessing::init_with_json(value.to_string().as_bytes())
        .unwrap()
        .finalize()
}

fn estimate(tables: Arc<CoefficientTables>, value: Value) -> (Building, EstimationResult) {
    let mut building = Building::from_input(tables, &building_input(value)).unwrap();
    let result = building.estimate().unwrap();
    (building, result)
}

fn house(ac_operation: &str) -> Value {
    json!({
        "estimation_system": "R-BERS",
        "building_type": "house",
        "building_coordinate": [121.538, 25.028],
        "energy_section": [
            {"id": "R1", "a": 200, "ac_operation": ac_operation}
        ]
    })
}

fn apartment() -> Value {
    json!({
        "estimation_system": "R-BERS",
        "building_type": "apartment",
        "building_address_county": "臺北市",
        "building_address_town": "大安區",
        "n_suite": 10,
        "n_household_big": 30,
        "energy_section": [
            {"id": "R1", "a": 3000, "ac_operation": "INTERVAL"},
            {"id": "R2", "a": 500, "ac_operation": "INTERVAL"}
        ],
        "watertower": [
            {"height_watertower": 40, "water_pumping_capacity": 200}
        ],
        "elevator": [
            {
                "elevator_bottom_floor": 1,
                "elevator_top_floor": 12,
                "coef_people_per_elevator": 11,
                "coef_load_per_elevator": 750,
                "coef_speed": 105
            }
        ],
        "parkinggarage": [
            {"a": 1000, "ec_ventilation": 10, "coef_eff_powersaving_ventilation": 0.8}
        ]
    })
}

#[rstest]
fn test_house_benchmarks_and_score(tables: Arc<CoefficientTables>) {
    let (building, result) = estimate(tables, house("INTERVAL"));

    let median = (28. + 12.) * ECE;
    let best = 0.7 * median;
    let green = 0.9 * median;
    let max = (42. + 16.8) * ECE;
    let cei = 28. * ECE * (0.9 - 0.12 * 0.9) + 12. * ECE * 0.9;

    assert_eq!(building.class(), BuildingClass::Residential);
    assert_relative_eq!(result.est_cei_m.unwrap(), median, max_relative = 1e-9);
    assert_relative_eq!(result.est_cei_min.unwrap(), best, max_relative = 1e-9);
    assert_relative_eq!(result.est_cei_g.unwrap(), green, max_relative = 1e-9);
    assert_relative_eq!(result.est_cei_max.unwrap(), max, max_relative = 1e-9);
    assert_relative_eq!(result.est_cei.unwrap(), cei, max_relative = 1e-9);
    assert_relative_eq!(result.est_eui, cei / ECE, max_relative = 1e-9);
    assert_relative_eq!(result.est_eui_g, green / ECE, max_relative = 1e-9);
    assert_relative_eq!(result.est_score, 65.12, max_relative = 1e-9);
    assert_eq!(result.est_score_level, ScoreLevel::Three);
}

#[rstest]
fn test_residential_sections_always_run_intermittently(tables: Arc<CoefficientTables>) {
    let (_, continuous) = estimate(Arc::clone(&tables), house("CONTINUE"));
    let (_, intermittent) = estimate(tables, house("INTERVAL"));

    assert_eq!(continuous, intermittent);
}

#[rstest]
fn test_house_heater_uses_four_persons(tables: Arc<CoefficientTables>) {
    let mut input = house("INTERVAL");
    input["heater"] = json!([
        {
            "type": "1",
            "quantity": 1,
            "energy_rating": "1",
            "coef_eff_powersaving_hotwater_pipeline": 0.9
        }
    ]);

    let (building, result) = estimate(tables, input);

    let reference = 4. * 500. * ECE;
    let simulated = reference * 0.75 * 0.9;
    let Some(Breakdown::New(breakdown)) = building.breakdown() else {
        panic!("a new building has an R-BERS breakdown");
    };
    assert_relative_eq!(breakdown.est_fce, reference, max_relative = 1e-9);
    assert_relative_eq!(breakdown.est_fce_simulated, simulated, max_relative = 1e-9);
    assert_relative_eq!(
        result.est_cei_m.unwrap(),
        (28. + 12.) * ECE + reference / 200.,
        max_relative = 1e-9
    );
    assert_eq!(breakdown.public_equipment, None);
}

#[rstest]
fn test_apartment_public_equipment(tables: Arc<CoefficientTables>) {
    let (building, result) = estimate(tables, apartment());

    let Some(Breakdown::New(breakdown)) = building.breakdown() else {
        panic!("a new building has an R-BERS breakdown");
    };
    let equipment = breakdown.public_equipment.unwrap();
    let people_per_household = (2. * 10. + 3. * 30.) / 40.;
    let head = (40. + 6.) * 1.1;
    let pumped_water = 0.6 * 0.225 * 365. * people_per_household * 40.;

    assert_eq!(breakdown.est_n_household, Some(40.));
    assert_relative_eq!(breakdown.est_n_people_per_household, people_per_household);
    assert_relative_eq!(equipment.hydraulic_head_total, head, max_relative = 1e-9);
    assert_relative_eq!(equipment.ec_ventilation, 10000.);
    assert_relative_eq!(
        equipment.ec_water_pumping,
        0.0183 * pumped_water * head,
        max_relative = 1e-9
    );
    assert_relative_eq!(
        equipment.coef_eff_water_pumping,
        200. * 1.05 / (2. * standard_pumping_capacity(40.)),
        max_relative = 1e-9
    );
    assert_relative_eq!(
        equipment.est_mce,
        (equipment.ec_ventilation + equipment.ec_elevator + equipment.ec_water_pumping) * ECE,
        max_relative = 1e-9
    );
    assert!(equipment.ec_elevator > 0.);

    let area_median = ((28. + 12.) * 3000. + (20. + 14.) * 500.) / 3500. * ECE;
    assert_relative_eq!(
        result.est_cei_m.unwrap(),
        area_median + equipment.est_mce / 3500.,
        max_relative = 1e-9
    );
    assert!((0. ..=100.).contains(&result.est_score));
}

#[rstest]
fn test_apartment_pump_capacity_is_required(tables: Arc<CoefficientTables>) {
    let mut input = apartment();
    input["watertower"] = json!([{"height_watertower": 40}]);

    let error = Building::from_input(tables, &building_input(input))
        .and_then(|mut building| building.estimate())
        .unwrap_err();

    assert!(error.is_configuration());
}

#[rstest]
fn test_house_towers_do_not_need_pump_capacity(tables: Arc<CoefficientTables>) {
    let mut input = house("INTERVAL");
    input["watertower"] = json!([{"height_watertower": 10}, {"height_watertower": 15}]);

    let (_, with_towers) = estimate(Arc::clone(&tables), input);
    let (_, without_towers) = estimate(tables, house("INTERVAL"));

    assert_eq!(with_towers, without_towers);
}

#[rstest]
fn test_unknown_residential_type_is_a_configuration_error(tables: Arc<CoefficientTables>) {
    let mut input = house("INTERVAL");
    input["building_type"] = json!("castle");

    let error = Building::from_input(tables, &building_input(input)).unwrap_err();

    assert!(error.is_configuration());
}

#[rstest]
#[case(json!({"energy_section": [{"id": "B2", "a": 100, "ac_operation": "INTERVAL"}]}))]
#[case(json!({"exclusive_energy_section": [{"id": "N9", "a": 100}]}))]
fn test_general_sections_in_residential_building_are_usage_errors(
    tables: Arc<CoefficientTables>,
    #[case] sections: Value,
) {
    let mut input = house("INTERVAL");
    for (key, value) in sections.as_object().unwrap() {
        input[key] = value.clone();
    }

    let error = Building::from_input(tables, &building_input(input)).unwrap_err();

    assert!(error.is_usage());
}

#[rstest]
fn test_result_round_trips_through_json(tables: Arc<CoefficientTables>) {
    let (_, result) = estimate(tables, apartment());

    let text = serde_json::to_string(&result).unwrap();
    let read_back: EstimationResult = serde_json::from_str(&text).unwrap();

    assert_eq!(read_back, result);
    assert!(text.contains("\"est_cei_g\""));
}
