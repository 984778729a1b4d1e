use crate::core::units::{cubic_metres_per_hour_to_litres_per_minute, LITRES_PER_CUBIC_METRE};
use crate::errors::EstimationError;
use crate::input::WaterTowerInput;
use crate::statistics::weighted_average;

// height of the pump suction below the ground floor, added to the tower height (m)
const SUCTION_HEAD: f64 = 6.;
const DEFAULT_FRICTION_SHARE: f64 = 0.1;
const DEFAULT_ACTUAL_HEAD_FACTOR: f64 = 1.05;

// standard household consumption used to size a pump
const PERSONS_PER_HOUSEHOLD: f64 = 4.;
const LITRES_PER_PERSON_PER_DAY: f64 = 250.;
const PUMP_SAFETY_FACTOR: f64 = 1.2;
const PUMPING_HOURS_PER_DAY: f64 = 10.;

#[derive(Clone, Debug)]
pub struct WaterTower {
    pub(crate) static_hydraulic_head: f64,   // m
    pub(crate) friction_hydraulic_head: f64, // m
    pub(crate) standard_hydraulic_head_total: f64,
    pub(crate) hydraulic_head_total: f64, // actual head of the installed pump (m)
    pub(crate) a: f64,
    pub(crate) water_pumping_capacity: Option<f64>, // L/min
}

impl WaterTower {
    pub fn new(input: &WaterTowerInput) -> Self {
        let static_hydraulic_head = input.height_watertower + SUCTION_HEAD;
        let friction_hydraulic_head = input
            .friction_hydraulic_head
            .unwrap_or(DEFAULT_FRICTION_SHARE * static_hydraulic_head);
        let standard_hydraulic_head_total = static_hydraulic_head + friction_hydraulic_head;

        Self {
            static_hydraulic_head,
            friction_hydraulic_head,
            standard_hydraulic_head_total,
            hydraulic_head_total: input
                .hydraulic_head_total
                .unwrap_or(DEFAULT_ACTUAL_HEAD_FACTOR * standard_hydraulic_head_total),
            a: input.a,
            water_pumping_capacity: input.water_pumping_capacity,
        }
    }

    pub fn standard_hydraulic_head_total(&self) -> f64 {
        self.standard_hydraulic_head_total
    }

    pub(crate) fn pumping_capacity(&self) -> Result<f64, EstimationError> {
        self.water_pumping_capacity.ok_or_else(|| {
            EstimationError::configuration(
                "water_pumping_capacity of a water tower is not defined.",
            )
        })
    }

    /// PEB, design pumping work relative to twice the standard work for the household count.
    ///
    /// 0.5 means the pump is just large enough; 1.0 is the reference.
    pub fn pumping_efficiency(&self, n_household: f64) -> Result<f64, EstimationError> {
        let standard_capacity = standard_pumping_capacity(n_household);
        if !(standard_capacity > 0.) {
            return Err(EstimationError::configuration(
                "Standard pumping capacity needs at least one household.",
            ));
        }

        Ok((self.pumping_capacity()? * self.hydraulic_head_total)
            / (2. * standard_capacity * self.standard_hydraulic_head_total))
    }
}

/// Standard pumping capacity in L/min for a number of households.
pub fn standard_pumping_capacity(n_household: f64) -> f64 {
    let daily_consumption = PERSONS_PER_HOUSEHOLD * LITRES_PER_PERSON_PER_DAY * n_household
        / LITRES_PER_CUBIC_METRE as f64
        * PUMP_SAFETY_FACTOR;

    cubic_metres_per_hour_to_litres_per_minute(daily_consumption / PUMPING_HOURS_PER_DAY)
}

/// Average standard head of the building's towers: zero without towers, the tower's own head
/// for a single tower and a weighted mean otherwise.
pub(crate) fn average_hydraulic_head(
    towers: &[WaterTower],
    weight: impl Fn(&WaterTower) -> Result<f64, EstimationError>,
) -> Result<f64, EstimationError> {
    match towers {
        [] => Ok(0.),
        [tower] => Ok(tower.standard_hydraulic_head_total),
        towers => weighted(
            towers,
            |tower| Ok(tower.standard_hydraulic_head_total),
            weight,
            "hydraulic head",
        ),
    }
}

/// Capacity-weighted PEB of the building's towers, 1.0 without towers.
pub(crate) fn combined_pumping_efficiency(
    towers: &[WaterTower],
    n_household: f64,
) -> Result<f64, EstimationError> {
    match towers {
        [] => Ok(1.0),
        [tower] => tower.pumping_efficiency(n_household),
        towers => weighted(
            towers,
            |tower| tower.pumping_efficiency(n_household),
            WaterTower::pumping_capacity,
            "pumping efficiency",
        ),
    }
}

fn weighted(
    towers: &[WaterTower],
    value: impl Fn(&WaterTower) -> Result<f64, EstimationError>,
    weight: impl Fn(&WaterTower) -> Result<f64, EstimationError>,
    quantity: &str,
) -> Result<f64, EstimationError> {
    let pairs = towers
        .iter()
        .map(|tower| Ok((value(tower)?, weight(tower)?)))
        .collect::<Result<Vec<(f64, f64)>, EstimationError>>()?;

    weighted_average(pairs).ok_or_else(|| {
        EstimationError::data(format!(
            "Weights of the water towers add up to zero, the {quantity} is undefined."
        ))
    })
}
