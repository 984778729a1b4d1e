use super::{facility_area, FacilityContext};
use crate::core::coefficients::region::ClimateZone;
use crate::core::units::DAYS_PER_YEAR;
use crate::errors::EstimationError;
use crate::input::{FacilityHeatingMethod, PoolInput, SportBathroomInput};
use strum_macros::Display;

const SPORT_BATHROOM_SECTION: &str = "L3";
const POOL_PLANT_SECTION: &str = "L6-2";

const HEATING_COEFFICIENT_BHPE: f64 = 6.5;

// m3 per m2 and hour of use
const SPORT_BATHROOM_WATER_INTENSITY: f64 = 0.046;
const SPORT_BATHROOM_HOT_WATER_INTENSITY: f64 = 0.023;

// share of the pool volume turned over per hour of use
const POOL_TURNOVER: f64 = 0.01;
const POOL_PUMPING_INTENSITY: f64 = 0.02;
const POOL_SUCTION_HEAD: f64 = 6.;
const POOL_HOT_WATER_INTENSITY: f64 = 0.16;

fn heating_coefficient(method: FacilityHeatingMethod) -> f64 {
    match method {
        FacilityHeatingMethod::BHPE => HEATING_COEFFICIENT_BHPE,
        FacilityHeatingMethod::Other => 0.0,
    }
}

#[derive(Clone, Debug)]
pub struct SportBathroom {
    pub(crate) a: f64,
    pub(crate) coef_usage_h: f64,
}

impl SportBathroom {
    pub fn new(
        context: &FacilityContext,
        input: &SportBathroomInput,
        section_area: Option<f64>,
    ) -> Result<Self, EstimationError> {
        Ok(Self {
            a: facility_area(input.a, section_area, "sport bathroom")?,
            coef_usage_h: match input.coef_usage_h {
                Some(hours) => hours,
                None => context.operating_hours(SPORT_BATHROOM_SECTION)?,
            },
        })
    }

    pub fn water_use(&self) -> f64 {
        SPORT_BATHROOM_WATER_INTENSITY * self.a * self.coef_usage_h
    }

    pub fn hot_water_use(&self) -> f64 {
        SPORT_BATHROOM_HOT_WATER_INTENSITY * self.a * self.coef_usage_h
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum PoolKind {
    SwimmingPool,
    Spa,
}

impl PoolKind {
    // kWh per m3 and hour of use
    fn process_intensity(&self) -> f64 {
        match self {
            PoolKind::SwimmingPool => 0.016,
            PoolKind::Spa => 0.16,
        }
    }

    fn nozzle_intensity(&self) -> f64 {
        match self {
            PoolKind::SwimmingPool => 0.,
            PoolKind::Spa => 0.064,
        }
    }
}

/// Days a year a pool without constant temperature control still needs heating.
pub fn hot_water_days(constant_temperature: bool, climate_zone: ClimateZone) -> f64 {
    if constant_temperature {
        return DAYS_PER_YEAR as f64;
    }

    match climate_zone {
        ClimateZone::N => 181.,
        ClimateZone::C => 151.,
        ClimateZone::S => 121.,
    }
}

/// A swimming pool or a spa.
#[derive(Clone, Debug)]
pub struct Pool {
    pub(crate) kind: PoolKind,
    pub(crate) v: f64, // m3
    pub(crate) coef_usage_h: f64,
    pub(crate) height_watertower: f64,
    pub(crate) coef_usage_d_hotwater: f64,
    pub(crate) ec_heating: f64,
}

impl Pool {
    pub fn new(
        context: &FacilityContext,
        kind: PoolKind,
        input: &PoolInput,
    ) -> Result<Self, EstimationError> {
        Ok(Self {
            kind,
            v: input.v,
            coef_usage_h: match input.coef_usage_h {
                Some(hours) => hours,
                None => context.operating_hours(POOL_PLANT_SECTION)?,
            },
            height_watertower: input.height_watertower,
            coef_usage_d_hotwater: hot_water_days(
                input.constant_temperature,
                context.climate_zone,
            ),
            ec_heating: heating_coefficient(input.ec_heating),
        })
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn water_use(&self) -> f64 {
        POOL_TURNOVER * self.v * self.coef_usage_h
    }

    pub fn pumping_energy(&self) -> f64 {
        POOL_PUMPING_INTENSITY * (self.height_watertower + POOL_SUCTION_HEAD) * self.water_use()
    }

    pub fn process_energy(&self) -> f64 {
        self.kind.process_intensity() * self.v * self.coef_usage_h
    }

    pub fn nozzle_energy(&self) -> f64 {
        self.kind.nozzle_intensity() * self.v * self.coef_usage_h
    }

    pub fn hot_water_use(&self) -> f64 {
        POOL_HOT_WATER_INTENSITY * self.v * self.coef_usage_d_hotwater
    }
}
