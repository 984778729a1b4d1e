//! This module provides the energy section types: common sections scored against the benchmark
//! tables, exclusive sections with dedicated formulas, and non-residential sections of
//! residential buildings.

use crate::core::coefficients::es_operation::DEFAULT_SUB_SECTION;
use crate::core::coefficients::facility_tables::WaterConsumptionCoefficients;
use crate::core::coefficients::CoefficientTables;
use crate::errors::EstimationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AcOperation {
    Continue,
    Interval,
}

impl AcOperation {
    pub(crate) fn parse(ac_operation: &str) -> Result<Self, EstimationError> {
        AcOperation::from_str(ac_operation.trim()).map_err(|_| {
            EstimationError::configuration(format!(
                "ac_operation syntax error: {ac_operation:?} is neither CONTINUE nor INTERVAL (case insensitive)."
            ))
        })
    }
}

const WATERCOOLED_AC_TYPE: &str = "watercooled";

/// Per-section values resolved during estimation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SectionDerived {
    #[serde(rename = "SO_r")]
    pub so_r: f64,
    pub eeui_m: f64,
    pub leui_min: f64,
    pub leui_m: f64,
    pub leui_max: f64,
    pub aeui_min: f64,
    pub aeui_m: f64,
    pub aeui_max: f64,
}

/// Benchmark EUI components of one section, as read from the min/m/max tables.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionBenchmark {
    pub eeui_m: f64,
    pub leui_min: f64,
    pub leui_m: f64,
    pub leui_max: f64,
    pub aeui_min: f64,
    pub aeui_m: f64,
    pub aeui_max: f64,
}

impl SectionBenchmark {
    pub fn has_missing_aeui(&self) -> bool {
        self.aeui_min.is_nan() || self.aeui_m.is_nan() || self.aeui_max.is_nan()
    }
}

/// A zone of floor area with a standard usage type.
#[derive(Clone, Debug)]
pub struct EnergySection {
    id: String,
    a: f64,
    ac_operation: AcOperation,
    ac_type: String,
    es_sub: u32,
    n_room: Option<f64>,
    so_r: Option<f64>,
    derived: Option<SectionDerived>,
}

impl EnergySection {
    /// Arguments
    /// * `id` - section type code, e.g. `B2`
    /// * `a` - floor area in m2
    /// * `ac_operation` - `CONTINUE` or `INTERVAL`, case insensitive
    /// * `ac_type` - air-conditioning type, e.g. `watercooled`
    /// * `es_sub` - sub-section key, only meaningful for the parking section `J4`
    /// * `n_room` - guest rooms or beds in the section, used to normalise per-room water use
    pub fn new(
        id: &str,
        a: f64,
        ac_operation: &str,
        ac_type: Option<&str>,
        es_sub: Option<u32>,
        n_room: Option<f64>,
    ) -> Result<Self, EstimationError> {
        if !(a > 0.) {
            return Err(EstimationError::configuration(format!(
                "Area of energy section {id} must be positive."
            )));
        }

        Ok(Self {
            id: id.trim().to_string(),
            a,
            ac_operation: AcOperation::parse(ac_operation)?,
            ac_type: ac_type.unwrap_or("normal").to_string(),
            es_sub: es_sub.unwrap_or(DEFAULT_SUB_SECTION),
            n_room,
            so_r: None,
            derived: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn ac_operation(&self) -> AcOperation {
        self.ac_operation
    }

    pub fn ac_type(&self) -> &str {
        &self.ac_type
    }

    pub fn es_sub(&self) -> u32 {
        self.es_sub
    }

    pub fn n_room(&self) -> Option<f64> {
        self.n_room
    }

    pub fn is_watercooled(&self) -> bool {
        self.ac_type.eq_ignore_ascii_case(WATERCOOLED_AC_TYPE)
    }

    pub(crate) fn force_ac_operation(&mut self, ac_operation: AcOperation) {
        self.ac_operation = ac_operation;
    }

    /// First estimation pass: the operation-ratio correction.
    pub(crate) fn set_operation_ratio(&mut self, so_r: f64) {
        self.so_r = Some(so_r);
        self.derived = None;
    }

    /// Second estimation pass: the benchmark components. Requires the first pass.
    pub(crate) fn set_benchmark(&mut self, benchmark: SectionBenchmark) -> Result<(), EstimationError> {
        let so_r = self.so_r.ok_or_else(|| {
            EstimationError::usage(format!(
                "Operation ratio of energy section {} must be resolved before its benchmark.",
                self.id
            ))
        })?;

        self.derived = Some(SectionDerived {
            so_r,
            eeui_m: benchmark.eeui_m,
            leui_min: benchmark.leui_min,
            leui_m: benchmark.leui_m,
            leui_max: benchmark.leui_max,
            aeui_min: benchmark.aeui_min,
            aeui_m: benchmark.aeui_m,
            aeui_max: benchmark.aeui_max,
        });

        Ok(())
    }

    /// Values derived by an estimation; `None` until both passes have run.
    pub fn derived(&self) -> Option<&SectionDerived> {
        self.derived.as_ref()
    }

    pub(crate) fn derived_or_err(&self) -> Result<&SectionDerived, EstimationError> {
        self.derived.as_ref().ok_or_else(|| {
            EstimationError::usage(format!(
                "Energy section {} has not been through estimation.",
                self.id
            ))
        })
    }
}

/// A section with a dedicated energy formula, outside the common benchmark tables.
#[derive(Clone, Debug)]
pub struct ExclusiveEnergySection {
    id: String,
    a: f64,
    coef_usage_h: Option<f64>,
    e_n: Option<f64>,
}

impl ExclusiveEnergySection {
    /// Hot-spring sections (`N7`) default their operating hours to those of the hot-spring bath.
    pub fn new(
        tables: &CoefficientTables,
        id: &str,
        a: Option<f64>,
        coef_usage_h: Option<f64>,
    ) -> Result<Self, EstimationError> {
        let id = id.trim().to_string();
        let coef_usage_h = match coef_usage_h {
            Some(hours) => Some(hours),
            None if id == "N7" => Some(
                tables
                    .es_operation
                    .operating_hours(&id, DEFAULT_SUB_SECTION)?,
            ),
            None => None,
        };

        Ok(Self {
            id,
            a: a.unwrap_or(0.),
            coef_usage_h,
            e_n: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn coef_usage_h(&self) -> Option<f64> {
        self.coef_usage_h
    }

    /// Annual energy use of the section once estimated.
    pub fn e_n(&self) -> Option<f64> {
        self.e_n
    }

    pub(crate) fn set_e_n(&mut self, e_n: f64) {
        self.e_n = Some(e_n);
    }
}

/// A non-residential part of a residential building, contributing to its water pumping.
#[derive(Clone, Debug)]
pub struct NonResidentialEnergySection {
    section_type: String,
    a: f64,
    water: WaterConsumptionCoefficients,
}

impl NonResidentialEnergySection {
    pub fn new(
        tables: &CoefficientTables,
        section_type: &str,
        a: Option<f64>,
    ) -> Result<Self, EstimationError> {
        let section_type = section_type.trim().to_string();
        let water = tables.facilities.water_consumption(&section_type)?;

        Ok(Self {
            section_type,
            a: a.unwrap_or(0.),
            water,
        })
    }

    pub fn section_type(&self) -> &str {
        &self.section_type
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn coef_effective_a(&self) -> f64 {
        self.water.coef_effective_a
    }

    pub fn coef_people_density(&self) -> f64 {
        self.water.coef_people_density
    }

    pub fn coef_water_density(&self) -> f64 {
        self.water.coef_water_density
    }

    /// Daily water use intensity of the section, before the occupancy and day factors.
    pub(crate) fn water_per_day(&self) -> f64 {
        self.a * self.coef_effective_a() * self.coef_people_density() * self.coef_water_density()
    }
}
