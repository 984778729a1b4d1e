use super::FacilityContext;
use crate::compare_floats::nan_max;
use crate::core::units::HOURS_PER_YEAR;
use crate::errors::EstimationError;
use crate::input::{ElevatorInput, EscalatorInput, EstimationSystem};
use itertools::Itertools;

// share of the year a residential elevator runs
const RESIDENTIAL_ELEVATOR_USAGE_SHARE: f64 = 0.2;

/// Number of stories an elevator travels between its lowest and highest stop.
///
/// There is no floor 0, so a shaft running from a basement to an upper floor passes one story
/// fewer than the difference of the floor numbers.
pub fn elevator_stories(bottom: i32, top: i32, offset: i32) -> Result<i32, EstimationError> {
    if bottom == 0 || top == 0 {
        return Err(EstimationError::configuration(format!(
            "Elevator floors {bottom}..{top}: floor 0 does not exist."
        )));
    }

    let crosses_ground = top > 0 && bottom < 0;
    if !crosses_ground && (top <= bottom || top <= 0) {
        return Err(EstimationError::configuration(format!(
            "Elevator floors {bottom}..{top}: the top floor must be above ground and above the bottom floor."
        )));
    }

    Ok(top - bottom - i32::from(crosses_ground) + offset)
}

/// Largest operating hours across the sections a unit serves.
fn usage_hours_of_served_sections(
    context: &FacilityContext,
    served_sections: &[String],
    facility_name: &str,
) -> Result<f64, EstimationError> {
    let hours: Vec<f64> = served_sections
        .iter()
        .map(|section_id| context.operating_hours(section_id.trim()))
        .try_collect()?;

    nan_max(hours).ok_or_else(|| {
        EstimationError::configuration(format!(
            "{facility_name} must serve at least one energy section."
        ))
    })
}

#[derive(Clone, Debug)]
pub struct Elevator {
    pub(crate) n_stories_total: i32,
    pub(crate) coef_usage_r: f64, // Or, share of time in use
    pub(crate) coef_ec: f64,      // FLE, energy per hour of use (kWh/h)
    pub(crate) coef_eff: f64,
    pub(crate) coef_usage_h: f64, // hours per year
}

impl Elevator {
    pub fn new(context: &FacilityContext, input: &ElevatorInput) -> Result<Self, EstimationError> {
        let n_stories_total = elevator_stories(
            input.elevator_bottom_floor,
            input.elevator_top_floor,
            input.elevator_floor_offset,
        )?;

        let (coef_usage_r, coef_usage_h) = match context.estimation_system {
            EstimationSystem::Berse => (
                context
                    .tables
                    .facilities
                    .elevator_usage_ratio(context.building_type)?,
                usage_hours_of_served_sections(context, &input.elevator_es, "Elevator")?,
            ),
            EstimationSystem::Rbers => (
                1.0,
                RESIDENTIAL_ELEVATOR_USAGE_SHARE * HOURS_PER_YEAR as f64,
            ),
        };

        let coef_ec = context.tables.facilities.elevator_energy(
            n_stories_total as f64,
            input.coef_people_per_elevator,
            input.coef_load_per_elevator,
            input.coef_speed,
        )?;

        Ok(Self {
            n_stories_total,
            coef_usage_r,
            coef_ec,
            coef_eff: input.coef_eff,
            coef_usage_h,
        })
    }

    pub fn n_stories_total(&self) -> i32 {
        self.n_stories_total
    }

    /// Annual energy use before any efficiency credit, in kWh.
    pub fn reference_energy(&self) -> f64 {
        self.coef_usage_r * self.coef_ec * self.coef_usage_h
    }

    /// Annual energy use, in kWh.
    pub fn annual_energy(&self) -> f64 {
        self.reference_energy() * self.coef_eff
    }
}

#[derive(Clone, Debug)]
pub struct Escalator {
    pub(crate) coef_usage_r: f64, // Osr
    pub(crate) coef_power: f64,   // kW
    pub(crate) coef_eff: f64,
    pub(crate) coef_usage_h: f64,
}

impl Escalator {
    pub fn new(context: &FacilityContext, input: &EscalatorInput) -> Result<Self, EstimationError> {
        let coef_usage_r = match context.estimation_system {
            EstimationSystem::Berse => context
                .tables
                .facilities
                .escalator_usage_ratio(context.building_type)?,
            EstimationSystem::Rbers => 1.0,
        };

        Ok(Self {
            coef_usage_r,
            coef_power: context
                .tables
                .facilities
                .escalator_power(input.escalator_elevate_height, input.escalator_width)?,
            coef_eff: input.coef_eff,
            coef_usage_h: usage_hours_of_served_sections(
                context,
                &input.escalator_es,
                "Escalator",
            )?,
        })
    }

    /// Annual energy use, in kWh.
    pub fn annual_energy(&self) -> f64 {
        self.coef_usage_r * self.coef_power * self.coef_eff * self.coef_usage_h
    }
}
